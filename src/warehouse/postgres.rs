//! Blocking PostgreSQL-protocol warehouse implementation
//!
//! One [`postgres::Client`] per session; the connector re-connects for every
//! unit of work, matching the crate's scoped-acquisition model.

use postgres::types::ToSql;
use postgres::{Client, NoTls};
use serde_json::Value;

use super::{Connector, FetchResult, Warehouse, WarehouseError, WarehouseResult};
use crate::config::{Credentials, ResolvedConfig};

/// Connector holding the endpoint URL and resolved credentials
pub struct PostgresConnector {
    url: String,
    credentials: Credentials,
}

impl PostgresConnector {
    /// Build a connector from a resolved configuration
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            url: config.url.clone(),
            credentials: config.credentials.clone(),
        }
    }

    /// Build a connector from raw parts
    pub fn from_parts(url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            url: url.into(),
            credentials,
        }
    }
}

impl Connector for PostgresConnector {
    type Session = PostgresSession;

    fn connect(&self) -> WarehouseResult<PostgresSession> {
        let mut config = self
            .url
            .parse::<postgres::Config>()
            .map_err(|e| WarehouseError::ConnectionFailed(format!("invalid url: {}", e)))?;
        config.user(&self.credentials.username);
        config.password(&self.credentials.password);

        let client = config
            .connect(NoTls)
            .map_err(|e| WarehouseError::ConnectionFailed(e.to_string()))?;

        Ok(PostgresSession { client })
    }
}

/// One open blocking connection
pub struct PostgresSession {
    client: Client,
}

impl PostgresSession {
    /// Convert a row to a JSON object keyed by column name
    fn row_to_json(row: &postgres::Row, columns: &[String]) -> Value {
        let mut map = serde_json::Map::new();
        for (i, column) in columns.iter().enumerate() {
            map.insert(column.clone(), Self::column_value(row, i));
        }
        Value::Object(map)
    }

    /// Get a column value as JSON, trying the common wire types in turn
    fn column_value(row: &postgres::Row, idx: usize) -> Value {
        if let Ok(v) = row.try_get::<_, Option<String>>(idx) {
            return v.map(Value::String).unwrap_or(Value::Null);
        }
        if let Ok(v) = row.try_get::<_, Option<i64>>(idx) {
            return v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null);
        }
        if let Ok(v) = row.try_get::<_, Option<i32>>(idx) {
            return v.map(|n| Value::Number(n.into())).unwrap_or(Value::Null);
        }
        if let Ok(v) = row.try_get::<_, Option<bool>>(idx) {
            return v.map(Value::Bool).unwrap_or(Value::Null);
        }
        if let Ok(v) = row.try_get::<_, Option<f64>>(idx) {
            return v
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null);
        }
        Value::Null
    }
}

/// Render JSON params as text params: strings verbatim, null empty, others
/// via their JSON display form
fn text_params(params: &[Value]) -> Vec<String> {
    params
        .iter()
        .map(|p| match p {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect()
}

impl Warehouse for PostgresSession {
    fn run(&mut self, sql: &str) -> WarehouseResult<()> {
        self.client
            .batch_execute(sql)
            .map_err(|e| WarehouseError::QueryFailed(e.to_string()))
    }

    fn run_params(&mut self, sql: &str, params: &[Value]) -> WarehouseResult<()> {
        let text = text_params(params);
        let refs: Vec<&(dyn ToSql + Sync)> =
            text.iter().map(|s| s as &(dyn ToSql + Sync)).collect();
        self.client
            .execute(sql, &refs)
            .map(|_| ())
            .map_err(|e| WarehouseError::QueryFailed(e.to_string()))
    }

    fn fetch(&mut self, sql: &str) -> WarehouseResult<FetchResult> {
        self.fetch_params(sql, &[])
    }

    fn fetch_params(&mut self, sql: &str, params: &[Value]) -> WarehouseResult<FetchResult> {
        // Prepare first so the header is available even for empty results
        let statement = self
            .client
            .prepare(sql)
            .map_err(|e| WarehouseError::QueryFailed(e.to_string()))?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let text = text_params(params);
        let refs: Vec<&(dyn ToSql + Sync)> =
            text.iter().map(|s| s as &(dyn ToSql + Sync)).collect();

        let rows = self
            .client
            .query(&statement, &refs)
            .map_err(|e| WarehouseError::QueryFailed(e.to_string()))?;

        let json_rows: Vec<Value> = rows
            .iter()
            .map(|row| Self::row_to_json(row, &columns))
            .collect();

        Ok(FetchResult::new(columns, json_rows))
    }
}
