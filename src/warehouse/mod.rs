//! Warehouse connection collaborator
//!
//! The engines never talk to a driver directly: they go through [`Connector`]
//! (scoped acquisition, one connection per logical unit of work) and
//! [`Warehouse`] (fire-and-forget execution plus header-then-rows fetches).
//! The crate ships a blocking PostgreSQL-protocol implementation; tests
//! substitute a scripted mock.

use serde::{Deserialize, Serialize};

pub mod postgres;

pub use postgres::PostgresConnector;

/// Error type for warehouse operations
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    /// Failed to open a connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Statement execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

/// Result type for warehouse operations
pub type WarehouseResult<T> = Result<T, WarehouseError>;

/// Single result row as a JSON object, columns addressable by name
pub type FetchRow = serde_json::Value;

/// Result of a fetch: header first, then rows
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FetchResult {
    /// Column names, in result order
    pub columns: Vec<String>,
    /// Rows of data
    pub rows: Vec<FetchRow>,
}

impl FetchResult {
    /// Create a new fetch result
    pub fn new(columns: Vec<String>, rows: Vec<FetchRow>) -> Self {
        Self { columns, rows }
    }

    /// Create an empty result
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One open warehouse connection
///
/// Every call is a blocking round-trip. Parameterized variants exist so that
/// run-time values (metadata inserts, catalog probes) never travel as SQL
/// literals.
pub trait Warehouse {
    /// Execute a statement, discarding any result
    fn run(&mut self, sql: &str) -> WarehouseResult<()>;

    /// Execute a parameterized statement ($1, $2, ...), discarding any result
    fn run_params(&mut self, sql: &str, params: &[serde_json::Value]) -> WarehouseResult<()>;

    /// Execute a query and return header plus rows
    fn fetch(&mut self, sql: &str) -> WarehouseResult<FetchResult>;

    /// Execute a parameterized query and return header plus rows
    fn fetch_params(
        &mut self,
        sql: &str,
        params: &[serde_json::Value],
    ) -> WarehouseResult<FetchResult>;
}

/// Opens warehouse connections
///
/// Connections are scoped to one logical unit of work: callers connect, run a
/// statement (or one select-and-stream), and drop the session.
pub trait Connector {
    type Session: Warehouse;

    /// Open a new connection
    fn connect(&self) -> WarehouseResult<Self::Session>;
}
