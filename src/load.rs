//! Load orchestration: table creation, bulk copy, load bookkeeping
//!
//! A load run is linear: create tables if needed, record one load-metadata
//! row carrying a fresh load id, then copy every file of every table, checking
//! the driver's side files after each copy. A non-empty side file aborts the
//! whole run; rows already loaded stay loaded. Re-running a load is NOT
//! idempotent: it mints a new load id and historizes duplicate rows.

use std::fs;
use std::path::Path;

use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::config::ResolvedConfig;
use crate::error::{DssError, DssResult};
use crate::models::{FieldSpec, LoadManifest, SOURCE_SERVER_COLUMN, TableSpec};
use crate::sql;
use crate::warehouse::{Connector, Warehouse};

/// Sequences create/record/copy against the warehouse
pub struct LoadEngine<C: Connector> {
    connector: C,
    table_prefix: Option<String>,
}

impl<C: Connector> LoadEngine<C> {
    /// Create an engine from a resolved configuration
    pub fn new(connector: C, config: &ResolvedConfig) -> Self {
        Self::with_prefix(connector, config.table_prefix.clone())
    }

    /// Create an engine with an explicit table prefix
    pub fn with_prefix(connector: C, table_prefix: Option<String>) -> Self {
        Self {
            connector,
            table_prefix,
        }
    }

    /// Create every table, one idempotent statement each
    pub fn create_tables(&self, tables: &[TableSpec]) -> DssResult<()> {
        for table in tables {
            table.validate()?;
        }
        for table in tables {
            let statement = sql::create_table(&self.table_name(&table.name), &table.fields);
            self.execute(&statement)?;
        }
        Ok(())
    }

    /// Run a full load and return the invocation's load id
    ///
    /// The load id is minted once and shared by every file loaded in this
    /// call. Load ids are epoch seconds: monotonically increasing across
    /// runs, but two loads starting within the same second collide.
    pub fn load_data(&self, manifest: &LoadManifest) -> DssResult<i64> {
        for load in &manifest.tables {
            load.table.validate()?;
        }

        let load_id = self.record_load(&manifest.source_server)?;

        for load in &manifest.tables {
            let table = self.table_name(&load.table.name);
            for file in &load.files {
                let statement = sql::bulk_load(&table, &load.table.fields, file, load_id);
                self.execute(&statement)?;
                self.check_side_files(file)?;
            }
        }

        Ok(load_id)
    }

    /// Ensure the load-metadata table exists and record this run's row
    fn record_load(&self, source_server: &str) -> DssResult<i64> {
        let load_id = Utc::now().timestamp();
        let table = self.table_name(sql::LOAD_INFO_TABLE);

        let fields = [FieldSpec::new(SOURCE_SERVER_COLUMN, None)];
        self.execute(&sql::create_table(&table, &fields))?;

        let statement =
            format!("INSERT INTO {table} ({SOURCE_SERVER_COLUMN}, _LOAD_ID) VALUES ($1, $2)");
        let mut session = self.connector.connect()?;
        info!("executing sql: {statement}");
        session.run_params(&statement, &[json!(source_server), json!(load_id)])?;

        Ok(load_id)
    }

    /// The driver's side files are the only failure signal a copy produces
    fn check_side_files(&self, file: &Path) -> DssResult<()> {
        for side in [sql::except_file(file), sql::reject_file(file)] {
            let has_content = fs::metadata(&side).map(|m| m.len() > 0).unwrap_or(false);
            if has_content {
                return Err(DssError::LoadRejected {
                    file: file.to_path_buf(),
                });
            }
        }
        Ok(())
    }

    /// One statement per connection, logged before execution
    fn execute(&self, statement: &str) -> DssResult<()> {
        let mut session = self.connector.connect()?;
        info!("executing sql: {statement}");
        session.run(statement)?;
        Ok(())
    }

    fn table_name(&self, name: &str) -> String {
        sql::table_name(self.table_prefix.as_deref(), name)
    }
}
