//! CSV staging loader and dataset extractor for analytical warehouses
//!
//! Provides the two halves of a warehouse staging pipeline:
//! - Load: generate and execute `CREATE TABLE` / bulk `COPY` statements for
//!   caller-described tables, tag every loaded row with a per-invocation load
//!   id, record a load-metadata row, and fail loudly when the driver reports
//!   rejected rows via its side files.
//! - Extract: resolve each dataset's output columns to SQL expressions (or use
//!   a caller-supplied SQL file), run the SELECT, and stream the result to a
//!   force-quoted CSV file in a working directory.
//!
//! Execution is delegated to a [`warehouse::Connector`]; the crate ships a
//! blocking PostgreSQL-protocol implementation. All work is synchronous: one
//! connection per logical unit of work, no retries, no transactions beyond
//! what the driver gives per statement.

pub mod columns;
pub mod config;
pub mod error;
pub mod extract;
pub mod load;
pub mod models;
pub mod sql;
pub mod warehouse;

// Re-export commonly used types
pub use columns::{ColumnPlan, ColumnResolver};
pub use config::{Credentials, LoaderConfig, ResolvedConfig};
pub use error::{DssError, DssResult};
pub use extract::ExtractEngine;
pub use load::LoadEngine;
pub use models::{
    ColumnSpec, DatasetSpec, FieldSpec, FieldType, LoadInfo, LoadManifest, TableLoad, TableSpec,
};
pub use warehouse::postgres::PostgresConnector;
pub use warehouse::{Connector, FetchResult, Warehouse, WarehouseError};
