//! Caller-facing descriptions of tables, datasets and load runs

pub mod dataset;
pub mod load;
pub mod table;

pub use dataset::{ColumnSpec, DatasetSpec};
pub use load::{LoadInfo, LoadManifest, SOURCE_SERVER_COLUMN, TableLoad};
pub use table::{DEFAULT_SQL_TYPE, FieldSpec, FieldType, TableSpec};
