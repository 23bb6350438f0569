//! Crate-wide error type
//!
//! All failures surface synchronously to the caller. There is no retry policy
//! and no partial-success reporting: a failed table load leaves earlier tables
//! loaded and later tables untouched.

use std::path::PathBuf;

use thiserror::Error;

use crate::warehouse::WarehouseError;

/// Error type for loader and extractor operations
#[derive(Error, Debug)]
pub enum DssError {
    /// Missing or invalid configuration, raised before any I/O
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied table or dataset description violates an invariant
    #[error("Invalid spec: {0}")]
    InvalidSpec(String),

    /// A dataset column declares no source at all
    #[error("No source given for column: {0}")]
    MissingSource(String),

    /// `optional` requires `source_column` to be set alongside it
    #[error("source_column must be given for optional column: {0}")]
    OptionalWithoutSource(String),

    /// The driver wrote rejected or exceptional rows while bulk-loading a file
    #[error("Some of the records were rejected: see {}", file.display())]
    LoadRejected { file: PathBuf },

    /// Extract returned a different column set than the dataset declares
    #[error("Extracted columns {actual:?} do not match declared columns {expected:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// Connection or query failure in the warehouse collaborator
    #[error("Warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),

    /// Filesystem failure (side files, SQL files, output directory)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Extract output could not be written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for loader and extractor operations
pub type DssResult<T> = Result<T, DssError>;
