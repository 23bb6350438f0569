//! Dataset descriptions for CSV extraction
//!
//! A dataset is a named output CSV with a declared, ordered set of output
//! columns. Each column names exactly one source: a physical column, a SQL
//! expression, or a concatenation; `optional` lets a physical column degrade
//! to an empty literal when it does not exist in the source table.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One declared output column and its source mapping
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ColumnSpec {
    /// Output column name (also the CSV header entry)
    pub name: String,

    /// Pull the value from this physical column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_column: Option<String>,

    /// Pull the value from this SQL expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_column_expression: Option<String>,

    /// Build the value by concatenating these elements; an element prefixed
    /// with `:` is looked up in the latest load's metadata record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_column_concat: Option<Vec<String>>,

    /// With `source_column`: emit an empty literal when the physical column
    /// is absent from the source table
    #[serde(default)]
    pub optional: bool,
}

impl ColumnSpec {
    /// Column backed by a physical source column
    pub fn source(name: impl Into<String>, source_column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_column: Some(source_column.into()),
            ..Default::default()
        }
    }

    /// Column backed by a SQL expression
    pub fn expression(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_column_expression: Some(expression.into()),
            ..Default::default()
        }
    }

    /// Column backed by a concatenation of literals and metadata lookups
    pub fn concat(name: impl Into<String>, parts: Vec<String>) -> Self {
        Self {
            name: name.into(),
            source_column_concat: Some(parts),
            ..Default::default()
        }
    }
}

/// A named CSV extraction target
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DatasetSpec {
    /// Dataset name; becomes part of the output filename
    pub name: String,

    /// Table the generated SELECT reads from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_table: Option<String>,

    /// Path to a file holding a literal SELECT; bypasses column resolution
    /// (and therefore header validation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_sql: Option<PathBuf>,

    /// Declared output columns, in output order
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,

    /// Absolute path of the written CSV, populated by the extract run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_path: Option<PathBuf>,
}

impl DatasetSpec {
    /// Dataset extracted via generated SQL from `source_table`
    pub fn new(name: impl Into<String>, source_table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_table: Some(source_table.into()),
            ..Default::default()
        }
    }

    /// Dataset extracted via a caller-supplied SQL file
    pub fn with_custom_sql(name: impl Into<String>, sql_file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            extract_sql: Some(sql_file.into()),
            ..Default::default()
        }
    }
}
