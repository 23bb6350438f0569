//! Load manifests and load-run metadata

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::table::TableSpec;

/// Column in the load-metadata table naming the data's origin server
pub const SOURCE_SERVER_COLUMN: &str = "source_server";

/// One table and the CSV files to bulk-load into it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableLoad {
    pub table: TableSpec,
    /// Local paths of the files to copy; a table may have several
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

/// Input of a load run: origin server plus the tables/files to load
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadManifest {
    /// Recorded into the load-metadata table alongside the load id
    pub source_server: String,
    #[serde(default)]
    pub tables: Vec<TableLoad>,
}

/// The latest load-metadata row, column name -> value
///
/// Read back by the extract side and consumed by the concat sentinel, which
/// substitutes metadata values into generated expressions as quoted literals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoadInfo(pub BTreeMap<String, Value>);

impl LoadInfo {
    /// Build from a fetched row (a JSON object; anything else yields empty)
    pub fn from_row(row: &Value) -> Self {
        let map = row
            .as_object()
            .map(|object| object.clone().into_iter().collect())
            .unwrap_or_default();
        Self(map)
    }

    /// Value for a metadata column, if recorded
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Value rendered as literal text: strings verbatim, null/missing empty,
    /// everything else via its JSON display form
    pub fn text(&self, key: &str) -> String {
        match self.0.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
