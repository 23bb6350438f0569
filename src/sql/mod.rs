//! SQL statement generation for managed warehouse tables
//!
//! Pure string builders; execution belongs to the engines. Every managed
//! table gets the same shape: a generated `_oid` key first, the caller's
//! fields, then the three historization columns in fixed order.

use std::path::{Path, PathBuf};

use crate::models::FieldSpec;

/// Logical name of the load-metadata table (one row per load run)
pub const LOAD_INFO_TABLE: &str = "meta_loads";

/// Prefix every physical table name starts with
pub const TABLE_NAME_PREFIX: &str = "dss";

/// Generated surrogate key, always the first column
pub const ID_COLUMN: (&str, &str) = ("_oid", "IDENTITY PRIMARY KEY");

/// Historization columns appended to every managed table, in order
pub const HISTORIZATION_COLUMNS: [(&str, &str); 3] = [
    ("_LOAD_ID", "VARCHAR(255)"),
    ("_INSERTED_AT", "TIMESTAMP NOT NULL DEFAULT now()"),
    ("_IS_DELETED", "BOOLEAN NOT NULL DEFAULT FALSE"),
];

/// Column-existence probe against the warehouse catalog ($1 = table, $2 = column)
pub const COLUMN_PROBE: &str =
    "SELECT COUNT(column_name) AS count FROM columns WHERE table_name = $1 AND column_name = $2";

/// Physical name for a logical table: `dss_<name>`, or `dss_<prefix>_<name>`
pub fn table_name(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(p) => format!("{TABLE_NAME_PREFIX}_{p}_{name}"),
        None => format!("{TABLE_NAME_PREFIX}_{name}"),
    }
}

/// Idempotent create with the full system-column frame around `fields`
pub fn create_table(table: &str, fields: &[FieldSpec]) -> String {
    let mut columns = Vec::with_capacity(fields.len() + 1 + HISTORIZATION_COLUMNS.len());
    columns.push(format!("{} {}", ID_COLUMN.0, ID_COLUMN.1));
    columns.extend(fields.iter().map(|f| format!("{} {}", f.name, f.sql_type())));
    columns.extend(
        HISTORIZATION_COLUMNS
            .iter()
            .map(|(name, definition)| format!("{name} {definition}")),
    );
    format!(
        "CREATE TABLE IF NOT EXISTS {table} ({})",
        columns.join(", ")
    )
}

/// Side file the driver writes parse exceptions into
pub fn except_file(file: &Path) -> PathBuf {
    PathBuf::from(format!("{}.except.log", file.display()))
}

/// Side file the driver writes rejected rows into
pub fn reject_file(file: &Path) -> PathBuf {
    PathBuf::from(format!("{}.reject.log", file.display()))
}

/// Bulk copy of one local CSV file into `table`, tagged with `load_id`
///
/// The exception/rejection side-file paths named here are the load's only
/// failure signal: the driver reports nothing else, so callers must inspect
/// both files after the statement runs.
pub fn bulk_load(table: &str, fields: &[FieldSpec], file: &Path, load_id: i64) -> String {
    let columns: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    format!(
        "COPY {table} ({}, _LOAD_ID AS '{load_id}') \
         FROM LOCAL '{file}' WITH PARSER GdcCsvParser() \
         ESCAPE AS '\"' SKIP 1 \
         EXCEPTIONS '{except}' \
         REJECTED DATA '{reject}'",
        columns.join(", "),
        file = file.display(),
        except = except_file(file).display(),
        reject = reject_file(file).display(),
    )
}

/// SELECT of the given column expressions restricted to the latest load
pub fn extract(table: &str, columns: &[String], load_info_table: &str) -> String {
    // _INSERTED_AT (a timestamp) is compared against MAX(_LOAD_ID) (an epoch
    // id). TODO: settle the snapshot semantics; _LOAD_ID is the likelier
    // intended filter column.
    format!(
        "SELECT {} FROM {table} WHERE _INSERTED_AT = (SELECT MAX(_LOAD_ID) FROM {load_info_table})",
        columns.join(",")
    )
}

/// Latest row of the load-metadata table
pub fn latest_load_info(load_info_table: &str) -> String {
    format!(
        "SELECT * FROM {load_info_table} \
         WHERE _INSERTED_AT = (SELECT MAX(_INSERTED_AT) FROM {load_info_table})"
    )
}

/// Literal-valued INSERT
///
/// Values are wrapped in single quotes verbatim; embedded quote characters
/// are NOT escaped, so this must never see untrusted input. Run-time inserts
/// go through parameterized execution instead.
pub fn insert(table: &str, column_values: &[(&str, &str)]) -> String {
    let columns: Vec<&str> = column_values.iter().map(|(column, _)| *column).collect();
    let values: Vec<String> = column_values
        .iter()
        .map(|(_, value)| format!("'{value}'"))
        .collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        columns.join(","),
        values.join(",")
    )
}
