//! Dataset extraction to CSV files
//!
//! For each dataset: resolve its SELECT (a caller-supplied SQL file, or a
//! generated query over the resolved column plan), run it, and write header
//! plus rows to `<work_dir>/<dataset>-<epoch>.csv` with every field quoted.
//! When the plan is generated, the returned header must match the declared
//! output columns exactly. The absolute output path is recorded back onto the
//! dataset for downstream consumers.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::{QuoteStyle, WriterBuilder};
use serde_json::Value;
use tracing::info;

use crate::columns::ColumnResolver;
use crate::config::ResolvedConfig;
use crate::error::{DssError, DssResult};
use crate::models::{DatasetSpec, LoadInfo};
use crate::sql;
use crate::warehouse::{Connector, FetchResult, Warehouse};

/// Runs dataset extractions against the warehouse
pub struct ExtractEngine<C: Connector> {
    connector: C,
    table_prefix: Option<String>,
    work_dir: PathBuf,
}

impl<C: Connector> ExtractEngine<C> {
    /// Create an engine from a resolved configuration
    pub fn new(connector: C, config: &ResolvedConfig) -> Self {
        Self::with_options(connector, config.table_prefix.clone(), config.work_dir.clone())
    }

    /// Create an engine with explicit prefix and working directory
    pub fn with_options(
        connector: C,
        table_prefix: Option<String>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            connector,
            table_prefix,
            work_dir: work_dir.into(),
        }
    }

    /// The latest load-metadata row, column name -> value
    pub fn load_info(&self) -> DssResult<LoadInfo> {
        let statement = sql::latest_load_info(&self.load_info_table());
        let result = self.fetch(&statement)?;
        Ok(result
            .rows
            .last()
            .map(LoadInfo::from_row)
            .unwrap_or_default())
    }

    /// Extract every dataset, recording each written file's absolute path on
    /// its spec
    pub fn extract_data(&self, datasets: &mut [DatasetSpec]) -> DssResult<()> {
        fs::create_dir_all(&self.work_dir)?;

        let load_info = self.load_info()?;
        let resolver = ColumnResolver::new(&self.connector, &load_info);

        for dataset in datasets.iter_mut() {
            // Custom-SQL datasets have no declared plan to validate against
            let (statement, expected) = if let Some(sql_file) = &dataset.extract_sql {
                (fs::read_to_string(sql_file)?, None)
            } else {
                let source_table = dataset.source_table.as_deref().ok_or_else(|| {
                    DssError::InvalidSpec(format!(
                        "dataset '{}' needs either extract_sql or source_table",
                        dataset.name
                    ))
                })?;
                let plan = resolver.resolve(source_table, &dataset.columns)?;
                let statement =
                    sql::extract(source_table, &plan.select_exprs, &self.load_info_table());
                (statement, Some(plan.output_columns))
            };

            let result = self.fetch(&statement)?;

            let out_path = self.output_path(&dataset.name);
            write_csv(&out_path, &result)?;

            if let Some(expected) = expected
                && result.columns != expected
            {
                return Err(DssError::ColumnMismatch {
                    expected,
                    actual: result.columns,
                });
            }

            let absolute = fs::canonicalize(&out_path)?;
            info!("written results to file {}", absolute.display());
            dataset.csv_path = Some(absolute);
        }

        Ok(())
    }

    /// Output filenames carry a timestamp so re-runs never collide
    fn output_path(&self, dataset: &str) -> PathBuf {
        self.work_dir
            .join(format!("{dataset}-{}.csv", Utc::now().timestamp()))
    }

    /// One select-and-stream per connection, logged before execution
    fn fetch(&self, statement: &str) -> DssResult<FetchResult> {
        let mut session = self.connector.connect()?;
        info!("executing sql: {statement}");
        Ok(session.fetch(statement)?)
    }

    fn load_info_table(&self) -> String {
        sql::table_name(self.table_prefix.as_deref(), sql::LOAD_INFO_TABLE)
    }
}

/// Header plus rows, every field quoted
fn write_csv(path: &Path, result: &FetchResult) -> DssResult<()> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)?;

    writer.write_record(&result.columns)?;
    for row in &result.rows {
        let record: Vec<String> = result
            .columns
            .iter()
            .map(|column| csv_value(row.get(column)))
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Render a fetched value as CSV text: strings verbatim, null/missing empty,
/// everything else via its JSON display form
fn csv_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
