//! Column plan resolution for dataset extraction
//!
//! Turns a dataset's declared output columns into the SELECT expressions of
//! the generated extract query. Exactly one source kind must apply per
//! column; `optional` columns probe the warehouse catalog and degrade to an
//! empty literal when the physical column does not exist.

use serde_json::{Value, json};

use crate::error::{DssError, DssResult};
use crate::models::{ColumnSpec, LoadInfo};
use crate::sql;
use crate::warehouse::{Connector, Warehouse};

/// Resolved plan: SELECT expressions plus the expected output header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnPlan {
    /// One `<expr> AS <name>` per declared column, in declared order
    pub select_exprs: Vec<String>,
    /// Declared output column names, in declared order
    pub output_columns: Vec<String>,
}

/// Resolves dataset columns against the warehouse catalog and the latest
/// load's metadata
pub struct ColumnResolver<'a, C: Connector> {
    connector: &'a C,
    load_info: &'a LoadInfo,
}

impl<'a, C: Connector> ColumnResolver<'a, C> {
    pub fn new(connector: &'a C, load_info: &'a LoadInfo) -> Self {
        Self {
            connector,
            load_info,
        }
    }

    /// Resolve every declared column of a dataset, in declared order
    pub fn resolve(&self, source_table: &str, columns: &[ColumnSpec]) -> DssResult<ColumnPlan> {
        let mut plan = ColumnPlan::default();

        for column in columns {
            plan.output_columns.push(column.name.clone());

            if column.optional {
                let source = column
                    .source_column
                    .as_deref()
                    .ok_or_else(|| DssError::OptionalWithoutSource(column.name.clone()))?;
                if !self.table_has_column(source_table, source)? {
                    plan.select_exprs.push(format!("'' AS {}", column.name));
                    continue;
                }
            }

            if let Some(source) = &column.source_column {
                plan.select_exprs.push(format!("{source} AS {}", column.name));
            } else if let Some(expression) = &column.source_column_expression {
                plan.select_exprs
                    .push(format!("{expression} AS {}", column.name));
            } else if let Some(parts) = &column.source_column_concat {
                plan.select_exprs
                    .push(format!("{} AS {}", self.concat_expr(parts), column.name));
            } else {
                return Err(DssError::MissingSource(column.name.clone()));
            }
        }

        Ok(plan)
    }

    /// Build a `||` concatenation; a `:`-prefixed element is replaced by the
    /// latest load's metadata value for that key, as a quoted literal.
    fn concat_expr(&self, parts: &[String]) -> String {
        let rendered: Vec<String> = parts
            .iter()
            .map(|part| match part.strip_prefix(':') {
                Some(key) => format!("'{}'", self.load_info.text(key)),
                None => part.clone(),
            })
            .collect();
        format!("({})", rendered.join(" || "))
    }

    /// Existence probe against the warehouse catalog
    fn table_has_column(&self, table: &str, column: &str) -> DssResult<bool> {
        let mut session = self.connector.connect()?;
        let result = session.fetch_params(sql::COLUMN_PROBE, &[json!(table), json!(column)])?;
        let count = result
            .rows
            .first()
            .and_then(|row| row.get("count"))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok(count > 0)
    }
}
