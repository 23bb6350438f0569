//! Shared scripted warehouse mock for integration tests

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use dss_loader::sql;
use dss_loader::warehouse::{Connector, FetchResult, Warehouse, WarehouseResult};

#[derive(Default)]
pub struct MockState {
    /// Statements passed to `run`/`run_params`/`fetch`, in order
    pub executed: Vec<String>,
    /// Params passed to `run_params`/`fetch_params`, in order
    pub params: Vec<Vec<Value>>,
    /// (table, column) pairs the catalog probe reports as existing
    pub catalog: HashSet<(String, String)>,
    /// Row returned for the latest-load-info lookup
    pub load_info_row: Option<Value>,
    /// Scripted results for other fetches, consumed front to back
    pub fetches: VecDeque<FetchResult>,
}

/// Connector whose sessions all share one scripted state
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executed(&self) -> Vec<String> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn params(&self) -> Vec<Vec<Value>> {
        self.state.lock().unwrap().params.clone()
    }

    pub fn push_fetch(&self, result: FetchResult) {
        self.state.lock().unwrap().fetches.push_back(result);
    }

    pub fn add_catalog_column(&self, table: &str, column: &str) {
        self.state
            .lock()
            .unwrap()
            .catalog
            .insert((table.to_string(), column.to_string()));
    }

    pub fn set_load_info_row(&self, row: Value) {
        self.state.lock().unwrap().load_info_row = Some(row);
    }
}

impl Connector for MockConnector {
    type Session = MockSession;

    fn connect(&self) -> WarehouseResult<MockSession> {
        Ok(MockSession {
            state: self.state.clone(),
        })
    }
}

pub struct MockSession {
    state: Arc<Mutex<MockState>>,
}

impl Warehouse for MockSession {
    fn run(&mut self, sql: &str) -> WarehouseResult<()> {
        self.state.lock().unwrap().executed.push(sql.to_string());
        Ok(())
    }

    fn run_params(&mut self, sql: &str, params: &[Value]) -> WarehouseResult<()> {
        let mut state = self.state.lock().unwrap();
        state.executed.push(sql.to_string());
        state.params.push(params.to_vec());
        Ok(())
    }

    fn fetch(&mut self, statement: &str) -> WarehouseResult<FetchResult> {
        let mut state = self.state.lock().unwrap();
        state.executed.push(statement.to_string());

        // Latest-load-info lookup answers from the scripted metadata row
        if statement.contains("MAX(_INSERTED_AT)") {
            return Ok(match &state.load_info_row {
                Some(row) => {
                    let columns = row
                        .as_object()
                        .map(|o| o.keys().cloned().collect())
                        .unwrap_or_default();
                    FetchResult::new(columns, vec![row.clone()])
                }
                None => FetchResult::empty(),
            });
        }

        Ok(state.fetches.pop_front().unwrap_or_else(FetchResult::empty))
    }

    fn fetch_params(&mut self, statement: &str, params: &[Value]) -> WarehouseResult<FetchResult> {
        let mut state = self.state.lock().unwrap();
        state.executed.push(statement.to_string());
        state.params.push(params.to_vec());

        // Catalog probe answers from the scripted catalog
        if statement == sql::COLUMN_PROBE {
            let table = params[0].as_str().unwrap_or_default().to_string();
            let column = params[1].as_str().unwrap_or_default().to_string();
            let count = i64::from(state.catalog.contains(&(table, column)));
            return Ok(FetchResult::new(
                vec!["count".to_string()],
                vec![json!({"count": count})],
            ));
        }

        Ok(state.fetches.pop_front().unwrap_or_else(FetchResult::empty))
    }
}
