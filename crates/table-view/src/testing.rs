//! An in-memory `QueryBackend` for exercising table views without a
//! database.

use crate::view::TOTAL_RESULTS;
use async_trait::async_trait;
use connectors::{backend::QueryBackend, error::DbError};
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use query_builder::dialect::{Dialect, Postgres};
use std::sync::Mutex;

/// Serves a fixed set of already-filtered rows.
///
/// Page statements end with `LIMIT ? OFFSET ?`, so the last two parameters
/// pick the window; each returned row carries `total_results` like a real
/// windowed query would.
pub struct MemoryBackend {
    rows: Vec<RowData>,
    failure: Option<String>,
    pub calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MemoryBackend {
    pub fn new(rows: Vec<RowData>) -> Self {
        MemoryBackend {
            rows,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        MemoryBackend {
            failure: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<(String, Vec<Value>)> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl QueryBackend for MemoryBackend {
    fn dialect(&self) -> &dyn Dialect {
        &Postgres
    }

    async fn fetch_rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<RowData>, DbError> {
        self.calls.lock().unwrap().push((sql.to_string(), params.clone()));

        if let Some(message) = &self.failure {
            return Err(DbError::Unknown(message.clone()));
        }

        if !sql.contains(TOTAL_RESULTS) {
            return Ok(self.rows.clone());
        }

        let [.., limit, offset] = params.as_slice() else {
            return Err(DbError::Unknown("page statement without a window".into()));
        };
        let limit = limit.as_u64().unwrap_or_default() as usize;
        let offset = offset.as_u64().unwrap_or_default() as usize;
        let total = self.rows.len() as i64;

        Ok(self
            .rows
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .map(|mut row| {
                row.field_values
                    .push(FieldValue::new(TOTAL_RESULTS, Value::Int(total)));
                row
            })
            .collect())
    }
}

/// A flat row with `{alias}_{column}` field names.
pub fn row(fields: &[(&str, Value)]) -> RowData {
    RowData::new(
        "",
        fields
            .iter()
            .map(|(name, value)| FieldValue::new(*name, value.clone()))
            .collect(),
    )
}
