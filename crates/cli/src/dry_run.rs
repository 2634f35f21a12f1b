use async_trait::async_trait;
use connectors::{DatabaseKind, QueryBackend, error::DbError};
use model::{core::value::Value, records::row::RowData};
use query_builder::dialect::Dialect;

/// Renders for a database without ever reaching it.
pub struct DryRun {
    kind: DatabaseKind,
}

impl DryRun {
    pub fn new(kind: DatabaseKind) -> Self {
        DryRun { kind }
    }
}

#[async_trait]
impl QueryBackend for DryRun {
    fn dialect(&self) -> &dyn Dialect {
        self.kind.dialect()
    }

    async fn fetch_rows(&self, _sql: &str, _params: Vec<Value>) -> Result<Vec<RowData>, DbError> {
        Err(DbError::Unknown("dry run backend does not execute statements".into()))
    }
}
