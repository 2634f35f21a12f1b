use crate::{
    backend::QueryBackend,
    error::{ConnectorError, DbError},
    sql::postgres::{params::PgParamStore, row::to_row_data, utils::connect_client},
};
use async_trait::async_trait;
use model::{core::value::Value, records::row::RowData};
use query_builder::dialect::{self, Dialect};
use tokio_postgres::Client;
use tracing::debug;

pub struct PgBackend {
    client: Client,
    dialect: dialect::Postgres,
}

impl PgBackend {
    pub async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let client = connect_client(url).await?;
        Ok(Self::from_client(client))
    }

    /// Wraps an already connected client.
    pub fn from_client(client: Client) -> Self {
        PgBackend {
            client,
            dialect: dialect::Postgres,
        }
    }
}

#[async_trait]
impl QueryBackend for PgBackend {
    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    async fn fetch_rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<RowData>, DbError> {
        let statement = self.client.prepare(sql).await?;
        let bindings = PgParamStore::from_values(params, statement.params());

        let rows = self.client.query(&statement, &bindings.as_refs()).await?;
        debug!(rows = rows.len(), "Postgres statement completed");

        Ok(rows.iter().map(|row| to_row_data(row, "")).collect())
    }
}
