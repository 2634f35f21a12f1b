use crate::{
    backend::QueryBackend,
    error::{ConnectorError, DbError},
    sql::mysql::{params::MySqlParamStore, row::to_row_data},
};
use async_trait::async_trait;
use model::{core::value::Value, records::row::RowData};
use mysql_async::{Pool, Row, prelude::Queryable};
use query_builder::dialect::{self, Dialect};
use tracing::debug;

#[derive(Clone)]
pub struct MySqlBackend {
    pool: Pool,
    dialect: dialect::MySql,
}

impl MySqlBackend {
    /// Builds a pool for `url` and checks out one connection to verify it.
    pub async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let pool = Pool::from_url(url).map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;
        let conn = pool.get_conn().await?;
        drop(conn);

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: Pool) -> Self {
        MySqlBackend {
            pool,
            dialect: dialect::MySql,
        }
    }
}

#[async_trait]
impl QueryBackend for MySqlBackend {
    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    async fn fetch_rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<RowData>, DbError> {
        let store = MySqlParamStore::from_values(&params);
        let mut conn = self.pool.get_conn().await?;

        let rows: Vec<Row> = conn.exec(sql, store.params()).await?;
        debug!(rows = rows.len(), "MySQL statement completed");

        Ok(rows.iter().map(|row| to_row_data(row, "")).collect())
    }
}
