use crate::{
    error::{ConnectorError, DbError},
    sql::{mysql::MySqlBackend, postgres::PgBackend},
};
use async_trait::async_trait;
use model::{core::value::Value, records::row::RowData};
use query_builder::dialect::{self, Dialect};
use std::{str::FromStr, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    MySql,
    Postgres,
}

impl FromStr for DatabaseKind {
    type Err = ConnectorError;

    /// Picks the kind from a connection URL's scheme.
    fn from_str(url: &str) -> Result<Self, Self::Err> {
        let (scheme, _) = url
            .split_once("://")
            .ok_or_else(|| ConnectorError::InvalidUrl(url.to_string()))?;

        match scheme.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DatabaseKind::Postgres),
            "mysql" => Ok(DatabaseKind::MySql),
            other => Err(ConnectorError::UnsupportedScheme(other.to_string())),
        }
    }
}

impl DatabaseKind {
    pub fn dialect(&self) -> &'static dyn Dialect {
        match self {
            DatabaseKind::MySql => &dialect::MySql,
            DatabaseKind::Postgres => &dialect::Postgres,
        }
    }
}

/// Executes rendered statements against a database.
///
/// Pooling, transactions and isolation stay with the driver; a backend only
/// runs one statement and hands back its rows.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// The SQL dialect statements must be rendered in.
    fn dialect(&self) -> &dyn Dialect;

    /// Runs `sql` with positional `params` and returns every row.
    async fn fetch_rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<RowData>, DbError>;
}

/// Connects to the database named by `url`.
pub async fn connect(url: &str) -> Result<Arc<dyn QueryBackend>, ConnectorError> {
    match url.parse::<DatabaseKind>()? {
        DatabaseKind::Postgres => Ok(Arc::new(PgBackend::connect(url).await?)),
        DatabaseKind::MySql => Ok(Arc::new(MySqlBackend::connect(url).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_url() {
        assert_eq!(
            "postgres://u:p@localhost/db".parse::<DatabaseKind>().unwrap(),
            DatabaseKind::Postgres
        );
        assert_eq!(
            "PostgreSQL://localhost/db".parse::<DatabaseKind>().unwrap(),
            DatabaseKind::Postgres
        );
        assert_eq!(
            "mysql://root@localhost:3306/app".parse::<DatabaseKind>().unwrap(),
            DatabaseKind::MySql
        );
        assert!(matches!(
            "sqlite://file.db".parse::<DatabaseKind>(),
            Err(ConnectorError::UnsupportedScheme(s)) if s == "sqlite"
        ));
        assert!(matches!(
            "localhost".parse::<DatabaseKind>(),
            Err(ConnectorError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_kind_dialect() {
        assert_eq!(DatabaseKind::MySql.dialect().name(), "MySQL");
        assert_eq!(DatabaseKind::Postgres.dialect().name(), "PostgreSQL");
    }
}
