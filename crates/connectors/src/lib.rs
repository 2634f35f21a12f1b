pub mod backend;
pub mod error;
pub mod sql;

pub use backend::{DatabaseKind, QueryBackend, connect};
pub use error::{ConnectorError, DbError};
