use connectors::error::DbError;
use model::pagination::page::PageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    /// The table definition is unusable, e.g. its default sort names an
    /// undeclared column.
    #[error("Invalid table configuration: {0}")]
    Configuration(String),

    /// A call argument was rejected before the database was contacted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Whatever the backend raised, unchanged.
    #[error(transparent)]
    Backend(#[from] DbError),

    /// The requested page lies past the end of the result set.
    #[error("Page {page} not found")]
    PageNotFound { page: u64 },

    #[error("Row failed validation: {0}")]
    RowValidation(String),
}

impl From<PageError> for TableError {
    fn from(err: PageError) -> Self {
        TableError::InvalidArgument(err.to_string())
    }
}
