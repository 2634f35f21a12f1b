use connectors::error::ConnectorError;
use model::pagination::sort::InvalidSortDirection;
use table_view::{error::TableError, spec::ConfigError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to load the table file: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to connect to the database: {0}")]
    Connect(#[from] ConnectorError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Failed to parse the filter as JSON: {0}")]
    FilterParse(serde_json::Error),

    #[error("Invalid sort: {0}")]
    Sort(#[from] InvalidSortDirection),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
