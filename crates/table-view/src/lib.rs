pub mod config;
pub mod error;
pub mod filter;
pub mod reshape;
pub mod spec;
pub mod view;

#[cfg(test)]
mod testing;

pub use config::{JoinDescriptor, JoinOn, TableConfig, TableHooks};
pub use error::TableError;
pub use filter::Filter;
pub use view::{TOTAL_RESULTS, TableView};
