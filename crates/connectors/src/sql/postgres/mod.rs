pub mod backend;
pub mod params;
pub mod row;
pub(crate) mod utils;

pub use backend::PgBackend;
