pub mod backend;
pub mod params;
pub mod row;

pub use backend::MySqlBackend;
