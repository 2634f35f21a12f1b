//! Defines common, reusable AST nodes for building SQL queries.

use model::pagination::sort::SortDirection;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(name: &str) -> Self {
        TableRef {
            schema: None,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDir {
    Asc,
    Desc,
}

impl From<SortDirection> for OrderDir {
    fn from(dir: SortDirection) -> Self {
        match dir {
            SortDirection::Asc => OrderDir::Asc,
            SortDirection::Desc => OrderDir::Desc,
        }
    }
}
