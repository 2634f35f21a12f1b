use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QualCol {
    pub table: String, // table or alias as used in FROM/JOINs
    pub column: String,
}

impl QualCol {
    pub fn qualifier(&self) -> Option<&str> {
        (!self.table.is_empty()).then_some(self.table.as_str())
    }
}

impl FromStr for QualCol {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('.') {
            Some((table, column)) => Ok(QualCol {
                table: table.to_string(),
                column: column.to_string(),
            }),
            None => Ok(QualCol {
                table: "".to_string(),
                column: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for QualCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qualifier() {
            Some(table) => write!(f, "{table}.{}", self.column),
            None => f.write_str(&self.column),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sort direction '{0}', must be either 'asc' or 'desc'")]
pub struct InvalidSortDirection(pub String);

impl FromStr for SortDirection {
    type Err = InvalidSortDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(InvalidSortDirection(s.to_string())),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// A single `ORDER BY` term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub column: QualCol,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(column: &str, direction: SortDirection) -> Self {
        // QualCol parsing never fails
        let column = column.parse().unwrap_or(QualCol {
            table: String::new(),
            column: column.to_string(),
        });
        SortOrder { column, direction }
    }

    pub fn asc(column: &str) -> Self {
        Self::new(column, SortDirection::Asc)
    }

    pub fn desc(column: &str) -> Self {
        Self::new(column, SortDirection::Desc)
    }
}

/// Parses `column[:direction]`, e.g. `created:desc` or `u.email`.
impl FromStr for SortOrder {
    type Err = InvalidSortDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((column, dir)) => Ok(SortOrder::new(column, dir.parse()?)),
            None => Ok(SortOrder::asc(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_case_insensitive() {
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert_eq!("Ascending".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert!("sideways".parse::<SortDirection>().is_err());
    }

    #[test]
    fn test_qualified_column() {
        let col: QualCol = "u.created".parse().unwrap();
        assert_eq!(col.qualifier(), Some("u"));
        assert_eq!(col.column, "created");

        let bare: QualCol = "created".parse().unwrap();
        assert_eq!(bare.qualifier(), None);
        assert_eq!(bare.to_string(), "created");
    }

    #[test]
    fn test_sort_order_from_str() {
        let order: SortOrder = "u.created:desc".parse().unwrap();
        assert_eq!(order, SortOrder::desc("u.created"));
        assert_eq!("email".parse::<SortOrder>(), Ok(SortOrder::asc("email")));
        assert!("email:up".parse::<SortOrder>().is_err());
    }
}
