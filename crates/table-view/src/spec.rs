//! Table definitions loaded from TOML.
//!
//! ```toml
//! [[table]]
//! name = "users"
//! alias = "u"
//! columns = ["id", "email", "created"]
//! default_sort = { column = "created", direction = "desc" }
//!
//! [[table.joins]]
//! table = "profiles"
//! local = "id"
//! foreign = "user_id"
//!
//! [[table]]
//! name = "profiles"
//! alias = "p"
//! columns = ["id", "user_id", "bio"]
//! ```

use crate::{
    config::{JoinDescriptor, JoinOn, TableConfig},
    error::TableError,
};
use model::records::row::RowData;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read table file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse table file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown table '{0}'")]
    UnknownTable(String),

    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    #[serde(default = "default_direction")]
    pub direction: String,
}

fn default_direction() -> String {
    "asc".to_string()
}

/// Joins another table of the same file on `{base}.{local} = {joined}.{foreign}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub table: String,
    pub local: String,
    pub foreign: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    pub alias: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub default_sort: Option<SortSpec>,
    #[serde(default)]
    pub joins: Vec<JoinSpec>,
}

impl JoinDescriptor {
    pub fn from_spec(spec: &TableSpec, on: JoinOn) -> Self {
        JoinDescriptor::new(&spec.name, &spec.alias, &spec.columns, on)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableFile {
    #[serde(rename = "table", default)]
    pub tables: Vec<TableSpec>,
}

impl TableFile {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn table(&self, name: &str) -> Result<&TableSpec, ConfigError> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ConfigError::UnknownTable(name.to_string()))
    }

    /// Builds a validated configuration for `name`, resolving its joins
    /// against the other tables of the file.
    pub fn config<T>(
        &self,
        name: &str,
        restruct: impl Fn(&RowData) -> T + Send + Sync + 'static,
    ) -> Result<TableConfig<T>, ConfigError> {
        let spec = self.table(name)?;

        let mut builder =
            TableConfig::builder(&spec.name, &spec.alias, spec.columns.clone(), restruct);

        for join in &spec.joins {
            let joined = self.table(&join.table)?;
            builder = builder.join(JoinDescriptor::from_spec(
                joined,
                JoinOn::columns(&join.local, &join.foreign),
            ));
        }

        if let Some(sort) = &spec.default_sort {
            builder = builder.default_sort(&sort.column, &sort.direction);
        }

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLES: &str = r#"
        [[table]]
        name = "users"
        alias = "u"
        columns = ["id", "email", "created"]
        default_sort = { column = "created", direction = "DESC" }

        [[table.joins]]
        table = "profiles"
        local = "id"
        foreign = "user_id"

        [[table]]
        name = "profiles"
        alias = "p"
        columns = ["id", "user_id", "bio"]
    "#;

    #[test]
    fn test_parse_and_build() {
        let file = TableFile::parse(TABLES).unwrap();
        assert_eq!(file.tables.len(), 2);

        let config = file.config("users", RowData::clone).unwrap();
        assert_eq!(config.alias(), "u");
        assert_eq!(config.joins().len(), 1);
        assert_eq!(config.joins()[0].alias, "p");
        assert_eq!(config.joins()[0].columns[2].key, "p_bio");
        assert_eq!(config.default_sort().unwrap().column.to_string(), "u.created");
    }

    #[test]
    fn test_sort_direction_defaults_to_asc() {
        let file = TableFile::parse(
            r#"
            [[table]]
            name = "tags"
            alias = "t"
            columns = ["label"]
            default_sort = { column = "label" }
            "#,
        )
        .unwrap();
        assert_eq!(file.tables[0].default_sort.as_ref().unwrap().direction, "asc");
        assert!(file.config("tags", RowData::clone).is_ok());
    }

    #[test]
    fn test_unknown_tables() {
        let file = TableFile::parse(TABLES).unwrap();
        assert!(matches!(
            file.config("orders", RowData::clone),
            Err(ConfigError::UnknownTable(name)) if name == "orders"
        ));

        let broken = TABLES.replace(r#"table = "profiles""#, r#"table = "accounts""#);
        let file = TableFile::parse(&broken).unwrap();
        assert!(matches!(
            file.config("users", RowData::clone),
            Err(ConfigError::UnknownTable(name)) if name == "accounts"
        ));
    }

    #[test]
    fn test_invalid_sort_is_a_configuration_error() {
        let file = TableFile::parse(&TABLES.replace("DESC", "sideways")).unwrap();
        assert!(matches!(
            file.config("users", RowData::clone),
            Err(ConfigError::Table(TableError::Configuration(_)))
        ));
    }
}
