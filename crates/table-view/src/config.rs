use crate::{error::TableError, view::TOTAL_RESULTS};
use model::{
    pagination::sort::{QualCol, SortDirection, SortOrder},
    records::row::RowData,
};
use query_builder::{
    ast::{expr::Expr, select::Select},
    qualified,
};
use std::{collections::HashSet, fmt, sync::Arc};

pub type Restruct<T> = Arc<dyn Fn(&RowData) -> T + Send + Sync>;
pub type BeforeQueryHook = Arc<dyn Fn(&Select) + Send + Sync>;
pub type ValidateRowHook<T> = Arc<dyn Fn(&T) -> Result<(), String> + Send + Sync>;
pub type JoinPredicate = Arc<dyn Fn(&str, &str) -> Expr + Send + Sync>;

/// A column exposed under its collision-free key, `{alias}_{column}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasedColumn {
    pub key: String,
    pub table: String,
    pub column: String,
}

impl AliasedColumn {
    pub fn new(alias: &str, column: &str) -> Self {
        AliasedColumn {
            key: format!("{alias}_{column}"),
            table: alias.to_string(),
            column: column.to_string(),
        }
    }

    /// `"alias"."column" AS "alias_column"`
    pub fn to_expr(&self) -> Expr {
        qualified(&self.table, &self.column).alias(&self.key)
    }
}

pub fn alias_columns(alias: &str, columns: &[String]) -> Vec<AliasedColumn> {
    columns
        .iter()
        .map(|column| AliasedColumn::new(alias, column))
        .collect()
}

/// How a joined table is matched against the base table.
#[derive(Clone)]
pub enum JoinOn {
    /// `{base}.{local} = {joined}.{foreign}`
    Columns { local: String, foreign: String },
    /// Builds the predicate from the base alias and the joined alias.
    Custom(JoinPredicate),
}

impl JoinOn {
    pub fn columns(local: &str, foreign: &str) -> Self {
        JoinOn::Columns {
            local: local.to_string(),
            foreign: foreign.to_string(),
        }
    }

    pub fn predicate(&self, base_alias: &str, join_alias: &str) -> Expr {
        match self {
            JoinOn::Columns { local, foreign } => {
                qualified(base_alias, local).equals(qualified(join_alias, foreign))
            }
            JoinOn::Custom(f) => f(base_alias, join_alias),
        }
    }
}

impl fmt::Debug for JoinOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinOn::Columns { local, foreign } => f
                .debug_struct("Columns")
                .field("local", local)
                .field("foreign", foreign)
                .finish(),
            JoinOn::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A table to left-join into a view, carrying its own aliased columns.
#[derive(Debug, Clone)]
pub struct JoinDescriptor {
    pub table: String,
    pub alias: String,
    pub columns: Vec<AliasedColumn>,
    pub on: JoinOn,
}

impl JoinDescriptor {
    pub fn new(table: &str, alias: &str, columns: &[String], on: JoinOn) -> Self {
        JoinDescriptor {
            table: table.to_string(),
            alias: alias.to_string(),
            columns: alias_columns(alias, columns),
            on,
        }
    }
}

/// Optional capabilities a table can plug into its queries.
pub struct TableHooks<T> {
    /// Sees every statement right before it is executed.
    pub before_query: Option<BeforeQueryHook>,
    /// Runs on each reshaped record; an `Err` fails the whole call.
    pub validate_row: Option<ValidateRowHook<T>>,
}

impl<T> Default for TableHooks<T> {
    fn default() -> Self {
        TableHooks {
            before_query: None,
            validate_row: None,
        }
    }
}

impl<T> Clone for TableHooks<T> {
    fn clone(&self) -> Self {
        TableHooks {
            before_query: self.before_query.clone(),
            validate_row: self.validate_row.clone(),
        }
    }
}

impl<T> TableHooks<T> {
    pub fn before_query(mut self, hook: impl Fn(&Select) + Send + Sync + 'static) -> Self {
        self.before_query = Some(Arc::new(hook));
        self
    }

    pub fn validate_row(
        mut self,
        hook: impl Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validate_row = Some(Arc::new(hook));
        self
    }
}

/// The immutable description of one logical table view.
pub struct TableConfig<T> {
    name: String,
    alias: String,
    columns: Vec<String>,
    aliased: Vec<AliasedColumn>,
    default_sort: Option<SortOrder>,
    joins: Vec<JoinDescriptor>,
    restruct: Restruct<T>,
    hooks: TableHooks<T>,
}

impl<T> TableConfig<T> {
    pub fn builder(
        name: &str,
        alias: &str,
        columns: impl IntoIterator<Item = impl Into<String>>,
        restruct: impl Fn(&RowData) -> T + Send + Sync + 'static,
    ) -> TableConfigBuilder<T> {
        TableConfigBuilder {
            name: name.to_string(),
            alias: alias.to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
            default_sort: None,
            joins: Vec::new(),
            restruct: Arc::new(restruct),
            hooks: TableHooks::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn aliased_columns(&self) -> &[AliasedColumn] {
        &self.aliased
    }

    pub fn default_sort(&self) -> Option<&SortOrder> {
        self.default_sort.as_ref()
    }

    pub fn joins(&self) -> &[JoinDescriptor] {
        &self.joins
    }

    pub fn hooks(&self) -> &TableHooks<T> {
        &self.hooks
    }

    pub fn restruct(&self, row: &RowData) -> T {
        (self.restruct)(row)
    }

    /// Every alias a result row carries fields for, base table first.
    pub fn aliases(&self) -> Vec<&str> {
        std::iter::once(self.alias.as_str())
            .chain(self.joins.iter().map(|j| j.alias.as_str()))
            .collect()
    }

    /// Describes this table as the joined side of another view, matched on
    /// `{base}.{local} = {this}.{foreign}`.
    pub fn join_on(&self, local: &str, foreign: &str) -> JoinDescriptor {
        JoinDescriptor::new(
            &self.name,
            &self.alias,
            &self.columns,
            JoinOn::columns(local, foreign),
        )
    }

    /// Describes this table as the joined side of another view, matched by
    /// a predicate built from the base alias and this table's alias.
    pub fn join_custom(
        &self,
        predicate: impl Fn(&str, &str) -> Expr + Send + Sync + 'static,
    ) -> JoinDescriptor {
        JoinDescriptor::new(
            &self.name,
            &self.alias,
            &self.columns,
            JoinOn::Custom(Arc::new(predicate)),
        )
    }

    /// Resolves a sort against this table's own columns. Unqualified
    /// columns are qualified with the table alias.
    pub fn resolve_sort(&self, sort: &SortOrder) -> Option<SortOrder> {
        if let Some(qualifier) = sort.column.qualifier() {
            if qualifier != self.alias {
                return None;
            }
        }

        self.columns
            .iter()
            .any(|c| c == &sort.column.column)
            .then(|| SortOrder {
                column: QualCol {
                    table: self.alias.clone(),
                    column: sort.column.column.clone(),
                },
                direction: sort.direction,
            })
    }
}

pub struct TableConfigBuilder<T> {
    name: String,
    alias: String,
    columns: Vec<String>,
    default_sort: Option<(String, String)>,
    joins: Vec<JoinDescriptor>,
    restruct: Restruct<T>,
    hooks: TableHooks<T>,
}

impl<T> TableConfigBuilder<T> {
    pub fn join(mut self, join: JoinDescriptor) -> Self {
        self.joins.push(join);
        self
    }

    pub fn joins(mut self, joins: impl IntoIterator<Item = JoinDescriptor>) -> Self {
        self.joins.extend(joins);
        self
    }

    /// Sort applied when a request does not override it. Both parts are
    /// checked by `build`.
    pub fn default_sort(mut self, column: &str, direction: &str) -> Self {
        self.default_sort = Some((column.to_string(), direction.to_string()));
        self
    }

    pub fn hooks(mut self, hooks: TableHooks<T>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> Result<TableConfig<T>, TableError> {
        if self.name.trim().is_empty() {
            return Err(TableError::Configuration("table name is empty".into()));
        }
        if self.alias.trim().is_empty() {
            return Err(TableError::Configuration(format!(
                "table '{}' has an empty alias",
                self.name
            )));
        }
        if self.columns.is_empty() {
            return Err(TableError::Configuration(format!(
                "table '{}' declares no columns",
                self.name
            )));
        }

        let mut aliases = HashSet::from([self.alias.as_str()]);
        for join in &self.joins {
            if !aliases.insert(join.alias.as_str()) {
                return Err(TableError::Configuration(format!(
                    "alias '{}' is used more than once in table '{}'",
                    join.alias, self.name
                )));
            }
        }

        let aliased = alias_columns(&self.alias, &self.columns);

        // Row fields are looked up case-insensitively.
        let mut keys = HashSet::from([TOTAL_RESULTS.to_string()]);
        let all_columns = aliased
            .iter()
            .chain(self.joins.iter().flat_map(|join| join.columns.iter()));
        for column in all_columns {
            if !keys.insert(column.key.to_ascii_lowercase()) {
                return Err(TableError::Configuration(format!(
                    "column key '{}' is produced more than once in table '{}'",
                    column.key, self.name
                )));
            }
        }

        // `{a}_` must not start `{b}_`, or reshaping by alias would pick up
        // the other table's fields.
        for a in &aliases {
            for b in &aliases {
                let (a_prefix, b_prefix) = (format!("{a}_"), format!("{b}_"));
                let shadowed = b_prefix
                    .get(..a_prefix.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(&a_prefix));
                if a != b && shadowed {
                    return Err(TableError::Configuration(format!(
                        "alias '{b}' starts with alias '{a}' in table '{}'",
                        self.name
                    )));
                }
            }
        }

        let mut config = TableConfig {
            aliased,
            name: self.name,
            alias: self.alias,
            columns: self.columns,
            default_sort: None,
            joins: self.joins,
            restruct: self.restruct,
            hooks: self.hooks,
        };

        if let Some((column, direction)) = self.default_sort {
            let direction = direction
                .parse::<SortDirection>()
                .map_err(|e| TableError::Configuration(e.to_string()))?;
            let requested = SortOrder::new(&column, direction);
            let resolved = config.resolve_sort(&requested).ok_or_else(|| {
                TableError::Configuration(format!(
                    "default sort column '{column}' is not a column of table '{}'",
                    config.name
                ))
            })?;
            config.default_sort = Some(resolved);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> TableConfigBuilder<RowData> {
        TableConfig::builder("users", "u", ["id", "email", "created"], RowData::clone)
    }

    #[test]
    fn test_columns_are_aliased() {
        let config = users().build().unwrap();
        let keys: Vec<_> = config.aliased_columns().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["u_id", "u_email", "u_created"]);
        assert_eq!(config.aliased_columns()[0].table, "u");
        assert!(config.default_sort().is_none());
    }

    #[test]
    fn test_default_sort_is_qualified() {
        let config = users().default_sort("created", "DESCENDING").build().unwrap();
        let sort = config.default_sort().unwrap();
        assert_eq!(sort.column.to_string(), "u.created");
        assert_eq!(sort.direction, SortDirection::Desc);

        let config = users().default_sort("u.email", "asc").build().unwrap();
        assert_eq!(config.default_sort().unwrap().column.column, "email");
    }

    #[test]
    fn test_default_sort_direction_is_validated() {
        let err = users().default_sort("created", "sideways").build().err().unwrap();
        assert!(matches!(err, TableError::Configuration(msg) if msg.contains("sideways")));
    }

    #[test]
    fn test_default_sort_column_must_be_declared() {
        let err = users().default_sort("updated", "asc").build().err().unwrap();
        assert!(matches!(err, TableError::Configuration(msg) if msg.contains("updated")));

        let err = users().default_sort("p.created", "asc").build().err().unwrap();
        assert!(matches!(err, TableError::Configuration(_)));
    }

    #[test]
    fn test_join_descriptor_from_table() {
        let profiles = TableConfig::builder("profiles", "p", ["id", "bio"], RowData::clone)
            .build()
            .unwrap();

        let join = profiles.join_on("id", "user_id");
        assert_eq!(join.table, "profiles");
        assert_eq!(join.columns[1].key, "p_bio");
        assert_eq!(
            join.on.predicate("u", "p"),
            qualified("u", "id").equals(qualified("p", "user_id"))
        );

        let config = users().join(join).build().unwrap();
        assert_eq!(config.aliases(), ["u", "p"]);
    }

    #[test]
    fn test_duplicate_join_alias_is_rejected() {
        let other = TableConfig::builder("accounts", "u", ["id"], RowData::clone)
            .build()
            .unwrap();
        let err = users().join(other.join_on("id", "id")).build().err().unwrap();
        assert!(matches!(err, TableError::Configuration(_)));
    }

    #[test]
    fn test_colliding_column_keys_are_rejected() {
        let err = TableConfig::builder("users", "u", ["id", "ID"], RowData::clone)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, TableError::Configuration(msg) if msg.contains("u_ID")));

        let err = TableConfig::builder("stats", "total", ["results"], RowData::clone)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, TableError::Configuration(msg) if msg.contains("total_results")));

        let profiles = TableConfig::builder("profiles", "u_p", ["id"], RowData::clone)
            .build()
            .unwrap();
        let err = TableConfig::builder("users", "u", ["p_id", "email"], RowData::clone)
            .join(profiles.join_on("email", "id"))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, TableError::Configuration(msg) if msg.contains("u_p_id")));
    }

    #[test]
    fn test_alias_prefixing_another_alias_is_rejected() {
        let profiles = TableConfig::builder("profiles", "u_p", ["bio"], RowData::clone)
            .build()
            .unwrap();
        let err = users().join(profiles.join_on("id", "bio")).build().err().unwrap();
        assert!(matches!(err, TableError::Configuration(msg) if msg.contains("'u_p'")));

        let other = TableConfig::builder("accounts", "U", ["name"], RowData::clone)
            .build()
            .unwrap();
        assert!(users().join(other.join_on("id", "name")).build().is_err());

        let posts = TableConfig::builder("posts", "up", ["title"], RowData::clone)
            .build()
            .unwrap();
        assert!(users().join(posts.join_on("id", "title")).build().is_ok());
    }

    #[test]
    fn test_empty_columns_are_rejected() {
        let err = TableConfig::builder("users", "u", Vec::<String>::new(), RowData::clone)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, TableError::Configuration(_)));
    }
}
