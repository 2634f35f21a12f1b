use crate::error::TableError;
use model::core::value::Value;
use query_builder::{ast::expr::Expr, ident, qualified, value};

/// The predicate restricting which rows of a table are paged over.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// Every row.
    #[default]
    All,
    /// `column = value` for each pair, combined with `AND`. A `Null` value
    /// matches with `IS NULL`.
    Equals(Vec<(String, Value)>),
    /// An arbitrary predicate, used as given.
    Expr(Expr),
}

impl Filter {
    pub fn equals(pairs: impl IntoIterator<Item = (impl Into<String>, Value)>) -> Self {
        Filter::Equals(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a filter from a JSON literal: `null` matches everything and an
    /// object maps column names to scalar values.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, TableError> {
        match json {
            serde_json::Value::Null => Ok(Filter::All),
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(column, v)| match v {
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                        Err(TableError::InvalidArgument(format!(
                            "filter value for '{column}' must be a scalar"
                        )))
                    }
                    scalar => Ok((column.clone(), Value::from_json(scalar))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Filter::Equals),
            other => Err(TableError::InvalidArgument(format!(
                "filter must be a JSON object, got {other}"
            ))),
        }
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if let Filter::Equals(pairs) = self {
            if pairs.iter().any(|(column, _)| column.trim().is_empty()) {
                return Err(TableError::InvalidArgument(
                    "filter column names must not be empty".into(),
                ));
            }
        }
        Ok(())
    }

    /// The `WHERE` predicate, if the filter restricts anything. Equality
    /// columns are qualified with `qualifier` when one is given.
    pub fn to_expr(&self, qualifier: Option<&str>) -> Option<Expr> {
        match self {
            Filter::All => None,
            Filter::Expr(expr) => Some(expr.clone()),
            Filter::Equals(pairs) => pairs
                .iter()
                .map(|(column, v)| {
                    let column = match qualifier {
                        Some(q) => qualified(q, column),
                        None => ident(column),
                    };
                    match v {
                        Value::Null => column.is_null(),
                        v => column.equals(value(v.clone())),
                    }
                })
                .reduce(Expr::and),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_builder::{dialect::Postgres, renderer::render};
    use serde_json::json;

    #[test]
    fn test_equality_filter_renders_as_conjunction() {
        let filter = Filter::equals([("status", Value::from("active")), ("deleted_at", Value::Null)]);
        let (sql, params) = render(&filter.to_expr(None).unwrap(), &Postgres);
        assert_eq!(sql, r#"(("status" = $1) AND "deleted_at" IS NULL)"#);
        assert_eq!(params, vec![Value::from("active")]);

        let (sql, _) = render(&filter.to_expr(Some("u")).unwrap(), &Postgres);
        assert!(sql.starts_with(r#"(("u"."status" = $1)"#));
    }

    #[test]
    fn test_empty_filters_match_everything() {
        assert_eq!(Filter::All.to_expr(None), None);
        assert_eq!(Filter::Equals(vec![]).to_expr(None), None);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Filter::from_json(&json!(null)).unwrap(), Filter::All);
        assert_eq!(
            Filter::from_json(&json!({"id": 7})).unwrap(),
            Filter::equals([("id", Value::Int(7))])
        );
        assert!(matches!(
            Filter::from_json(&json!([1, 2])),
            Err(TableError::InvalidArgument(_))
        ));
        assert!(matches!(
            Filter::from_json(&json!({"tags": ["a"]})),
            Err(TableError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_blank_column_is_invalid() {
        let filter = Filter::equals([(" ", Value::Int(1))]);
        assert!(matches!(filter.validate(), Err(TableError::InvalidArgument(_))));
    }
}
