use model::records::row::RowData;
use serde_json::{Map, Value as Json};

/// Nests a flat aliased row into `{ alias: { column: value } }`, one object
/// per alias. Fields belonging to none of `aliases` are dropped.
pub fn nest_by_alias<S: AsRef<str>>(row: &RowData, aliases: &[S]) -> Json {
    let nested = aliases
        .iter()
        .map(|alias| {
            let alias = alias.as_ref();
            (alias.to_string(), row.strip_prefix(alias).to_json())
        })
        .collect::<Map<_, _>>();
    Json::Object(nested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::row;
    use model::core::value::Value;
    use serde_json::json;

    #[test]
    fn test_nest_by_alias() {
        let flat = row(&[
            ("u_id", Value::Int(1)),
            ("u_user_name", Value::from("ada")),
            ("p_id", Value::Int(2)),
            ("total_results", Value::Int(10)),
        ]);

        assert_eq!(
            nest_by_alias(&flat, &["u", "p"]),
            json!({"u": {"id": 1, "user_name": "ada"}, "p": {"id": 2}})
        );
    }

    #[test]
    fn test_alias_without_fields_is_empty() {
        let flat = row(&[("u_id", Value::Int(1))]);
        assert_eq!(nest_by_alias(&flat, &["c"]), json!({"c": {}}));
    }
}
