use crate::core::value::{FieldValue, Value};
use serde::{Deserialize, Serialize};

/// A flat result row. Columns selected through a table view are named
/// `{alias}_{column}`, so fields from joined tables never collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    pub entity: String,
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(entity: &str, field_values: Vec<FieldValue>) -> Self {
        RowData {
            entity: entity.to_string(),
            field_values,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .and_then(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    /// Returns the fields belonging to one table alias with the
    /// `{alias}_` prefix removed.
    pub fn strip_prefix(&self, alias: &str) -> RowData {
        let prefix = format!("{alias}_");
        let field_values = self
            .field_values
            .iter()
            .filter_map(|f| {
                let head = f.name.get(..prefix.len())?;
                head.eq_ignore_ascii_case(&prefix).then(|| FieldValue {
                    name: f.name[prefix.len()..].to_string(),
                    value: f.value.clone(),
                })
            })
            .collect();

        RowData::new(alias, field_values)
    }

    /// Converts the row into a JSON object keyed by field name.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .field_values
            .iter()
            .map(|f| {
                let value = f.value.as_ref().map_or(serde_json::Value::Null, Value::to_json);
                (f.name.clone(), value)
            })
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}
