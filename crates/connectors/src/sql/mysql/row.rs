use chrono::{NaiveDate, NaiveDateTime};
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use mysql_async::{Row, Value as MySqlValue, consts::ColumnType};
use tracing::warn;

/// Character set id MySQL reports for binary strings.
const BINARY_CHARSET: u16 = 63;

/// Converts a MySQL row into a `RowData` named after `entity`.
pub fn to_row_data(row: &Row, entity: &str) -> RowData {
    let field_values = row
        .columns_ref()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let raw = row.as_ref(idx).cloned().unwrap_or(MySqlValue::NULL);
            FieldValue {
                name: column.name_str().into_owned(),
                value: convert(
                    raw,
                    column.column_type(),
                    column.character_set() == BINARY_CHARSET,
                ),
            }
        })
        .collect();

    RowData::new(entity, field_values)
}

/// Converts one MySQL value. Decimals and JSON always arrive as bytes, as does
/// everything read over the text protocol, so the column type decides how
/// bytes are parsed.
pub(crate) fn convert(raw: MySqlValue, column_type: ColumnType, binary: bool) -> Option<Value> {
    use ColumnType::*;

    match raw {
        MySqlValue::NULL => None,
        MySqlValue::Int(i) => Some(Value::Int(i)),
        MySqlValue::UInt(u) => Some(Value::Uint(u)),
        MySqlValue::Float(f) => Some(Value::Float(f as f64)),
        MySqlValue::Double(d) => Some(Value::Float(d)),
        MySqlValue::Date(y, mo, d, h, mi, s, us) => {
            let date = NaiveDate::from_ymd_opt(y as i32, mo as u32, d as u32)?;
            if column_type == MYSQL_TYPE_DATE {
                return Some(Value::Date(date));
            }
            date.and_hms_micro_opt(h as u32, mi as u32, s as u32, us)
                .map(|ts| Value::Timestamp(ts.and_utc()))
        }
        MySqlValue::Time(neg, days, h, mi, s, us) => {
            let sign = if neg { "-" } else { "" };
            let hours = days * 24 + h as u32;
            Some(Value::String(format!("{sign}{hours:02}:{mi:02}:{s:02}.{us:06}")))
        }
        MySqlValue::Bytes(bytes) => {
            let text = match String::from_utf8(bytes) {
                Ok(text) if !binary => text,
                Ok(text) => return Some(Value::Bytes(text.into_bytes())),
                Err(err) => return Some(Value::Bytes(err.into_bytes())),
            };

            let parsed = match column_type {
                MYSQL_TYPE_TINY | MYSQL_TYPE_SHORT | MYSQL_TYPE_INT24 | MYSQL_TYPE_LONG
                | MYSQL_TYPE_LONGLONG | MYSQL_TYPE_YEAR => text
                    .parse::<i64>()
                    .map(Value::Int)
                    .or_else(|_| text.parse::<u64>().map(Value::Uint))
                    .ok(),
                MYSQL_TYPE_FLOAT | MYSQL_TYPE_DOUBLE | MYSQL_TYPE_DECIMAL
                | MYSQL_TYPE_NEWDECIMAL => text.parse::<f64>().map(Value::Float).ok(),
                MYSQL_TYPE_JSON => serde_json::from_str(&text).map(Value::Json).ok(),
                MYSQL_TYPE_DATE => text.parse::<NaiveDate>().map(Value::Date).ok(),
                MYSQL_TYPE_DATETIME | MYSQL_TYPE_TIMESTAMP => {
                    NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f")
                        .map(|ts| Value::Timestamp(ts.and_utc()))
                        .ok()
                }
                _ => return Some(Value::String(text)),
            };

            if parsed.is_none() {
                warn!(?column_type, value = %text, "Failed to parse MySQL column, keeping text");
            }
            Some(parsed.unwrap_or(Value::String(text)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_protocol_values_are_typed() {
        assert_eq!(
            convert(MySqlValue::Bytes(b"3".to_vec()), ColumnType::MYSQL_TYPE_LONGLONG, false),
            Some(Value::Int(3))
        );
        assert_eq!(
            convert(MySqlValue::Bytes(b"1.50".to_vec()), ColumnType::MYSQL_TYPE_NEWDECIMAL, false),
            Some(Value::Float(1.5))
        );
        assert_eq!(
            convert(MySqlValue::Bytes(br#"{"a":1}"#.to_vec()), ColumnType::MYSQL_TYPE_JSON, false),
            Some(Value::Json(json!({"a": 1})))
        );
        assert_eq!(
            convert(MySqlValue::Bytes(b"hi".to_vec()), ColumnType::MYSQL_TYPE_VAR_STRING, false),
            Some(Value::String("hi".into()))
        );
    }

    #[test]
    fn test_binary_and_null() {
        assert_eq!(
            convert(MySqlValue::Bytes(vec![0xff, 0x00]), ColumnType::MYSQL_TYPE_BLOB, true),
            Some(Value::Bytes(vec![0xff, 0x00]))
        );
        assert_eq!(convert(MySqlValue::NULL, ColumnType::MYSQL_TYPE_LONG, false), None);
    }

    #[test]
    fn test_dates() {
        let date = convert(
            MySqlValue::Date(2024, 2, 29, 0, 0, 0, 0),
            ColumnType::MYSQL_TYPE_DATE,
            false,
        );
        assert_eq!(
            date,
            Some(Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()))
        );

        let ts = convert(
            MySqlValue::Bytes(b"2024-02-29 10:11:12".to_vec()),
            ColumnType::MYSQL_TYPE_DATETIME,
            false,
        );
        assert!(matches!(ts, Some(Value::Timestamp(_))));
    }
}
