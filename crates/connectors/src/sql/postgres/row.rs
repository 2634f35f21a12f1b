use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use tokio_postgres::{
    Row,
    types::{FromSql, Type},
};
use tracing::warn;
use uuid::Uuid;

/// Converts a Postgres row into a `RowData` named after `entity`.
pub fn to_row_data(row: &Row, entity: &str) -> RowData {
    let field_values = row
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| FieldValue {
            name: column.name().to_string(),
            value: column_value(row, idx, column.type_()),
        })
        .collect();

    RowData::new(entity, field_values)
}

/// `None` means SQL `NULL` or a value that could not be decoded.
fn column_value(row: &Row, idx: usize, ty: &Type) -> Option<Value> {
    match *ty {
        Type::BOOL => get::<bool>(row, idx).map(Value::Boolean),
        Type::INT2 => get::<i16>(row, idx).map(|v| Value::Int(v as i64)),
        Type::INT4 => get::<i32>(row, idx).map(|v| Value::Int(v as i64)),
        Type::INT8 => get::<i64>(row, idx).map(Value::Int),
        Type::OID => get::<u32>(row, idx).map(|v| Value::Uint(v as u64)),
        Type::FLOAT4 => get::<f32>(row, idx).map(|v| Value::Float(v as f64)),
        Type::FLOAT8 => get::<f64>(row, idx).map(Value::Float),
        Type::NUMERIC => get::<Decimal>(row, idx).and_then(|v| v.to_f64()).map(Value::Float),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            get::<String>(row, idx).map(Value::String)
        }
        Type::JSON | Type::JSONB => get::<serde_json::Value>(row, idx).map(Value::Json),
        Type::UUID => get::<Uuid>(row, idx).map(Value::Uuid),
        Type::BYTEA => get::<Vec<u8>>(row, idx).map(Value::Bytes),
        Type::DATE => get::<NaiveDate>(row, idx).map(Value::Date),
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, idx).map(Value::Timestamp),
        Type::TIMESTAMP => get::<NaiveDateTime>(row, idx).map(|v| Value::Timestamp(v.and_utc())),
        _ => match row.try_get::<_, Option<String>>(idx) {
            Ok(v) => v.map(Value::String),
            Err(err) => {
                warn!(column = idx, ty = %ty, %err, "Unsupported Postgres column type");
                None
            }
        },
    }
}

fn get<'a, T: FromSql<'a>>(row: &'a Row, idx: usize) -> Option<T> {
    match row.try_get::<_, Option<T>>(idx) {
        Ok(v) => v,
        Err(err) => {
            warn!(column = idx, %err, "Failed to decode Postgres column");
            None
        }
    }
}
