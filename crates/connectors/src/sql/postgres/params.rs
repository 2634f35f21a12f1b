use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use model::core::value::Value;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use tokio_postgres::types::{Json as PgJson, ToSql, Type};
use uuid::Uuid;

/// A parameter boxed as the Rust type the prepared statement expects.
///
/// tokio-postgres refuses to bind e.g. an `i64` to an `int4` slot, so values
/// are converted against the parameter types reported by `prepare`.
pub struct PgParam(Box<dyn ToSql + Sync + Send>);

impl PgParam {
    pub fn for_type(value: Value, ty: &Type) -> Self {
        match value {
            Value::Null => Self::null(ty),
            Value::Int(v) => Self::integer(v, ty),
            Value::Uint(v) => match i64::try_from(v) {
                Ok(v) => Self::integer(v, ty),
                Err(_) => PgParam(Box::new(Decimal::from(v))),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => PgParam(Box::new(v as f32)),
                Type::NUMERIC => PgParam(Box::new(Decimal::from_f64(v).unwrap_or_default())),
                _ => PgParam(Box::new(v)),
            },
            Value::String(v) => Self::text(v, ty),
            Value::Boolean(v) => PgParam(Box::new(v)),
            Value::Json(v) => match *ty {
                Type::TEXT | Type::VARCHAR => PgParam(Box::new(v.to_string())),
                _ => PgParam(Box::new(PgJson(v))),
            },
            Value::Uuid(v) => match *ty {
                Type::TEXT | Type::VARCHAR => PgParam(Box::new(v.to_string())),
                _ => PgParam(Box::new(v)),
            },
            Value::Bytes(v) => PgParam(Box::new(v)),
            Value::Date(v) => PgParam(Box::new(v)),
            Value::Timestamp(v) => match *ty {
                Type::TIMESTAMP => PgParam(Box::new(v.naive_utc())),
                _ => PgParam(Box::new(v)),
            },
        }
    }

    fn integer(v: i64, ty: &Type) -> Self {
        match *ty {
            Type::INT2 => match i16::try_from(v) {
                Ok(v) => PgParam(Box::new(v)),
                Err(_) => PgParam(Box::new(v)),
            },
            Type::INT4 => match i32::try_from(v) {
                Ok(v) => PgParam(Box::new(v)),
                Err(_) => PgParam(Box::new(v)),
            },
            Type::FLOAT4 => PgParam(Box::new(v as f32)),
            Type::FLOAT8 => PgParam(Box::new(v as f64)),
            Type::NUMERIC => PgParam(Box::new(Decimal::from(v))),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR => PgParam(Box::new(v.to_string())),
            _ => PgParam(Box::new(v)),
        }
    }

    fn text(v: String, ty: &Type) -> Self {
        match *ty {
            Type::INT2 | Type::INT4 | Type::INT8 => match v.parse::<i64>() {
                Ok(n) => Self::integer(n, ty),
                Err(_) => PgParam(Box::new(v)),
            },
            Type::UUID => match Uuid::parse_str(&v) {
                Ok(id) => PgParam(Box::new(id)),
                Err(_) => PgParam(Box::new(v)),
            },
            Type::DATE => match v.parse::<NaiveDate>() {
                Ok(d) => PgParam(Box::new(d)),
                Err(_) => PgParam(Box::new(v)),
            },
            Type::TIMESTAMPTZ => match v.parse::<DateTime<Utc>>() {
                Ok(ts) => PgParam(Box::new(ts)),
                Err(_) => PgParam(Box::new(v)),
            },
            Type::TIMESTAMP => match v.parse::<NaiveDateTime>() {
                Ok(ts) => PgParam(Box::new(ts)),
                Err(_) => PgParam(Box::new(v)),
            },
            _ => PgParam(Box::new(v)),
        }
    }

    /// A typed NULL; `Option::<T>::None` only binds where `T` is accepted.
    fn null(ty: &Type) -> Self {
        match *ty {
            Type::BOOL => PgParam(Box::new(None::<bool>)),
            Type::INT2 => PgParam(Box::new(None::<i16>)),
            Type::INT4 => PgParam(Box::new(None::<i32>)),
            Type::INT8 => PgParam(Box::new(None::<i64>)),
            Type::FLOAT4 => PgParam(Box::new(None::<f32>)),
            Type::FLOAT8 => PgParam(Box::new(None::<f64>)),
            Type::NUMERIC => PgParam(Box::new(None::<Decimal>)),
            Type::UUID => PgParam(Box::new(None::<Uuid>)),
            Type::BYTEA => PgParam(Box::new(None::<Vec<u8>>)),
            Type::DATE => PgParam(Box::new(None::<NaiveDate>)),
            Type::TIMESTAMP => PgParam(Box::new(None::<NaiveDateTime>)),
            Type::TIMESTAMPTZ => PgParam(Box::new(None::<DateTime<Utc>>)),
            Type::JSON | Type::JSONB => PgParam(Box::new(None::<PgJson<serde_json::Value>>)),
            _ => PgParam(Box::new(None::<String>)),
        }
    }
}

impl AsRef<dyn ToSql + Sync> for PgParam {
    fn as_ref(&self) -> &(dyn ToSql + Sync + 'static) {
        &*self.0
    }
}

pub struct PgParamStore {
    pub params: Vec<PgParam>,
}

impl PgParamStore {
    /// Pairs each value with the type of its placeholder. Extra values (a
    /// mismatch the server will report anyway) are bound as `TEXT`.
    pub fn from_values(values: Vec<Value>, types: &[Type]) -> Self {
        Self {
            params: values
                .into_iter()
                .enumerate()
                .map(|(i, value)| PgParam::for_type(value, types.get(i).unwrap_or(&Type::TEXT)))
                .collect(),
        }
    }

    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|param| param.as_ref())
            .collect::<Vec<_>>()
    }
}
