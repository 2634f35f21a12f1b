use chrono::{Datelike, NaiveDateTime, Timelike};
use model::core::value::Value;
use mysql_async::{Params, Value as MySqlValue};

/// A value in the form `mysql_async` binds it. Text-like values travel as
/// bytes and booleans as integers, matching how MySQL stores them.
pub struct MySqlParam(MySqlValue);

impl MySqlParam {
    pub fn from_value(value: &Value) -> Self {
        let inner = match value {
            Value::Null => MySqlValue::NULL,
            Value::Int(i) => MySqlValue::Int(*i),
            Value::Uint(u) => MySqlValue::UInt(*u),
            Value::Float(f) => MySqlValue::Double(*f),
            Value::Boolean(b) => MySqlValue::Int(i64::from(*b)),
            Value::String(s) => MySqlValue::Bytes(s.as_bytes().to_vec()),
            Value::Json(j) => MySqlValue::Bytes(j.to_string().into_bytes()),
            Value::Uuid(u) => MySqlValue::Bytes(u.to_string().into_bytes()),
            Value::Bytes(b) => MySqlValue::Bytes(b.clone()),
            Value::Date(d) => datetime(d.and_time(Default::default())),
            Value::Timestamp(ts) => datetime(ts.naive_utc()),
        };
        MySqlParam(inner)
    }
}

fn datetime(dt: NaiveDateTime) -> MySqlValue {
    MySqlValue::Date(
        dt.year() as u16,
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
        dt.nanosecond() / 1_000,
    )
}

pub struct MySqlParamStore {
    pub params: Vec<MySqlParam>,
}

impl MySqlParamStore {
    pub fn from_values(values: &[Value]) -> Self {
        let params = values.iter().map(MySqlParam::from_value).collect();
        MySqlParamStore { params }
    }

    pub fn params(&self) -> Params {
        if self.params.is_empty() {
            return Params::Empty;
        }
        let mysql_values: Vec<MySqlValue> = self.params.iter().map(|p| p.0.clone()).collect();
        Params::Positional(mysql_values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_params() {
        let store = MySqlParamStore::from_values(&[Value::from("a"), Value::Uint(25), Value::Null]);
        match store.params() {
            Params::Positional(values) => assert_eq!(
                values,
                vec![
                    MySqlValue::Bytes(b"a".to_vec()),
                    MySqlValue::UInt(25),
                    MySqlValue::NULL
                ]
            ),
            other => panic!("unexpected params: {other:?}"),
        }
    }

    #[test]
    fn test_dates_bind_as_mysql_dates() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let MySqlParam(value) = MySqlParam::from_value(&Value::Date(day));
        assert_eq!(value, MySqlValue::Date(2024, 3, 1, 0, 0, 0, 0));

        let ts = day.and_hms_micro_opt(8, 30, 5, 250).unwrap().and_utc();
        let MySqlParam(value) = MySqlParam::from_value(&Value::Timestamp(ts));
        assert_eq!(value, MySqlValue::Date(2024, 3, 1, 8, 30, 5, 250));
    }

    #[test]
    fn test_no_values_is_empty() {
        assert!(matches!(MySqlParamStore::from_values(&[]).params(), Params::Empty));
    }
}
