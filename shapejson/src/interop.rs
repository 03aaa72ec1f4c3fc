//! Conversions to and from `serde_json` values.

use crate::coerce::format_datetime;
use crate::value::{Key, Number, Value};

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(if let Some(n) = n.as_i64() {
                Number::I64(n)
            } else if let Some(n) = n.as_u64() {
                Number::U64(n)
            } else {
                Number::F64(n.as_f64().unwrap_or(f64::NAN))
            }),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (Key::String(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Dates become their wire strings, records become objects keyed by wire key, and non-finite or
/// non-numeric numbers become `null` and strings respectively.
impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => number(n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::DateTime(dt) => serde_json::Value::String(format_datetime(*dt)),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
                    .collect(),
            ),
            Value::Record(record) => serde_json::Value::Object(
                record
                    .fields()
                    .map(|(binding, v)| (binding.key().to_owned(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

fn number(n: &Number) -> serde_json::Value {
    let float = |f: f64| {
        serde_json::Number::from_f64(f).map_or(serde_json::Value::Null, serde_json::Value::Number)
    };
    match n {
        Number::I64(n) => serde_json::Value::from(*n),
        Number::U64(n) => serde_json::Value::from(*n),
        Number::F32(f) => float(f.to_string().parse().unwrap_or(f64::NAN)),
        Number::F64(f) => float(*f),
        Number::Raw(raw) => match serde_json::from_str::<serde_json::Number>(raw) {
            Ok(n) => serde_json::Value::Number(n),
            Err(_) => serde_json::Value::String(raw.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::value::{Number, Value};

    #[test]
    fn from_serde_json() {
        let value = Value::from(json!({"a": [1, -2, 2.5, 18446744073709551615u64], "b": null}));
        let a = value.get("a").unwrap().as_array().unwrap();
        assert!(matches!(a[0], Value::Number(Number::I64(1))));
        assert!(matches!(a[2], Value::Number(Number::F64(f)) if f == 2.5));
        assert!(matches!(a[3], Value::Number(Number::U64(u64::MAX))));
        assert_eq!(value.get("b"), Some(&Value::Null));
    }

    #[test]
    fn into_serde_json() {
        let value = Value::from(vec![
            Value::Number(Number::Raw("13e7".into())),
            Value::Number(Number::Raw("1-2".into())),
            Value::Number(Number::F32(55.7)),
            Value::from(f64::INFINITY),
        ]);
        assert_eq!(
            serde_json::Value::from(&value),
            json!([130000000.0, "1-2", 55.7, null])
        );
    }
}
