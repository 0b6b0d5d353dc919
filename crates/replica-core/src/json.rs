//! Conversions between plain data `Value`s and `serde_json::Value`.
//!
//! Only the JSON-shaped subset converts: nullish values, booleans, finite
//! numbers, strings, arrays and objects (dates become ISO strings on the way
//! out). Anything else is rejected rather than guessed at.

use std::rc::Rc;

use crate::error::ReplicaError;
use crate::object::{Array, Object};
use crate::value::{resolve, Value};

/// Convert plain data to JSON, erroring on NaN/Infinity and non-data kinds.
pub fn value_to_json(val: &Value) -> Result<serde_json::Value, ReplicaError> {
    match val {
        Value::Undefined | Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Number(n) => number_to_json(*n),
        Value::String(s) => Ok(serde_json::Value::String(s.to_string())),
        Value::Array(items) => {
            let arr: Result<Vec<_>, _> = (0..items.len())
                .map(|i| match items.get(i) {
                    Some(item) => value_to_json(&item),
                    None => Ok(serde_json::Value::Null),
                })
                .collect();
            Ok(serde_json::Value::Array(arr?))
        }
        Value::Object(object) => {
            let mut obj = serde_json::Map::new();
            for key in object.enumerable_keys() {
                let value = object.get_spur(key).unwrap_or(Value::Undefined);
                obj.insert(resolve(key), value_to_json(&value)?);
            }
            Ok(serde_json::Value::Object(obj))
        }
        Value::Date(date) => date
            .to_datetime()
            .map(|dt| {
                serde_json::Value::String(
                    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                )
            })
            .ok_or_else(|| ReplicaError::range("invalid date has no JSON form")),
        other => Err(ReplicaError::type_error(
            "JSON-compatible value",
            other.type_name(),
        )),
    }
}

/// Integral numbers within the exact `f64` integer range become JSON integers.
fn number_to_json(n: f64) -> Result<serde_json::Value, ReplicaError> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Ok(serde_json::Value::Number((n as i64).into()));
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .ok_or_else(|| ReplicaError::type_error("finite number", n.to_string()))
}

/// Build plain data from JSON. Integers beyond `f64` precision round the way
/// number parsing does.
pub fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::string(s),
        serde_json::Value::Array(arr) => Value::Array(Rc::new(Array::from_values(
            arr.iter().map(json_to_value).collect(),
        ))),
        serde_json::Value::Object(obj) => {
            let object = Object::new();
            for (k, v) in obj {
                object.set(k, json_to_value(v));
            }
            Value::object(object)
        }
    }
}
