//! Projection between `Value` and `serde_json::Value`.
//!
//! Diagnostics (call reports, diff trees) live in the JSON domain so the
//! diff layer stays independent of the mock layer. Functions and
//! promises have no JSON shape and project as marker strings; numbers
//! that JSON cannot carry (NaN, infinities) project as null.

use serde_json::{Map, Number, Value as JsonValue};
use std::sync::Arc;

use crate::object::{Object, PropertyDescriptor, PropertyKey};
use crate::value::Value;

/// Depth cap for the projection; cyclic graphs bottom out as a marker.
const MAX_DEPTH: usize = 16;

/// Project a `Value` into JSON for diagnostics.
pub fn to_json(value: &Value) -> JsonValue {
    to_json_depth(value, 0)
}

fn to_json_depth(value: &Value, depth: usize) -> JsonValue {
    if depth > MAX_DEPTH {
        return JsonValue::String("[Truncated]".into());
    }

    match value {
        Value::Undefined => JsonValue::Null,
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => Number::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number),
        Value::String(s) => JsonValue::String(s.to_string()),
        Value::Function(f) => JsonValue::String(format!("[Function: {}]", f.name())),
        Value::Promise(_) => JsonValue::String("[Promise]".into()),
        Value::Object(obj) => {
            let mut map = Map::new();
            let mut keys = obj.own_keys();
            keys.sort();
            for key in keys {
                let projected = match obj.own_descriptor(&key) {
                    Some(PropertyDescriptor::Data { value, attributes }) if attributes.enumerable => {
                        Some(to_json_depth(&value, depth + 1))
                    }
                    Some(PropertyDescriptor::Accessor { attributes, .. }) if attributes.enumerable => {
                        Some(JsonValue::String("[Getter/Setter]".into()))
                    }
                    _ => None,
                };
                if let Some(v) = projected {
                    map.insert(key.to_string(), v);
                }
            }
            JsonValue::Object(map)
        }
    }
}

/// Build a `Value` from JSON. Arrays become objects keyed by index.
///
/// Handy for factories and tests that want data exports without
/// assembling descriptor tables by hand.
pub fn value_from_json(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        JsonValue::String(s) => Value::string(s),
        JsonValue::Array(items) => {
            let obj = Arc::new(Object::new(None));
            for (i, item) in items.iter().enumerate() {
                // The projection is diagnostic-only, so index-keyed
                // entries are good enough for array data.
                let _ = obj.set(PropertyKey::from(i.to_string()), value_from_json(item));
            }
            let _ = obj.set(PropertyKey::from("length"), Value::number(items.len() as f64));
            Value::Object(obj)
        }
        JsonValue::Object(map) => {
            let obj = Arc::new(Object::new(None));
            for (k, v) in map {
                let _ = obj.set(PropertyKey::from(k.as_str()), value_from_json(v));
            }
            Value::Object(obj)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::native_fn;
    use serde_json::json;

    #[test]
    fn test_primitives_to_json() {
        assert_eq!(to_json(&Value::undefined()), json!(null));
        assert_eq!(to_json(&Value::number(1.5)), json!(1.5));
        assert_eq!(to_json(&Value::string("hi")), json!("hi"));
        assert_eq!(to_json(&Value::boolean(false)), json!(false));
        assert_eq!(to_json(&Value::number(f64::NAN)), json!(null));
    }

    #[test]
    fn test_function_marker() {
        let f = native_fn("greet", |_| Ok(Value::undefined()));
        assert_eq!(to_json(&f), json!("[Function: greet]"));
    }

    #[test]
    fn test_object_projection() {
        let v = value_from_json(&json!({"a": 1, "b": {"c": "x"}}));
        assert_eq!(to_json(&v), json!({"a": 1.0, "b": {"c": "x"}}));
    }

    #[test]
    fn test_roundtrip_preserves_structure() {
        let original = json!({"name": "stoat", "count": 3.0, "nested": {"ok": true}});
        assert_eq!(to_json(&value_from_json(&original)), original);
    }

    #[test]
    fn test_array_as_indexed_object() {
        let v = value_from_json(&json!([10, 20]));
        let obj = v.as_object().unwrap();
        let first = obj.get(&PropertyKey::from("0")).unwrap().unwrap();
        assert_eq!(first.as_number(), Some(10.0));
        let len = obj.get(&PropertyKey::from("length")).unwrap().unwrap();
        assert_eq!(len.as_number(), Some(2.0));
    }
}
