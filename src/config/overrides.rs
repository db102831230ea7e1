use serde::Serialize;
use serde_json::Value;

/// Strip values that should not mask lower configuration layers.
///
/// Unset flags serialize as `null`, repeatable flags as `[]`; both are
/// removed, along with any object left empty by the removal.
pub fn filter_empty_values<T: Serialize>(input: T) -> Value {
    let mut value = serde_json::to_value(input).unwrap_or(Value::Null);
    filter_recursive(&mut value);
    value
}

fn filter_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for v in map.values_mut() {
                filter_recursive(v);
            }
            map.retain(|_, v| !is_empty(v));
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                filter_recursive(item);
            }
        }
        _ => {}
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
