//! Recursive merge of JSON values.
//!
//! Objects merge key by key, arrays merge index by index, and every other
//! source value (including `null`) overwrites the target. Keys present only in
//! the target are always kept, so repeated merges are cumulative.

use serde_json::{Map, Value};

/// Merges `source` into `target` in place.
pub fn deep_merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => merge_maps(target, source),
        (Value::Array(target), Value::Array(source)) => {
            for (index, value) in source.iter().enumerate() {
                match target.get_mut(index) {
                    Some(slot) => deep_merge(slot, value),
                    None => target.push(value.clone()),
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}

/// Merges every entry of `source` into `target` in place.
pub fn merge_maps(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        match target.get_mut(key) {
            Some(slot) => deep_merge(slot, value),
            None => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
