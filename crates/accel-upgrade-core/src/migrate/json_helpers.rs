// Small mutation helpers shared by the section rewrites

use crate::document::type_name;
use crate::error::{MigrationError, Result};
use serde_json::{Map, Value};

/// Array under `key`, created when absent or null.
pub(crate) fn ensure_array<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
    location: &str,
) -> Result<&'a mut Vec<Value>> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if slot.is_null() {
        *slot = Value::Array(Vec::new());
    }
    let kind = type_name(slot);
    slot.as_array_mut().ok_or_else(|| {
        MigrationError::invalid_document(format!(
            "{}: '{}' must be an array, found {}",
            location, key, kind
        ))
    })
}

/// Object under `key`, created when absent or null.
pub(crate) fn ensure_object<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
    location: &str,
) -> Result<&'a mut Map<String, Value>> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if slot.is_null() {
        *slot = Value::Object(Map::new());
    }
    let kind = type_name(slot);
    slot.as_object_mut().ok_or_else(|| {
        MigrationError::invalid_document(format!(
            "{}: '{}' must be an object, found {}",
            location, key, kind
        ))
    })
}

/// True when some object in `items` has `field == name`.
pub(crate) fn has_entry_named(items: &[Value], field: &str, name: &str) -> bool {
    items
        .iter()
        .any(|item| item.get(field).and_then(Value::as_str) == Some(name))
}

/// Drop `key` when it holds an empty string.
pub(crate) fn remove_if_empty_string(map: &mut Map<String, Value>, key: &str) {
    if map.get(key).and_then(Value::as_str) == Some("") {
        map.shift_remove(key);
    }
}

pub(crate) fn set_str(map: &mut Map<String, Value>, key: &str, value: &str) {
    map.insert(key.to_string(), Value::String(value.to_string()));
}

/// Set `key` only when it is absent or empty.
pub(crate) fn backfill_str(map: &mut Map<String, Value>, key: &str, value: &str) {
    let missing = match map.get(key) {
        None | Some(Value::Null) => true,
        Some(Value::String(existing)) => existing.is_empty(),
        Some(_) => false,
    };
    if missing {
        set_str(map, key, value);
    }
}
