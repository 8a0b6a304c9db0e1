//! JSON side of the codecs.
//!
//! Payloads are parsed into `serde_json::Value` first; every lookup below is a
//! checked conversion with an explicit "absent" outcome. `null` and a missing
//! key mean the same thing. Redmine's older JSON output sometimes quotes
//! numbers and booleans, so the scalar readers accept both forms.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::primitive::{read_bool, read_int, read_nullable_datetime, write_datetime};
use super::{writable_fields, Field, JsonObject, Resource, Slot};
use crate::error::{RedmineError, Result};
use crate::format::MimeFormat;
use crate::types::IdentifiableName;

fn present<'a>(object: &'a JsonObject, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

fn mismatch(key: &str, expected: &str, value: &Value) -> RedmineError {
    RedmineError::format(format!("`{key}` should be {expected}, found {value}"))
}

fn as_int(key: &str, value: &Value) -> Result<i32> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| mismatch(key, "a 32-bit integer", value)),
        Value::String(text) => read_int(key, text),
        _ => Err(mismatch(key, "an integer", value)),
    }
}

fn as_bool(key: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(text) => read_bool(key, text),
        Value::Number(number) => read_bool(key, &number.to_string()),
        _ => Err(mismatch(key, "a boolean", value)),
    }
}

fn as_string(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        _ => Err(mismatch(key, "a string", value)),
    }
}

fn as_values(key: &str, value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Array(items) => items.iter().map(|item| as_string(key, item)).collect(),
        single => Ok(vec![as_string(key, single)?]),
    }
}

fn as_datetime(key: &str, value: &Value) -> Result<Option<DateTime<Utc>>> {
    match value {
        Value::String(text) => read_nullable_datetime(key, text),
        _ => Err(mismatch(key, "a date string", value)),
    }
}

pub fn as_object<'a>(key: &str, value: &'a Value) -> Result<&'a JsonObject> {
    value
        .as_object()
        .ok_or_else(|| mismatch(key, "an object", value))
}

pub fn get_int(object: &JsonObject, key: &str) -> Result<Option<i32>> {
    present(object, key).map(|value| as_int(key, value)).transpose()
}

pub fn get_bool(object: &JsonObject, key: &str) -> Result<Option<bool>> {
    present(object, key).map(|value| as_bool(key, value)).transpose()
}

pub fn get_string(object: &JsonObject, key: &str) -> Result<Option<String>> {
    present(object, key).map(|value| as_string(key, value)).transpose()
}

/// A single string or an array of strings, always returned as a list.
pub fn get_values(object: &JsonObject, key: &str) -> Result<Option<Vec<String>>> {
    present(object, key).map(|value| as_values(key, value)).transpose()
}

pub fn get_datetime(object: &JsonObject, key: &str) -> Result<Option<DateTime<Utc>>> {
    Ok(present(object, key)
        .map(|value| as_datetime(key, value))
        .transpose()?
        .flatten())
}

pub fn get_identifiable_name(object: &JsonObject, key: &str) -> Result<Option<IdentifiableName>> {
    present(object, key)
        .map(|value| read_object(as_object(key, value)?))
        .transpose()
}

pub fn get_collection<T: Resource>(object: &JsonObject, key: &str) -> Result<Option<Vec<T>>> {
    present(object, key)
        .map(|value| read_array(key, value))
        .transpose()
}

/// Read every element of a JSON array as `T`.
pub fn read_array<T: Resource>(key: &str, value: &Value) -> Result<Vec<T>> {
    value
        .as_array()
        .ok_or_else(|| mismatch(key, "an array", value))?
        .iter()
        .map(|item| read_object(as_object(key, item)?))
        .collect()
}

/// Read an entity by consulting each key of its field table.
pub fn read_object<T: Resource>(object: &JsonObject) -> Result<T> {
    let mut target = T::default();
    for field in T::fields() {
        if let Some(value) = present(object, field.key) {
            read_value(field, &mut target, value)?;
        }
    }
    Ok(target)
}

fn read_value<T>(field: &Field<T>, target: &mut T, value: &Value) -> Result<()> {
    let key = field.key;
    match &field.slot {
        Slot::Int(_, set) | Slot::ReferenceId(_, set) => set(target, as_int(key, value)?),
        Slot::Bool(_, set) => set(target, as_bool(key, value)?),
        Slot::Text(_, set) => set(target, as_string(key, value)?),
        Slot::DateTime(_, set) => {
            if let Some(parsed) = as_datetime(key, value)? {
                set(target, parsed);
            }
        }
        Slot::Reference(_, set) => set(target, read_object(as_object(key, value)?)?),
        Slot::Values(_, set) => set(target, as_values(key, value)?),
        Slot::Ids(_, _, set) => {
            let ids = value
                .as_array()
                .ok_or_else(|| mismatch(key, "an array", value))?
                .iter()
                .map(|item| as_int(key, item))
                .collect::<Result<Vec<_>>>()?;
            set(target, ids);
        }
        Slot::List(list) => list.read_json(target, value)?,
    }
    Ok(())
}

/// Write the fields of `entity` its table allows, without the envelope.
pub fn write_object<T: Resource>(entity: &T) -> Result<JsonObject> {
    let mut object = JsonObject::new();
    for field in writable_fields(entity, MimeFormat::Json) {
        if let Some(value) = write_value(field, entity)? {
            object.insert(field.key.to_string(), value);
        }
    }
    Ok(object)
}

fn write_value<T>(field: &Field<T>, entity: &T) -> Result<Option<Value>> {
    let value = match &field.slot {
        Slot::Int(get, _) => Some(Value::from(get(entity))),
        Slot::Bool(get, _) => get(entity).map(Value::from),
        Slot::Text(get, _) => get(entity).map(Value::from),
        Slot::DateTime(get, _) => get(entity).map(|value| Value::from(write_datetime(&value))),
        Slot::Reference(get, _) => get(entity).map(|reference| Value::from(reference.id)),
        Slot::ReferenceId(get, _) => get(entity).map(Value::from),
        Slot::Values(get, _) => match get(entity) {
            [] => None,
            [single] => Some(Value::from(single.as_str())),
            values => Some(Value::from(values.to_vec())),
        },
        Slot::Ids(_, get, _) => Some(Value::from(get(entity))),
        Slot::List(list) => Some(list.write_json(entity)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn null_and_missing_are_both_absent() {
        let o = object(json!({"a": null}));
        assert_eq!(get_int(&o, "a").unwrap(), None);
        assert_eq!(get_int(&o, "b").unwrap(), None);
        assert_eq!(get_string(&o, "a").unwrap(), None);
    }

    #[test]
    fn quoted_scalars_are_accepted() {
        let o = object(json!({"id": "12", "flag": "true", "count": 3}));
        assert_eq!(get_int(&o, "id").unwrap(), Some(12));
        assert_eq!(get_bool(&o, "flag").unwrap(), Some(true));
        assert_eq!(get_string(&o, "count").unwrap(), Some("3".to_string()));
    }

    #[test]
    fn wrong_shapes_are_format_errors() {
        let o = object(json!({"id": [1], "created_on": 5, "author": "me"}));
        assert!(matches!(get_int(&o, "id"), Err(RedmineError::FormatError(_))));
        assert!(matches!(
            get_datetime(&o, "created_on"),
            Err(RedmineError::FormatError(_))
        ));
        assert!(matches!(
            get_identifiable_name(&o, "author"),
            Err(RedmineError::FormatError(_))
        ));
    }

    #[test]
    fn empty_date_string_is_none() {
        let o = object(json!({"created_on": ""}));
        assert_eq!(get_datetime(&o, "created_on").unwrap(), None);
    }

    #[test]
    fn identifiable_name_from_object() {
        let o = object(json!({"author": {"id": 4, "name": "Jane"}}));
        let author = get_identifiable_name(&o, "author").unwrap().unwrap();
        assert_eq!(author.id, 4);
        assert_eq!(author.name.as_deref(), Some("Jane"));
    }

    #[test]
    fn collection_keeps_order() {
        let o = object(json!({"trackers": [
            {"id": 3, "name": "Support"},
            {"id": 1, "name": "Bug"},
        ]}));
        let items: Vec<IdentifiableName> = get_collection(&o, "trackers").unwrap().unwrap();
        let ids: Vec<i32> = items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn out_of_range_int_is_rejected() {
        let o = object(json!({"id": 4_294_967_296_i64}));
        assert!(get_int(&o, "id").is_err());
    }
}
