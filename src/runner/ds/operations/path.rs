//! Dot-notation access into nested collections.
//!
//! A path like `"a.b.0"` walks keyed maps by key, structs by field and arrays
//! by index. Writes create missing intermediate segments as empty maps.

use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::map::ValueMap;
use crate::runner::ds::operations::type_conversion::get_type;
use crate::runner::ds::value::Value;

pub const PATH_SEPARATOR: char = '.';

fn child<'a>(collection: &'a Value, segment: &str) -> Option<&'a Value> {
    let found = match collection {
        Value::Map(m) | Value::Object(m) => m.get(segment),
        Value::Array(a) => segment.parse::<usize>().ok().and_then(|i| a.get(i)),
        _ => None,
    };
    // A present-but-null entry counts as missing.
    found.filter(|v| !v.is_null())
}

/// Look up `key`. The whole key is tried first so flattened keys containing
/// the separator still resolve.
pub fn get_path<'a>(collection: &'a Value, key: &str) -> Option<&'a Value> {
    if let Some(v) = child(collection, key) {
        return Some(v);
    }
    let mut current = collection;
    for segment in key.split(PATH_SEPARATOR) {
        current = child(current, segment)?;
    }
    Some(current)
}

pub fn has_path(collection: &Value, key: &str) -> bool {
    get_path(collection, key).is_some()
}

/// Resolve the default of a failed lookup. Callable defaults are invoked.
pub fn resolve_default(default: Value) -> Result<Value, UnderscoreError> {
    match default {
        Value::Function(f) => f.call(Vec::new()),
        other => Ok(other),
    }
}

/// Turn an array into a keyed map so a non-positional key can be stored.
fn array_to_map(a: Vec<Value>) -> ValueMap {
    a.into_iter()
        .enumerate()
        .map(|(i, v)| (i.to_string(), v))
        .collect()
}

fn slot_mut<'a>(collection: &'a mut Value, segment: &str) -> Result<&'a mut Value, UnderscoreError> {
    if let Value::Array(a) = collection {
        match segment.parse::<usize>() {
            Ok(i) if i < a.len() => {}
            Ok(i) if i == a.len() => a.push(Value::Null),
            _ => {
                let map = array_to_map(std::mem::take(a));
                *collection = Value::Map(map);
            }
        }
    }
    if collection.is_null() {
        *collection = Value::Map(ValueMap::new());
    }
    match collection {
        Value::Array(a) => match segment.parse::<usize>() {
            Ok(i) => Ok(&mut a[i]),
            Err(_) => Err(UnderscoreError::type_error(format!("invalid index {}", segment))),
        },
        Value::Map(m) | Value::Object(m) => Ok(m.entry_or_insert_with(segment, || Value::Null)),
        other => Err(UnderscoreError::type_error(format!(
            "cannot set key \"{}\" on a value of type {}",
            segment,
            get_type(other)
        ))),
    }
}

/// Store `value` under the dotted `key`, creating intermediates.
pub fn set_path(collection: &mut Value, key: &str, value: Value) -> Result<(), UnderscoreError> {
    let segments: Vec<&str> = key.split(PATH_SEPARATOR).collect();
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return Ok(()),
    };
    let mut current = collection;
    for segment in parents {
        let next = slot_mut(current, segment)?;
        if !next.is_collection() {
            *next = Value::Map(ValueMap::new());
        }
        current = next;
    }
    *slot_mut(current, last)? = value;
    Ok(())
}

/// Remove the dotted `key`. Returns whether something was removed.
pub fn remove_path(collection: &mut Value, key: &str) -> bool {
    let segments: Vec<&str> = key.split(PATH_SEPARATOR).collect();
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return false,
    };
    let mut current = collection;
    for segment in parents {
        let next = match current {
            Value::Map(m) | Value::Object(m) => m.get_mut(segment),
            Value::Array(a) => segment.parse::<usize>().ok().and_then(move |i| a.get_mut(i)),
            _ => None,
        };
        match next {
            Some(v) => current = v,
            None => return false,
        }
    }
    match current {
        Value::Map(m) | Value::Object(m) => m.remove(last).is_some(),
        Value::Array(a) => match last.parse::<usize>() {
            Ok(i) if i < a.len() => {
                a.remove(i);
                true
            }
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_creates_intermediate_maps() {
        let mut v = Value::Map(ValueMap::new());
        set_path(&mut v, "a.b.c", Value::from("d")).unwrap();
        assert_eq!(get_path(&v, "a.b.c"), Some(&Value::from("d")));
        assert!(matches!(get_path(&v, "a.b"), Some(Value::Map(_))));
    }

    #[test]
    fn test_set_appends_and_rekeys_arrays() {
        let mut v = Value::Array(vec![Value::from(1)]);
        set_path(&mut v, "1", Value::from(2)).unwrap();
        assert_eq!(v, Value::Array(vec![Value::from(1), Value::from(2)]));

        set_path(&mut v, "foo", Value::from(3)).unwrap();
        assert_eq!(get_path(&v, "foo"), Some(&Value::from(3)));
        assert_eq!(get_path(&v, "0"), Some(&Value::from(1)));
    }

    #[test]
    fn test_whole_key_wins_over_segments() {
        let mut m = ValueMap::new();
        m.insert("a.b", Value::from("flat"));
        let v = Value::Map(m);
        assert_eq!(get_path(&v, "a.b"), Some(&Value::from("flat")));
    }

    #[test]
    fn test_remove_nested() {
        let mut v = Value::Map(ValueMap::new());
        set_path(&mut v, "foo.bar", Value::from(1)).unwrap();
        assert!(remove_path(&mut v, "foo.bar"));
        assert!(!has_path(&v, "foo.bar"));
        assert!(!remove_path(&mut v, "nope.bar"));
    }
}
