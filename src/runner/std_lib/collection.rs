//! Methods shared by `Lists` and `Structs`.
//!
//! Keys may be dotted paths (`"a.b.c"`) reaching into nested collections.

use std::cmp::Ordering;

use crate::runner::ds::arguments::Arguments;
use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::map::ValueMap;
use crate::runner::ds::operations::path::{get_path, has_path, remove_path, resolve_default, set_path};
use crate::runner::ds::operations::test_and_comparison::{compare_values, strict_equals};
use crate::runner::ds::operations::type_conversion::{to_object, to_string};
use crate::runner::ds::value::Value;
use crate::runner::plugin::registry::{BuiltInRegistry, COLLECTION_COLLECTION};
use crate::runner::plugin::types::MethodCollection;

pub fn register(registry: &mut BuiltInRegistry) {
    let collection = MethodCollection::new(COLLECTION_COLLECTION)
        .add_method("has", collection_has)
        .add_method("get", collection_get)
        .add_method("set", collection_set)
        .add_method("setAndGet", collection_set_and_get)
        .add_method("remove", collection_remove)
        .add_method("pluck", collection_pluck)
        .add_method("filterBy", collection_filter_by)
        .add_method("findBy", collection_find_by)
        .add_method("keys", collection_keys)
        .add_method("values", collection_values)
        .add_method("replace", collection_replace)
        .add_method("sort", collection_sort)
        .add_method("group", collection_group)
        .add_method("indexBy", collection_index_by);

    registry.register_collection(collection);
}

/// Rebuild a collection of the same shape as `source` from `(key, value)` pairs.
/// Sequential arrays are reindexed, keyed maps and structs keep their keys.
pub(crate) fn rebuild_like(source: &Value, entries: Vec<(Value, Value)>) -> Value {
    match source {
        Value::Map(_) => Value::Map(keyed(entries)),
        Value::Object(_) => Value::Object(keyed(entries)),
        _ => Value::Array(entries.into_iter().map(|(_, v)| v).collect()),
    }
}

pub(crate) fn keyed(entries: Vec<(Value, Value)>) -> ValueMap {
    entries.into_iter().map(|(k, v)| (to_string(&k), v)).collect()
}

fn key_arg(args: &Arguments, index: usize) -> Result<String, UnderscoreError> {
    args.string(index)
}

fn collection_has(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::Bool(has_path(&args.value(0), &key_arg(&args, 1)?)))
}

fn collection_get(mut args: Arguments) -> Result<Value, UnderscoreError> {
    let collection = args.take(0);
    if args.get(1).is_none() {
        return Ok(collection);
    }
    let key = key_arg(&args, 1)?;
    match get_path(&collection, &key) {
        Some(v) => Ok(v.clone()),
        None => resolve_default(args.take(2)),
    }
}

fn collection_set(mut args: Arguments) -> Result<Value, UnderscoreError> {
    let mut collection = args.take(0);
    let key = key_arg(&args, 1)?;
    set_path(&mut collection, &key, args.take(2))?;
    Ok(collection)
}

fn collection_set_and_get(mut args: Arguments) -> Result<Value, UnderscoreError> {
    let mut collection = args.take(0);
    let key = key_arg(&args, 1)?;
    if !has_path(&collection, &key) {
        set_path(&mut collection, &key, args.take(2))?;
    }
    Ok(get_path(&collection, &key).cloned().unwrap_or(Value::Null))
}

fn collection_remove(mut args: Arguments) -> Result<Value, UnderscoreError> {
    let mut collection = args.take(0);
    let keys = match args.value(1) {
        Value::Array(_) | Value::Map(_) => args.list(1).iter().map(to_string).collect(),
        _ => vec![key_arg(&args, 1)?],
    };
    for key in keys {
        remove_path(&mut collection, &key);
    }
    Ok(collection)
}

fn collection_pluck(args: Arguments) -> Result<Value, UnderscoreError> {
    let collection = args.value(0);
    let property = key_arg(&args, 1)?;
    let plucked = collection
        .entries()
        .into_iter()
        .map(|(k, v)| (k, get_path(&v, &property).cloned().unwrap_or(Value::Null)))
        .collect();
    Ok(rebuild_like(&collection, plucked))
}

fn compare_op(op: &str, item: &Value, value: &Value) -> Result<bool, UnderscoreError> {
    let contained = |item: &Value| match value {
        v if v.is_collection() => v.clone().into_values().iter().any(|x| strict_equals(x, item)),
        v => strict_equals(v, item),
    };
    Ok(match op {
        "eq" => strict_equals(item, value),
        "ne" => !strict_equals(item, value),
        "gt" => compare_values(item, value) == Ordering::Greater,
        "gte" => compare_values(item, value) != Ordering::Less,
        "lt" => compare_values(item, value) == Ordering::Less,
        "lte" => compare_values(item, value) != Ordering::Greater,
        "contains" => contained(item),
        "notContains" => !contained(item),
        other => {
            return Err(UnderscoreError::type_error(format!(
                "unknown comparison operator \"{}\"",
                other
            )))
        }
    })
}

fn filter_by(args: &Arguments) -> Result<Vec<Value>, UnderscoreError> {
    let property = key_arg(args, 1)?;
    let value = args.value(2);
    let op = match args.opt_string(3)? {
        Some(op) => op,
        None if value.is_collection() => "contains".to_string(),
        None => "eq".to_string(),
    };

    let mut result = Vec::new();
    for item in args.value(0).into_values() {
        let field = get_path(&item, &property)
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        if compare_op(&op, &field, &value)? {
            result.push(item);
        }
    }
    Ok(result)
}

fn collection_filter_by(args: Arguments) -> Result<Value, UnderscoreError> {
    let result = Value::Array(filter_by(&args)?);
    match args.value(0) {
        Value::Object(_) => Ok(to_object(result)),
        _ => Ok(result),
    }
}

fn collection_find_by(args: Arguments) -> Result<Value, UnderscoreError> {
    let mut values = args.into_vec();
    values.resize(4, Value::Null);
    if values[3].is_null() {
        values[3] = Value::from("eq");
    }
    let found = filter_by(&Arguments::new(values))?;
    Ok(found.into_iter().next().unwrap_or(Value::Null))
}

fn collection_keys(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::Array(
        args.value(0).entries().into_iter().map(|(k, _)| k).collect(),
    ))
}

fn collection_values(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::Array(args.value(0).into_values()))
}

fn collection_replace(mut args: Arguments) -> Result<Value, UnderscoreError> {
    let mut collection = args.take(0);
    let old_key = key_arg(&args, 1)?;
    let new_key = key_arg(&args, 2)?;
    remove_path(&mut collection, &old_key);
    set_path(&mut collection, &new_key, args.take(3))?;
    Ok(collection)
}

fn sort_key(sorter: &Value, value: &Value) -> Result<Value, UnderscoreError> {
    match sorter {
        Value::Null => Ok(value.clone()),
        Value::Function(f) => f.call(vec![value.clone()]),
        other => Ok(get_path(value, &to_string(other)).cloned().unwrap_or(Value::Null)),
    }
}

fn collection_sort(args: Arguments) -> Result<Value, UnderscoreError> {
    let collection = args.value(0);
    let sorter = args.value(1);
    let descending = args
        .opt_string(2)?
        .map(|d| d.eq_ignore_ascii_case("desc"))
        .unwrap_or(false);

    let mut keyed_results = Vec::new();
    for (k, v) in collection.entries() {
        keyed_results.push((sort_key(&sorter, &v)?, k, v));
    }
    keyed_results.sort_by(|a, b| {
        let ord = compare_values(&a.0, &b.0);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });

    let sorted = keyed_results.into_iter().map(|(_, k, v)| (k, v)).collect();
    match collection {
        Value::Array(_) => Ok(rebuild_like(&collection, sorted)),
        _ => Ok(Value::Map(keyed(sorted))),
    }
}

fn collection_group(args: Arguments) -> Result<Value, UnderscoreError> {
    let grouper = args.value(1);
    let save_keys = args.bool_or(2, false);

    let mut groups = ValueMap::new();
    for (k, v) in args.value(0).entries() {
        let group_key = match &grouper {
            Value::Function(f) => f.call(vec![v.clone(), k.clone()])?,
            other => get_path(&v, &to_string(other)).cloned().unwrap_or(Value::Null),
        };
        if group_key.is_null() {
            continue;
        }
        let slot = groups.entry_or_insert_with(&to_string(&group_key), || {
            if save_keys {
                Value::Map(ValueMap::new())
            } else {
                Value::Array(Vec::new())
            }
        });
        match slot {
            Value::Map(m) => {
                m.insert(to_string(&k), v);
            }
            Value::Array(a) => a.push(v),
            _ => {}
        }
    }
    Ok(Value::Map(groups))
}

fn collection_index_by(args: Arguments) -> Result<Value, UnderscoreError> {
    let key = key_arg(&args, 1)?;
    let mut indexed = ValueMap::new();
    for item in args.value(0).into_values() {
        let index = match &item {
            Value::Map(m) | Value::Object(m) => m.get(&key).filter(|v| !v.is_null()).map(to_string),
            Value::Array(a) => key.parse::<usize>().ok().and_then(|i| a.get(i)).map(to_string),
            _ => None,
        };
        if let Some(index) = index {
            indexed.insert(index, item);
        }
    }
    Ok(Value::Map(indexed))
}
