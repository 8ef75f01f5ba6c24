//! `Lists` methods.
//!
//! Closures receive `(value, key)`. Results built from a sequential array are
//! reindexed, results built from a keyed map keep their keys.

use std::cmp::Ordering;

use rand::seq::SliceRandom;

use super::collection::rebuild_like;
use super::native::slice_entries;
use crate::runner::ds::arguments::Arguments;
use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::map::ValueMap;
use crate::runner::ds::operations::test_and_comparison::{compare_values, strict_equals};
use crate::runner::ds::operations::type_conversion::{to_boolean, to_f64, to_string};
use crate::runner::ds::value::{Callable, Value};
use crate::runner::plugin::registry::{BuiltInRegistry, COLLECTION_COLLECTION};
use crate::runner::plugin::types::MethodCollection;

pub fn register(registry: &mut BuiltInRegistry) {
    let lists = MethodCollection::new("Lists")
        .with_parent(COLLECTION_COLLECTION)
        .add_method("range", lists_range)
        .add_method("repeat", lists_repeat)
        .add_method("search", lists_search)
        .add_method("matches", lists_matches)
        .add_method("matchesAny", lists_matches_any)
        .add_method("contains", lists_contains)
        .add_method("average", lists_average)
        .add_method("size", lists_size)
        .add_method("max", lists_max)
        .add_method("min", lists_min)
        .add_method("find", lists_find)
        .add_method("clean", lists_clean)
        .add_method("random", lists_random)
        .add_method("without", lists_without)
        .add_method("intersection", lists_intersection)
        .add_method("intersects", lists_intersects)
        .add_method("first", lists_first)
        .add_method("last", lists_last)
        .add_method("initial", lists_initial)
        .add_method("rest", lists_rest)
        .add_method("at", lists_at)
        .add_method("replaceValue", lists_replace_value)
        .add_method("replaceKeys", lists_replace_keys)
        .add_method("each", lists_each)
        .add_method("shuffle", lists_shuffle)
        .add_method("sortKeys", lists_sort_keys)
        .add_method("implode", lists_implode)
        .add_method("filter", lists_filter)
        .add_method("flatten", lists_flatten)
        .add_method("invoke", lists_invoke)
        .add_method("reject", lists_reject)
        .add_method("removeFirst", lists_remove_first)
        .add_method("removeLast", lists_remove_last)
        .add_method("removeValue", lists_remove_value)
        .add_method("prepend", lists_prepend)
        .add_method("append", lists_append)
        .add_method("unique", lists_unique);

    registry.register_collection(lists);
}

fn call_with_key(f: &Callable, key: &Value, value: &Value) -> Result<Value, UnderscoreError> {
    f.call(vec![value.clone(), key.clone()])
}

/// Map every value through `f`, keeping keys.
fn map_values(list: &Value, f: &Callable) -> Result<Value, UnderscoreError> {
    let mut mapped = Vec::new();
    for (k, v) in list.entries() {
        let result = call_with_key(f, &k, &v)?;
        mapped.push((k, result));
    }
    Ok(rebuild_like(list, mapped))
}

/// Keep entries for which `keep` holds.
fn retain_entries<F>(list: &Value, mut keep: F) -> Result<Value, UnderscoreError>
where
    F: FnMut(&Value, &Value) -> Result<bool, UnderscoreError>,
{
    let mut kept = Vec::new();
    for (k, v) in list.entries() {
        if keep(&k, &v)? {
            kept.push((k, v));
        }
    }
    Ok(rebuild_like(list, kept))
}

fn lists_range(args: Arguments) -> Result<Value, UnderscoreError> {
    let (start, stop) = match args.opt_int(1) {
        Some(stop) => (args.int(0), stop),
        None => (1, args.int(0)),
    };
    let step = args.int_or(2, 1).saturating_abs().max(1);

    let mut out = Vec::new();
    let mut next = Some(start);
    if start <= stop {
        while let Some(i) = next.filter(|i| *i <= stop) {
            out.push(Value::from(i));
            next = i.checked_add(step);
        }
    } else {
        while let Some(i) = next.filter(|i| *i >= stop) {
            out.push(Value::from(i));
            next = i.checked_sub(step);
        }
    }
    Ok(Value::Array(out))
}

fn lists_repeat(args: Arguments) -> Result<Value, UnderscoreError> {
    let times = args.int(1).unsigned_abs() as usize;
    Ok(Value::Array(vec![args.value(0); times]))
}

fn lists_search(args: Arguments) -> Result<Value, UnderscoreError> {
    let needle = args.value(1);
    Ok(args
        .value(0)
        .entries()
        .into_iter()
        .find(|(_, v)| strict_equals(v, &needle))
        .map(|(k, _)| k)
        .unwrap_or(Value::Bool(false)))
}

fn truth_table(args: &Arguments) -> Result<Vec<bool>, UnderscoreError> {
    let f = args.callable(1)?;
    args.value(0)
        .entries()
        .iter()
        .map(|(k, v)| call_with_key(&f, k, v).map(|r| to_boolean(&r)))
        .collect()
}

fn lists_matches(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::Bool(truth_table(&args)?.iter().all(|b| *b)))
}

fn lists_matches_any(args: Arguments) -> Result<Value, UnderscoreError> {
    let results = truth_table(&args)?;
    Ok(Value::Bool(results.is_empty() || results.iter().any(|b| *b)))
}

fn lists_contains(args: Arguments) -> Result<Value, UnderscoreError> {
    let needle = args.value(1);
    Ok(Value::Bool(
        args.value(0).into_values().iter().any(|v| strict_equals(v, &needle)),
    ))
}

fn lists_average(args: Arguments) -> Result<Value, UnderscoreError> {
    let values = args.value(0).into_values();
    if values.is_empty() {
        return Err(UnderscoreError::type_error("average of an empty list"));
    }
    let sum: f64 = values.iter().map(to_f64).sum();
    let decimals = args.int_or(1, 0) as i32;
    let factor = 10f64.powi(decimals);
    Ok(Value::from((sum / values.len() as f64 * factor).round() / factor))
}

fn lists_size(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::from(args.value(0).len().unwrap_or(0)))
}

fn extreme(args: &Arguments, wanted: Ordering) -> Result<Value, UnderscoreError> {
    let list = args.value(0);
    let values = match args.opt_callable(1) {
        Some(f) => map_values(&list, &f)?.into_values(),
        None => list.into_values(),
    };
    Ok(values
        .into_iter()
        .fold(None, |best: Option<Value>, v| match best {
            Some(b) if compare_values(&v, &b) != wanted => Some(b),
            _ => Some(v),
        })
        .unwrap_or(Value::Null))
}

fn lists_max(args: Arguments) -> Result<Value, UnderscoreError> {
    extreme(&args, Ordering::Greater)
}

fn lists_min(args: Arguments) -> Result<Value, UnderscoreError> {
    extreme(&args, Ordering::Less)
}

fn lists_find(args: Arguments) -> Result<Value, UnderscoreError> {
    let f = args.callable(1)?;
    for (k, v) in args.value(0).entries() {
        if to_boolean(&call_with_key(&f, &k, &v)?) {
            return Ok(v);
        }
    }
    Ok(Value::Null)
}

fn lists_clean(args: Arguments) -> Result<Value, UnderscoreError> {
    retain_entries(&args.value(0), |_, v| Ok(to_boolean(v)))
}

fn lists_random(args: Arguments) -> Result<Value, UnderscoreError> {
    let mut values = args.value(0).into_values();
    let mut rng = rand::thread_rng();
    match args.opt_int(1) {
        None => Ok(values.choose(&mut rng).cloned().unwrap_or(Value::Null)),
        Some(take) => {
            values.shuffle(&mut rng);
            values.truncate(take.max(0) as usize);
            Ok(Value::Array(values))
        }
    }
}

fn lists_without(args: Arguments) -> Result<Value, UnderscoreError> {
    let excluded = if args.len() == 2 && args.value(1).is_collection() {
        args.list(1)
    } else {
        args.rest(1)
    };
    retain_entries(&args.value(0), |_, v| {
        Ok(!excluded.iter().any(|x| strict_equals(x, v)))
    })
}

fn intersect(a: &Value, b: &Value) -> Vec<Value> {
    let others: Vec<String> = b.clone().into_values().iter().map(to_string).collect();
    a.clone()
        .into_values()
        .into_iter()
        .filter(|v| others.contains(&to_string(v)))
        .collect()
}

fn lists_intersection(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::Array(intersect(&args.value(0), &args.value(1))))
}

fn lists_intersects(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::Bool(!intersect(&args.value(0), &args.value(1)).is_empty()))
}

fn lists_first(args: Arguments) -> Result<Value, UnderscoreError> {
    let list = args.value(0);
    match args.opt_int(1) {
        None => Ok(list.into_values().into_iter().next().unwrap_or(Value::Null)),
        Some(take) => Ok(slice_entries(&list, 0, Some(take))),
    }
}

fn lists_last(args: Arguments) -> Result<Value, UnderscoreError> {
    let list = args.value(0);
    match args.opt_int(1) {
        None => Ok(list.into_values().pop().unwrap_or(Value::Null)),
        Some(take) => Ok(slice_entries(&list, take.saturating_neg(), None)),
    }
}

fn lists_initial(args: Arguments) -> Result<Value, UnderscoreError> {
    let list = args.value(0);
    let to = args.int_or(1, 1);
    let count = list.len().unwrap_or(0) as i64;
    Ok(slice_entries(&list, 0, Some(count.saturating_sub(to))))
}

fn lists_rest(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(slice_entries(&args.value(0), args.int_or(1, 1), None))
}

fn lists_at(args: Arguments) -> Result<Value, UnderscoreError> {
    let list = args.value(0);
    let f = args.callable(1)?;
    for (k, v) in list.entries() {
        call_with_key(&f, &k, &v)?;
    }
    Ok(list)
}

fn lists_replace_value(args: Arguments) -> Result<Value, UnderscoreError> {
    let replace = args.string(1)?;
    let with = args.string(2)?;
    let list = args.value(0);
    let replaced = list
        .entries()
        .into_iter()
        .map(|(k, v)| (k, Value::String(to_string(&v).replace(&replace, &with))))
        .collect();
    Ok(rebuild_like(&list, replaced))
}

fn lists_replace_keys(args: Arguments) -> Result<Value, UnderscoreError> {
    let keys = args.list(1);
    let values = args.value(0).into_values();
    if keys.len() != values.len() {
        return Err(UnderscoreError::type_error(format!(
            "replaceKeys needs {} keys, {} given",
            values.len(),
            keys.len()
        )));
    }
    let map: ValueMap = keys.iter().map(to_string).zip(values).collect();
    Ok(Value::Map(map))
}

fn lists_each(args: Arguments) -> Result<Value, UnderscoreError> {
    map_values(&args.value(0), &args.callable(1)?)
}

fn lists_shuffle(args: Arguments) -> Result<Value, UnderscoreError> {
    let mut values = args.value(0).into_values();
    values.shuffle(&mut rand::thread_rng());
    Ok(Value::Array(values))
}

fn lists_sort_keys(args: Arguments) -> Result<Value, UnderscoreError> {
    let list = args.value(0);
    let descending = args
        .opt_string(1)?
        .map(|d| d.eq_ignore_ascii_case("desc"))
        .unwrap_or(false);
    let mut entries = list.entries();
    entries.sort_by(|a, b| {
        let ord = compare_values(&a.0, &b.0);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
    Ok(rebuild_like(&list, entries))
}

fn lists_implode(args: Arguments) -> Result<Value, UnderscoreError> {
    let with = args.opt_string(1)?.unwrap_or_default();
    let parts: Vec<String> = args.value(0).into_values().iter().map(to_string).collect();
    Ok(Value::String(parts.join(&with)))
}

fn lists_filter(args: Arguments) -> Result<Value, UnderscoreError> {
    match args.opt_callable(1) {
        None => lists_clean(args),
        Some(f) => retain_entries(&args.value(0), |k, v| Ok(to_boolean(&call_with_key(&f, k, v)?))),
    }
}

fn flatten_into(out: &mut ValueMap, list: &Value, separator: &str, parent: Option<&str>) {
    for (k, v) in list.entries() {
        let key = match parent {
            Some(p) => format!("{}{}{}", p, separator, to_string(&k)),
            None => to_string(&k),
        };
        if v.is_list() {
            flatten_into(out, &v, separator, Some(&key));
        } else {
            out.insert(key, v);
        }
    }
}

fn lists_flatten(args: Arguments) -> Result<Value, UnderscoreError> {
    let separator = args.opt_string(1)?.unwrap_or_else(|| ".".to_string());
    let mut out = ValueMap::new();
    flatten_into(&mut out, &args.value(0), &separator, None);
    Ok(Value::Map(out))
}

fn lists_invoke(args: Arguments) -> Result<Value, UnderscoreError> {
    let list = args.value(0);
    let f = args.callable(1)?;
    let extra = match args.get(2) {
        None => None,
        Some(v) if v.is_collection() => Some(v.clone().into_values()),
        Some(v) => Some(vec![v.clone(); list.len().unwrap_or(0)]),
    };

    let mut mapped = Vec::new();
    for (i, (k, v)) in list.entries().into_iter().enumerate() {
        let mut call_args = vec![v];
        if let Some(extra) = &extra {
            call_args.push(extra.get(i).cloned().unwrap_or(Value::Null));
        }
        mapped.push((k, f.call(call_args)?));
    }
    Ok(rebuild_like(&list, mapped))
}

fn lists_reject(args: Arguments) -> Result<Value, UnderscoreError> {
    let f = args.callable(1)?;
    retain_entries(&args.value(0), |k, v| Ok(!to_boolean(&call_with_key(&f, k, v)?)))
}

fn lists_remove_first(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(slice_entries(&args.value(0), 1, None))
}

fn lists_remove_last(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(slice_entries(&args.value(0), 0, Some(-1)))
}

fn lists_remove_value(args: Arguments) -> Result<Value, UnderscoreError> {
    let unwanted = args.value(1);
    retain_entries(&args.value(0), |_, v| Ok(!strict_equals(v, &unwanted)))
}

/// Renumber integer-like keys from zero, keeping string keys.
fn renumber(entries: Vec<(String, Value)>) -> ValueMap {
    let mut next = 0;
    entries
        .into_iter()
        .map(|(k, v)| {
            if k.parse::<i64>().is_ok() {
                let key = next.to_string();
                next += 1;
                (key, v)
            } else {
                (k, v)
            }
        })
        .collect()
}

fn lists_prepend(mut args: Arguments) -> Result<Value, UnderscoreError> {
    let value = args.take(1);
    match args.take(0) {
        Value::Map(m) => {
            let mut entries = vec![("0".to_string(), value)];
            entries.extend(m);
            Ok(Value::Map(renumber(entries)))
        }
        other => {
            let mut values = other.into_values();
            values.insert(0, value);
            Ok(Value::Array(values))
        }
    }
}

fn lists_append(mut args: Arguments) -> Result<Value, UnderscoreError> {
    let value = args.take(1);
    match args.take(0) {
        Value::Map(mut m) => {
            let next = m
                .keys()
                .filter_map(|k| k.parse::<i64>().ok())
                .max()
                .map(|n| n + 1)
                .unwrap_or(0);
            m.insert(next.to_string(), value);
            Ok(Value::Map(m))
        }
        other => {
            let mut values = other.into_values();
            values.push(value);
            Ok(Value::Array(values))
        }
    }
}

fn lists_unique(args: Arguments) -> Result<Value, UnderscoreError> {
    let mut unique: Vec<Value> = Vec::new();
    for v in args.value(0).into_values() {
        if !unique.iter().any(|u| strict_equals(u, &v)) {
            unique.push(v);
        }
    }
    Ok(Value::Array(unique))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[i64]) -> Value {
        Value::Array(values.iter().map(|v| Value::from(*v)).collect())
    }

    fn call(f: fn(Arguments) -> Result<Value, UnderscoreError>, args: Vec<Value>) -> Value {
        f(Arguments::new(args)).unwrap()
    }

    #[test]
    fn test_range() {
        assert_eq!(call(lists_range, vec![Value::from(5)]), numbers(&[1, 2, 3, 4, 5]));
        assert_eq!(call(lists_range, vec![Value::from(0), Value::from(6), Value::from(2)]), numbers(&[0, 2, 4, 6]));
        assert_eq!(call(lists_range, vec![Value::from(3), Value::from(1)]), numbers(&[3, 2, 1]));
    }

    #[test]
    fn test_bounds_do_not_overflow() {
        assert_eq!(
            call(lists_range, vec![Value::from(i64::MAX - 1), Value::from(i64::MAX)]),
            numbers(&[i64::MAX - 1, i64::MAX])
        );
        assert_eq!(
            call(lists_range, vec![Value::from(i64::MIN + 1), Value::from(i64::MIN)]),
            numbers(&[i64::MIN + 1, i64::MIN])
        );
        assert_eq!(
            call(lists_range, vec![Value::from(0), Value::from(2), Value::from(i64::MIN)]),
            numbers(&[0])
        );
        let list = numbers(&[1, 2]);
        assert_eq!(call(lists_last, vec![list.clone(), Value::from(i64::MIN)]), numbers(&[]));
        assert_eq!(call(lists_initial, vec![list.clone(), Value::from(i64::MIN)]), numbers(&[1, 2]));
        assert_eq!(call(lists_first, vec![list, Value::from(i64::MAX)]), numbers(&[1, 2]));
    }

    #[test]
    fn test_slicers() {
        let list = numbers(&[1, 2, 3, 4]);
        assert_eq!(call(lists_first, vec![list.clone()]), Value::from(1));
        assert_eq!(call(lists_first, vec![list.clone(), Value::from(2)]), numbers(&[1, 2]));
        assert_eq!(call(lists_last, vec![list.clone()]), Value::from(4));
        assert_eq!(call(lists_last, vec![list.clone(), Value::from(2)]), numbers(&[3, 4]));
        assert_eq!(call(lists_initial, vec![list.clone()]), numbers(&[1, 2, 3]));
        assert_eq!(call(lists_rest, vec![list.clone(), Value::from(2)]), numbers(&[3, 4]));
        assert_eq!(call(lists_remove_last, vec![list]), numbers(&[1, 2, 3]));
    }

    #[test]
    fn test_matches_on_empty_list_is_true() {
        let is_even = Value::Function(Callable::new(|a| Ok(Value::Bool(a[0].as_str().is_none()))));
        assert_eq!(call(lists_matches, vec![Value::Array(vec![]), is_even.clone()]), Value::Bool(true));
        assert_eq!(call(lists_matches_any, vec![Value::Array(vec![]), is_even]), Value::Bool(true));
    }

    #[test]
    fn test_without_and_unique() {
        let list = numbers(&[1, 2, 2, 3]);
        assert_eq!(call(lists_without, vec![list.clone(), Value::from(2), Value::from(3)]), numbers(&[1]));
        assert_eq!(call(lists_without, vec![list.clone(), numbers(&[1, 3])]), numbers(&[2, 2]));
        assert_eq!(call(lists_unique, vec![list]), numbers(&[1, 2, 3]));
    }

    #[test]
    fn test_flatten_joins_keys() {
        let nested: ValueMap = vec![
            ("foo", Value::from("bar")),
            ("bis", Value::Array(vec![Value::from("ter"), Value::from("qux")])),
        ]
        .into_iter()
        .collect();
        let flat = call(lists_flatten, vec![Value::Map(nested)]);
        let expected: ValueMap = vec![
            ("foo", Value::from("bar")),
            ("bis.0", Value::from("ter")),
            ("bis.1", Value::from("qux")),
        ]
        .into_iter()
        .collect();
        assert_eq!(flat, Value::Map(expected));
    }

    #[test]
    fn test_average_and_extremes() {
        let list = numbers(&[1, 2, 4]);
        assert_eq!(call(lists_average, vec![list.clone()]), Value::from(2.0));
        assert_eq!(call(lists_average, vec![list.clone(), Value::from(2)]), Value::from(2.33));
        assert_eq!(call(lists_max, vec![list.clone()]), Value::from(4));
        assert_eq!(call(lists_min, vec![list]), Value::from(1));
    }

    #[test]
    fn test_search_returns_key_or_false() {
        let list = numbers(&[5, 6]);
        assert_eq!(call(lists_search, vec![list.clone(), Value::from(6)]), Value::from(1));
        assert_eq!(call(lists_search, vec![list, Value::from(7)]), Value::Bool(false));
    }
}
