//! Host primitives reached through native deferral.
//!
//! These mirror the classic array and string helpers. They are only looked up
//! by name from the method tables and are never a wrapper's own methods.

use rand::seq::SliceRandom;

use super::collection::rebuild_like;
use crate::runner::ds::arguments::Arguments;
use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::map::ValueMap;
use crate::runner::ds::operations::type_conversion::{get_type, to_number, to_string};
use crate::runner::ds::value::{NumberType, Value};
use crate::runner::plugin::registry::{BuiltInRegistry, NATIVE_COLLECTION};
use crate::runner::plugin::types::MethodCollection;

pub fn register(registry: &mut BuiltInRegistry) {
    let native = MethodCollection::new(NATIVE_COLLECTION)
        .add_method("array_sum", array_sum)
        .add_method("array_product", array_product)
        .add_method("array_merge", array_merge)
        .add_method("array_diff", array_diff)
        .add_method("array_intersect", array_intersect)
        .add_method("array_reduce", array_reduce)
        .add_method("array_slice", array_slice)
        .add_method("array_reverse", array_reverse)
        .add_method("array_fill", array_fill)
        .add_method("array_flip", array_flip)
        .add_method("array_pad", array_pad)
        .add_method("str_repeat", str_repeat)
        .add_method("str_split", str_split)
        .add_method("str_shuffle", str_shuffle)
        .add_method("str_word_count", str_word_count)
        .add_method("str_pad", str_pad)
        .add_method("trim", trim)
        .add_method("count", count)
        .add_method("round", round)
        .add_method("ceil", ceil)
        .add_method("floor", floor)
        .add_method("substr", substr)
        .add_method("ucfirst", ucfirst)
        .add_method("lcfirst", lcfirst)
        .add_method("ucwords", ucwords)
        .add_method("strtolower", strtolower)
        .add_method("strtoupper", strtoupper);

    registry.register_collection(native);
}

/// Entries `start..start + len`. Negative offsets and lengths count from the end.
pub(crate) fn slice_entries(list: &Value, start: i64, len: Option<i64>) -> Value {
    let entries = list.entries();
    let total = entries.len() as i64;
    let from = if start < 0 { total.saturating_add(start).max(0) } else { start.min(total) };
    let to = match len {
        None => total,
        Some(l) if l < 0 => total.saturating_add(l).max(from),
        Some(l) => from.saturating_add(l).min(total),
    };
    let sliced = entries
        .into_iter()
        .skip(from as usize)
        .take((to - from).max(0) as usize)
        .collect();
    rebuild_like(list, sliced)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PadSide {
    Left,
    Right,
    Both,
}

impl PadSide {
    /// Accepts the classic `0`/`1`/`2` flags as well as names.
    fn from_value(value: &Value) -> PadSide {
        match value {
            Value::Number(n) => match n.as_i64() {
                0 => PadSide::Left,
                2 => PadSide::Both,
                _ => PadSide::Right,
            },
            Value::String(s) => match s.to_lowercase().as_str() {
                "left" => PadSide::Left,
                "both" => PadSide::Both,
                _ => PadSide::Right,
            },
            _ => PadSide::Right,
        }
    }
}

fn repeat_to(pad: &str, count: usize) -> String {
    pad.chars().cycle().take(count).collect()
}

/// Pad `input` up to `length` characters with `pad`.
pub(crate) fn pad_string(input: &str, length: usize, pad: &str, side: PadSide) -> String {
    let current = input.chars().count();
    if length <= current || pad.is_empty() {
        return input.to_string();
    }
    let missing = length - current;
    match side {
        PadSide::Left => repeat_to(pad, missing) + input,
        PadSide::Right => input.to_string() + &repeat_to(pad, missing),
        PadSide::Both => {
            let left = missing / 2;
            repeat_to(pad, left) + input + &repeat_to(pad, missing - left)
        }
    }
}

/// Integer arithmetic while every operand is an integer and nothing overflows.
fn fold_numbers(
    values: Vec<Value>,
    init: NumberType,
    op: fn(f64, f64) -> f64,
    int_op: fn(i64, i64) -> Option<i64>,
) -> Value {
    let result = values.iter().map(to_number).fold(init, |acc, n| match (acc, n) {
        (NumberType::Integer(a), NumberType::Integer(b)) => match int_op(a, b) {
            Some(r) => NumberType::Integer(r),
            None => NumberType::Float(op(a as f64, b as f64)),
        },
        (a, b) => NumberType::Float(op(a.as_f64(), b.as_f64())),
    });
    Value::Number(result)
}

fn array_sum(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(fold_numbers(args.value(0).into_values(), NumberType::Integer(0), |a, b| a + b, i64::checked_add))
}

fn array_product(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(fold_numbers(args.value(0).into_values(), NumberType::Integer(1), |a, b| a * b, i64::checked_mul))
}

/// Sequential arrays are appended. Keyed maps overwrite string keys and
/// renumber integer keys.
fn array_merge(args: Arguments) -> Result<Value, UnderscoreError> {
    let lists = args.rest(0);
    if lists.iter().all(|l| matches!(l, Value::Array(_))) {
        return Ok(Value::Array(lists.into_iter().flat_map(Value::into_values).collect()));
    }
    let mut merged = ValueMap::new();
    let mut next = 0;
    for list in &lists {
        for (k, v) in list.entries() {
            match k {
                Value::Number(_) => {
                    merged.insert(next.to_string(), v);
                    next += 1;
                }
                key => {
                    let key = to_string(&key);
                    if key.parse::<i64>().is_ok() {
                        merged.insert(next.to_string(), v);
                        next += 1;
                    } else {
                        merged.insert(key, v);
                    }
                }
            }
        }
    }
    Ok(Value::Map(merged))
}

fn string_set(values: &[Value]) -> Vec<String> {
    values.iter().flat_map(|l| l.clone().into_values()).map(|v| to_string(&v)).collect()
}

fn array_diff(args: Arguments) -> Result<Value, UnderscoreError> {
    let list = args.value(0);
    let others = string_set(&args.rest(1));
    let kept = list
        .entries()
        .into_iter()
        .filter(|(_, v)| !others.contains(&to_string(v)))
        .collect();
    Ok(rebuild_like(&list, kept))
}

/// Values present in every other list, compared by string form.
fn array_intersect(args: Arguments) -> Result<Value, UnderscoreError> {
    let list = args.value(0);
    let others: Vec<Vec<String>> = args
        .rest(1)
        .iter()
        .map(|o| string_set(std::slice::from_ref(o)))
        .collect();
    let kept: Vec<(Value, Value)> = list
        .entries()
        .into_iter()
        .filter(|(_, v)| {
            let s = to_string(v);
            others.iter().all(|o| o.contains(&s))
        })
        .collect();
    Ok(rebuild_like(&list, kept))
}

fn array_reduce(args: Arguments) -> Result<Value, UnderscoreError> {
    let f = args.callable(1)?;
    let mut carry = args.value(2);
    for item in args.value(0).into_values() {
        carry = f.call(vec![carry, item])?;
    }
    Ok(carry)
}

fn array_slice(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(slice_entries(&args.value(0), args.int_or(1, 0), args.opt_int(2)))
}

fn array_reverse(args: Arguments) -> Result<Value, UnderscoreError> {
    let list = args.value(0);
    let mut entries = list.entries();
    entries.reverse();
    Ok(rebuild_like(&list, entries))
}

fn array_fill(args: Arguments) -> Result<Value, UnderscoreError> {
    let start = args.int(0);
    let count = args.int(1);
    if count < 0 {
        return Err(UnderscoreError::type_error("fill count must be at least 0"));
    }
    let value = args.value(2);
    if start == 0 {
        return Ok(Value::Array(vec![value; count as usize]));
    }
    let end = start
        .checked_add(count)
        .ok_or_else(|| UnderscoreError::type_error("fill range exceeds the integer bounds"))?;
    Ok(Value::Map((start..end).map(|i| (i.to_string(), value.clone())).collect()))
}

fn array_flip(args: Arguments) -> Result<Value, UnderscoreError> {
    let flipped: ValueMap = args
        .value(0)
        .entries()
        .into_iter()
        .map(|(k, v)| (to_string(&v), k))
        .collect();
    Ok(Value::Map(flipped))
}

fn array_pad(args: Arguments) -> Result<Value, UnderscoreError> {
    let mut values = args.value(0).into_values();
    let size = args.int(1);
    let value = args.value(2);
    let missing = (size.unsigned_abs() as usize).saturating_sub(values.len());
    if size < 0 {
        let mut padded = vec![value; missing];
        padded.append(&mut values);
        Ok(Value::Array(padded))
    } else {
        values.extend(std::iter::repeat(value).take(missing));
        Ok(Value::Array(values))
    }
}

fn str_repeat(args: Arguments) -> Result<Value, UnderscoreError> {
    let times = args.int(1).max(0) as usize;
    Ok(Value::String(args.string(0)?.repeat(times)))
}

fn str_split(args: Arguments) -> Result<Value, UnderscoreError> {
    let string = args.string(0)?;
    let length = args.int_or(1, 1);
    if length < 1 {
        return Err(UnderscoreError::type_error("split length must be at least 1"));
    }
    let chars: Vec<char> = string.chars().collect();
    if chars.is_empty() {
        return Ok(Value::Array(vec![Value::from("")]));
    }
    Ok(Value::Array(
        chars
            .chunks(length as usize)
            .map(|c| Value::String(c.iter().collect()))
            .collect(),
    ))
}

fn str_shuffle(args: Arguments) -> Result<Value, UnderscoreError> {
    let mut chars: Vec<char> = args.string(0)?.chars().collect();
    chars.shuffle(&mut rand::thread_rng());
    Ok(Value::String(chars.into_iter().collect()))
}

fn str_word_count(args: Arguments) -> Result<Value, UnderscoreError> {
    let string = args.string(0)?;
    let count = string
        .split(|c: char| !(c.is_alphabetic() || c == '\'' || c == '-'))
        .filter(|w| !w.is_empty())
        .count();
    Ok(Value::from(count))
}

fn str_pad(args: Arguments) -> Result<Value, UnderscoreError> {
    let input = args.string(0)?;
    let length = args.int(1).max(0) as usize;
    let pad = args.opt_string(2)?.unwrap_or_else(|| " ".to_string());
    let side = args.get(3).map(PadSide::from_value).unwrap_or(PadSide::Right);
    Ok(Value::String(pad_string(&input, length, &pad, side)))
}

fn trim(args: Arguments) -> Result<Value, UnderscoreError> {
    let string = args.string(0)?;
    Ok(Value::String(match args.opt_string(1)? {
        Some(chars) => string.trim_matches(|c| chars.contains(c)).to_string(),
        None => string.trim().to_string(),
    }))
}

fn count(args: Arguments) -> Result<Value, UnderscoreError> {
    let value = args.value(0);
    match value.len() {
        Some(n) => Ok(Value::from(n)),
        None => Err(UnderscoreError::type_error(format!(
            "count() expects a list, {} given",
            get_type(&value)
        ))),
    }
}

fn round(args: Arguments) -> Result<Value, UnderscoreError> {
    let factor = 10f64.powi(args.int_or(1, 0) as i32);
    Ok(Value::from((args.float(0) * factor).round() / factor))
}

fn ceil(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::from(args.float(0).ceil()))
}

fn floor(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::from(args.float(0).floor()))
}

fn substr(args: Arguments) -> Result<Value, UnderscoreError> {
    let chars: Vec<Value> = args.string(0)?.chars().map(|c| Value::String(c.to_string())).collect();
    let sliced = slice_entries(&Value::Array(chars), args.int_or(1, 0), args.opt_int(2));
    Ok(Value::String(sliced.into_values().iter().map(to_string).collect()))
}

fn map_first_char(string: &str, f: fn(char) -> String) -> String {
    let mut chars = string.chars();
    match chars.next() {
        Some(first) => f(first) + chars.as_str(),
        None => String::new(),
    }
}

fn ucfirst(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(map_first_char(&args.string(0)?, |c| c.to_uppercase().collect())))
}

fn lcfirst(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(map_first_char(&args.string(0)?, |c| c.to_lowercase().collect())))
}

/// Uppercase the first letter of each whitespace-separated word, leaving the rest alone.
fn ucwords(args: Arguments) -> Result<Value, UnderscoreError> {
    let string = args.string(0)?;
    let mut out = String::with_capacity(string.len());
    let mut at_start = true;
    for c in string.chars() {
        if at_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_start = c.is_whitespace();
    }
    Ok(Value::String(out))
}

fn strtolower(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(args.string(0)?.to_lowercase()))
}

fn strtoupper(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(args.string(0)?.to_uppercase()))
}
