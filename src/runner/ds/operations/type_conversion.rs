use regex::Regex;

use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::map::ValueMap;
use crate::runner::ds::value::{NumberType, Value};

pub const TYPE_STR_NULL: &str = "NULL";
pub const TYPE_STR_BOOLEAN: &str = "boolean";
pub const TYPE_STR_INTEGER: &str = "integer";
pub const TYPE_STR_DOUBLE: &str = "double";
pub const TYPE_STR_STRING: &str = "string";
pub const TYPE_STR_ARRAY: &str = "array";
pub const TYPE_STR_OBJECT: &str = "object";
pub const TYPE_STR_FUNCTION: &str = "function";
pub const TYPE_STR_RESOURCE: &str = "resource";

lazy_static! {
    static ref HAS_NUMERIC_CHARS: Regex = Regex::new(r"[0-9. ,]+").expect("valid regex");
}

pub fn get_type(v: &Value) -> &'static str {
    match v {
        Value::Null => TYPE_STR_NULL,
        Value::Bool(_) => TYPE_STR_BOOLEAN,
        Value::Number(NumberType::Integer(_)) => TYPE_STR_INTEGER,
        Value::Number(NumberType::Float(_)) => TYPE_STR_DOUBLE,
        Value::String(_) => TYPE_STR_STRING,
        Value::Array(_) | Value::Map(_) => TYPE_STR_ARRAY,
        Value::Object(_) => TYPE_STR_OBJECT,
        Value::Function(_) => TYPE_STR_FUNCTION,
        Value::Resource(_) => TYPE_STR_RESOURCE,
    }
}

/// Loose string conversion. Collections render as JSON.
pub fn to_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Map(_) | Value::Object(_) => {
            match crate::runner::std_lib::parse::to_json_string(v) {
                Ok(s) => s,
                Err(_) => TYPE_STR_ARRAY.to_string(),
            }
        }
        Value::Function(_) => "Closure".to_string(),
        Value::Resource(r) => r.to_string(),
    }
}

pub fn number_to_string(n: &NumberType) -> String {
    match n {
        NumberType::Integer(i) => i.to_string(),
        NumberType::Float(f) if f.is_nan() => "NAN".to_string(),
        NumberType::Float(f) if f.is_infinite() => {
            if *f > 0.0 { "INF".to_string() } else { "-INF".to_string() }
        }
        NumberType::Float(f) => f.to_string(),
    }
}

/// Parse the leading numeric part of a string, like a loose numeric cast.
pub fn string_to_number(s: &str) -> NumberType {
    let trimmed = s.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return NumberType::Integer(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return NumberType::Float(f);
        }
    }
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in trimmed.char_indices() {
        if c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+')) {
            end = i + 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            end = i + 1;
        } else {
            break;
        }
    }
    let prefix = trimmed[..end].trim_end_matches('.');
    if seen_dot && prefix.contains('.') {
        prefix.parse::<f64>().map(NumberType::Float).unwrap_or(NumberType::Integer(0))
    } else {
        prefix.parse::<i64>().map(NumberType::Integer).unwrap_or(NumberType::Integer(0))
    }
}

pub fn to_number(v: &Value) -> NumberType {
    match v {
        Value::Null => NumberType::Integer(0),
        Value::Bool(b) => NumberType::Integer(*b as i64),
        Value::Number(n) => *n,
        Value::String(s) => string_to_number(s),
        Value::Array(a) => NumberType::Integer(if a.is_empty() { 0 } else { 1 }),
        Value::Map(m) => NumberType::Integer(if m.is_empty() { 0 } else { 1 }),
        Value::Object(_) | Value::Function(_) => NumberType::Integer(1),
        Value::Resource(r) => NumberType::Integer(r.id as i64),
    }
}

pub fn to_f64(v: &Value) -> f64 {
    to_number(v).as_f64()
}

pub fn to_i64(v: &Value) -> i64 {
    to_number(v).as_i64()
}

/// Loose truthiness: `""`, `"0"`, `0`, `0.0`, empty lists, `null` and `false` are falsy.
pub fn to_boolean(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(NumberType::Integer(i)) => *i != 0,
        Value::Number(NumberType::Float(f)) => *f != 0.0,
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Map(m) => !m.is_empty(),
        Value::Object(_) | Value::Function(_) | Value::Resource(_) => true,
    }
}

/// Integer conversion used by the Numbers typecaster: lists give their size,
/// strings without any digit give their length.
pub fn to_integer(v: &Value) -> i64 {
    match v {
        Value::Array(a) => a.len() as i64,
        Value::Map(m) => m.len() as i64,
        Value::String(s) if !HAS_NUMERIC_CHARS.is_match(s) => s.len() as i64,
        _ => to_i64(v),
    }
}

/// Cast to a list. Scalars are wrapped, structs give their fields.
pub fn to_array(v: Value) -> Value {
    match v {
        Value::Null => Value::Array(Vec::new()),
        Value::Array(_) | Value::Map(_) => v,
        Value::Object(o) => Value::Map(o),
        other => Value::Array(vec![other]),
    }
}

/// Cast to a struct. Scalars land under a `scalar` field.
pub fn to_object(v: Value) -> Value {
    match v {
        Value::Null => Value::Object(ValueMap::new()),
        Value::Object(_) => v,
        Value::Map(m) => Value::Object(m),
        Value::Array(a) => Value::Object(
            a.into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        ),
        other => {
            let mut o = ValueMap::new();
            o.insert("scalar", other);
            Value::Object(o)
        }
    }
}

/// Strict string view used by string methods: scalars convert, collections are rejected.
pub fn expect_string(v: &Value, what: &str) -> Result<String, UnderscoreError> {
    match v {
        Value::Array(_) | Value::Map(_) | Value::Object(_) | Value::Function(_) | Value::Resource(_) => {
            Err(UnderscoreError::type_error(format!(
                "{} must be a string, {} given",
                what,
                get_type(v)
            )))
        }
        _ => Ok(to_string(v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_integer_counts_lists_and_measures_words() {
        assert_eq!(to_integer(&Value::from("foo")), 3);
        assert_eq!(to_integer(&Value::from("")), 0);
        assert_eq!(to_integer(&Value::from("15")), 15);
        assert_eq!(to_integer(&Value::Array(vec![Value::from(1), Value::from(2), Value::from(3)])), 3);
    }

    #[test]
    fn test_truthiness() {
        assert!(!to_boolean(&Value::from("")));
        assert!(!to_boolean(&Value::from("0")));
        assert!(to_boolean(&Value::from("foo")));
        assert!(to_boolean(&Value::from(15)));
        assert!(!to_boolean(&Value::from(0)));
        assert!(!to_boolean(&Value::Array(vec![])));
    }

    #[test]
    fn test_string_to_number_takes_leading_digits() {
        assert_eq!(string_to_number("42abc"), NumberType::Integer(42));
        assert_eq!(string_to_number("3.5"), NumberType::Float(3.5));
        assert_eq!(string_to_number("abc"), NumberType::Integer(0));
    }

    #[test]
    fn test_float_rendering() {
        assert_eq!(to_string(&Value::from(5.0)), "5");
        assert_eq!(to_string(&Value::from(1.5)), "1.5");
        assert_eq!(to_string(&Value::Bool(true)), "1");
    }
}
