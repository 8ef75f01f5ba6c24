use std::cmp::Ordering;

use crate::runner::ds::operations::type_conversion::{string_to_number, to_boolean, to_f64, to_string};
use crate::runner::ds::value::Value;

fn is_numeric_string(s: &str) -> bool {
    let t = s.trim();
    !t.is_empty() && t.parse::<f64>().map(|f| f.is_finite()).unwrap_or(false)
}

fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Loose ordering used by sorting, `max` and `min`.
///
/// Numbers compare numerically, numeric strings compare as numbers against
/// numbers, other strings compare bytewise. Lists compare by size first.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_f64(x.as_f64(), y.as_f64()),
        (Value::String(x), Value::String(y)) => {
            if is_numeric_string(x) && is_numeric_string(y) {
                compare_f64(string_to_number(x).as_f64(), string_to_number(y).as_f64())
            } else {
                x.cmp(y)
            }
        }
        (Value::Number(x), Value::String(y)) if is_numeric_string(y) => {
            compare_f64(x.as_f64(), string_to_number(y).as_f64())
        }
        (Value::String(x), Value::Number(y)) if is_numeric_string(x) => {
            compare_f64(string_to_number(x).as_f64(), y.as_f64())
        }
        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
            to_string(a).cmp(&to_string(b))
        }
        (Value::Null, _) | (_, Value::Null) | (Value::Bool(_), _) | (_, Value::Bool(_)) => {
            to_boolean(a).cmp(&to_boolean(b))
        }
        _ if a.is_collection() && b.is_collection() => {
            let by_len = a.len().cmp(&b.len());
            if by_len != Ordering::Equal {
                return by_len;
            }
            let left = a.entries();
            let right = b.entries();
            for ((_, x), (_, y)) in left.iter().zip(right.iter()) {
                let ord = compare_values(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        }
        _ => compare_f64(to_f64(a), to_f64(b)),
    }
}

/// Strict equality: same type and same value.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_compare_numerically() {
        assert_eq!(compare_values(&Value::from(2), &Value::from(10)), Ordering::Less);
        assert_eq!(compare_values(&Value::from("2"), &Value::from("10")), Ordering::Less);
        assert_eq!(compare_values(&Value::from("bar"), &Value::from("foo")), Ordering::Less);
    }

    #[test]
    fn test_strict_equality_keeps_types_apart() {
        assert!(strict_equals(&Value::from("1"), &Value::from("1")));
        assert!(!strict_equals(&Value::from(1), &Value::from("1")));
        assert!(!strict_equals(&Value::from(1), &Value::from(1.0)));
    }
}
