//! `Parse` methods: format parsers and type switchers shared by every type.

use csv::ReaderBuilder;
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as Json};

use crate::parser::xml::XmlParser;
use crate::runner::ds::arguments::Arguments;
use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::map::ValueMap;
use crate::runner::ds::operations::type_conversion::{
    get_type, to_array, to_boolean, to_integer, to_object, to_string,
};
use crate::runner::ds::value::{NumberType, Value};
use crate::runner::plugin::registry::{BuiltInRegistry, PARSE_COLLECTION};
use crate::runner::plugin::types::MethodCollection;

const ROW_DELIMITERS: [&str; 3] = ["\r\n", "\n", "\r"];
const COLUMN_DELIMITERS: [&str; 3] = [";", "\t", ","];

pub fn register(registry: &mut BuiltInRegistry) {
    let parse = MethodCollection::new(PARSE_COLLECTION)
        .add_method("fromJSON", parse_from_json)
        .add_method("toJSON", parse_to_json)
        .add_method("fromXML", parse_from_xml)
        .add_method("fromCSV", parse_from_csv)
        .add_method("toCSV", parse_to_csv)
        .add_method("toArray", parse_to_array)
        .add_method("toString", parse_to_string)
        .add_method("toInteger", parse_to_integer)
        .add_method("toBoolean", parse_to_boolean)
        .add_method("toObject", parse_to_object)
        .add_method("explodeWith", parse_explode_with);

    registry.register_collection(parse);
}

/// Maps whose keys run `0..n` encode as JSON arrays.
fn is_sequential(map: &ValueMap) -> bool {
    map.keys().enumerate().all(|(i, k)| *k == i.to_string())
}

pub fn to_json(value: &Value) -> Result<Json, UnderscoreError> {
    Ok(match value {
        Value::Null | Value::Function(_) => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(NumberType::Integer(i)) => Json::Number((*i).into()),
        Value::Number(NumberType::Float(f)) => JsonNumber::from_f64(*f)
            .map(Json::Number)
            .ok_or_else(|| UnderscoreError::type_error(format!("{} cannot be encoded as JSON", f)))?,
        Value::String(s) => Json::String(s.clone()),
        Value::Array(items) => Json::Array(items.iter().map(to_json).collect::<Result<_, _>>()?),
        Value::Map(map) if is_sequential(map) => {
            Json::Array(map.values().map(to_json).collect::<Result<_, _>>()?)
        }
        Value::Map(map) | Value::Object(map) => {
            let mut object = JsonMap::new();
            for (k, v) in map.iter() {
                object.insert(k.clone(), to_json(v)?);
            }
            Json::Object(object)
        }
        Value::Resource(_) => {
            return Err(UnderscoreError::type_error(format!(
                "{} cannot be encoded as JSON",
                get_type(value)
            )))
        }
    })
}

/// Decoded JSON objects become keyed maps.
pub fn from_json(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::from(i),
            None => Value::from(n.as_f64().unwrap_or(0.0)),
        },
        Json::String(s) => Value::String(s),
        Json::Array(items) => Value::Array(items.into_iter().map(from_json).collect()),
        Json::Object(object) => Value::Map(object.into_iter().map(|(k, v)| (k, from_json(v))).collect()),
    }
}

pub fn to_json_string(value: &Value) -> Result<String, UnderscoreError> {
    Ok(serde_json::to_string(&to_json(value)?)?)
}

fn parse_from_json(args: Arguments) -> Result<Value, UnderscoreError> {
    let json: Json = serde_json::from_str(&args.string(0)?)?;
    Ok(from_json(json))
}

fn parse_to_json(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(to_json_string(&args.value(0))?))
}

fn parse_from_xml(args: Arguments) -> Result<Value, UnderscoreError> {
    XmlParser::parse_to_value(&args.string(0)?)
}

/// Split on the first delimiter that yields more than one piece.
pub(crate) fn explode_with<'a>(string: &'a str, delimiters: &[&str]) -> Vec<&'a str> {
    for delimiter in delimiters.iter().filter(|d| !d.is_empty()) {
        let pieces: Vec<&str> = string.split(delimiter).collect();
        if pieces.len() > 1 {
            return pieces;
        }
    }
    vec![string]
}

fn parse_explode_with(args: Arguments) -> Result<Value, UnderscoreError> {
    let string = args.string(0)?;
    let delimiters: Vec<String> = args.list(1).iter().map(to_string).collect();
    let delimiters: Vec<&str> = delimiters.iter().map(String::as_str).collect();
    Ok(Value::Array(
        explode_with(&string, &delimiters).into_iter().map(Value::from).collect(),
    ))
}

/// Columns of one row, split with whichever delimiter the row uses.
fn read_columns(row: &str) -> Result<Vec<String>, UnderscoreError> {
    let delimiter = COLUMN_DELIMITERS
        .iter()
        .find(|d| row.contains(**d))
        .map(|d| d.as_bytes()[0])
        .unwrap_or(b';');
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(row.as_bytes());
    match reader.records().next() {
        Some(record) => Ok(record?.iter().map(String::from).collect()),
        None => Ok(vec![String::new()]),
    }
}

/// Rows become lists of columns. With headers, the first row names the
/// columns of every other row.
fn parse_from_csv(args: Arguments) -> Result<Value, UnderscoreError> {
    let data = args.string(0)?;
    let has_headers = args.bool_or(1, false);

    let mut rows = explode_with(data.trim(), &ROW_DELIMITERS)
        .into_iter()
        .map(read_columns)
        .collect::<Result<Vec<_>, _>>()?;

    if !has_headers {
        return Ok(Value::Array(
            rows.into_iter()
                .map(|row| Value::Array(row.into_iter().map(Value::String).collect()))
                .collect(),
        ));
    }

    let headers = if rows.is_empty() { Vec::new() } else { rows.remove(0) };
    Ok(Value::Array(
        rows.into_iter()
            .map(|row| {
                let keyed: ValueMap = row
                    .into_iter()
                    .enumerate()
                    .map(|(i, column)| {
                        let key = headers.get(i).cloned().unwrap_or_else(|| i.to_string());
                        (key, Value::String(column))
                    })
                    .collect();
                Value::Map(keyed)
            })
            .collect(),
    ))
}

fn quote(value: &Value) -> String {
    format!("\"{}\"", to_string(value).replace('\\', ""))
}

/// Quoted rows joined by newlines. A scalar entry becomes a `key;value` row.
fn parse_to_csv(args: Arguments) -> Result<Value, UnderscoreError> {
    let data = match args.value(0) {
        Value::Object(fields) => Value::Map(fields),
        list @ (Value::Array(_) | Value::Map(_)) => list,
        other => return Ok(other),
    };
    let delimiter = args.opt_string(1)?.unwrap_or_else(|| ";".to_string());
    let export_headers = args.bool_or(2, false);

    let mut lines = Vec::new();
    if export_headers {
        let first = data.clone().into_values().into_iter().next().unwrap_or(Value::Null);
        let headers: Vec<String> = first.entries().iter().map(|(k, _)| to_string(k)).collect();
        lines.push(headers.join(&delimiter));
    }

    for (key, row) in data.entries() {
        if row.is_collection() {
            let quoted: Vec<String> = row.into_values().iter().map(quote).collect();
            lines.push(quoted.join(&delimiter));
        } else {
            lines.push(format!("{}{}{}", quote(&key), delimiter, quote(&row)));
        }
    }
    Ok(Value::String(lines.join("\n")))
}

fn parse_to_array(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(to_array(args.value(0)))
}

fn parse_to_string(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(to_string(&args.value(0))))
}

fn parse_to_integer(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::from(to_integer(&args.value(0))))
}

fn parse_to_boolean(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::Bool(to_boolean(&args.value(0))))
}

fn parse_to_object(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(to_object(args.value(0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: fn(Arguments) -> Result<Value, UnderscoreError>, args: Vec<Value>) -> Value {
        f(Arguments::new(args)).unwrap()
    }

    fn row(values: &[&str]) -> Value {
        Value::Array(values.iter().map(|v| Value::from(*v)).collect())
    }

    #[test]
    fn test_json_keeps_key_order() {
        let map: ValueMap = vec![("foo", Value::from("bar")), ("bis", Value::from("ter"))]
            .into_iter()
            .collect();
        assert_eq!(to_json_string(&Value::Map(map)).unwrap(), r#"{"foo":"bar","bis":"ter"}"#);
        assert_eq!(to_json_string(&row(&["a", "b"])).unwrap(), r#"["a","b"]"#);
        assert_eq!(to_json_string(&Value::Object(ValueMap::new())).unwrap(), "{}");
    }

    #[test]
    fn test_from_json() {
        let decoded = call(parse_from_json, vec![Value::from(r#"{"foo":[1,2.5,null]}"#)]);
        let expected: ValueMap = vec![(
            "foo",
            Value::Array(vec![Value::from(1), Value::from(2.5), Value::Null]),
        )]
        .into_iter()
        .collect();
        assert_eq!(decoded, Value::Map(expected));
        assert!(parse_from_json(Arguments::new(vec![Value::from("{nope")])).is_err());
    }

    #[test]
    fn test_from_csv_detects_delimiters() {
        let parsed = call(parse_from_csv, vec![Value::from("foo;bar;bis\nbar\tfoo\tter")]);
        assert_eq!(
            parsed,
            Value::Array(vec![row(&["foo", "bar", "bis"]), row(&["bar", "foo", "ter"])])
        );
    }

    #[test]
    fn test_from_csv_with_headers() {
        let parsed = call(
            parse_from_csv,
            vec![Value::from("foo,bis\nbar,ter"), Value::Bool(true)],
        );
        let expected: ValueMap = vec![("foo", Value::from("bar")), ("bis", Value::from("ter"))]
            .into_iter()
            .collect();
        assert_eq!(parsed, Value::Array(vec![Value::Map(expected)]));
    }

    #[test]
    fn test_to_csv() {
        let entry = |a: &str| -> Value {
            let m: ValueMap = vec![("foo", Value::from(a)), ("bis", Value::from("ter"))]
                .into_iter()
                .collect();
            Value::Map(m)
        };
        let data = Value::Array(vec![entry("bar"), entry("bar"), entry("foo")]);
        assert_eq!(
            call(parse_to_csv, vec![data.clone()]),
            Value::from("\"bar\";\"ter\"\n\"bar\";\"ter\"\n\"foo\";\"ter\"")
        );
        assert_eq!(
            call(parse_to_csv, vec![data, Value::from(","), Value::Bool(true)]),
            Value::from("foo,bis\n\"bar\",\"ter\"\n\"bar\",\"ter\"\n\"foo\",\"ter\"")
        );
    }

    #[test]
    fn test_to_csv_scalar_rows() {
        let map: ValueMap = vec![("foo", Value::from("bar"))].into_iter().collect();
        assert_eq!(call(parse_to_csv, vec![Value::Map(map)]), Value::from("\"foo\";\"bar\""));
        assert_eq!(call(parse_to_csv, vec![Value::from(3)]), Value::from(3));
    }

    #[test]
    fn test_type_switchers() {
        assert_eq!(call(parse_to_integer, vec![row(&["a", "b"])]), Value::from(2));
        assert_eq!(call(parse_to_integer, vec![Value::from("foo")]), Value::from(3));
        assert_eq!(call(parse_to_boolean, vec![Value::from("")]), Value::Bool(false));
        assert_eq!(call(parse_to_string, vec![Value::from(2)]), Value::from("2"));
    }
}
