use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::map::ValueMap;
use crate::runner::ds::value::Value;

#[derive(Parser)]
#[grammar = "parser/options.pest"] // relative to src
pub struct OptionsParser;

impl OptionsParser {
    /// Parse an options file into a nested map. Tables become nested maps,
    /// dotted keys inside a table nest further.
    pub fn parse_to_map(content: &str) -> Result<ValueMap, UnderscoreError> {
        let file = OptionsParser::parse(Rule::file, content)
            .map_err(|e| UnderscoreError::Parse(e.to_string()))?
            .next()
            .ok_or_else(|| UnderscoreError::Parse("empty options document".to_string()))?;

        let mut root = ValueMap::new();
        let mut table: Vec<String> = Vec::new();
        for pair in file.into_inner() {
            match pair.as_rule() {
                Rule::table_header => {
                    table = key_path(first_inner(pair)?)?;
                    ensure_table(&mut root, &table)?;
                }
                Rule::pair => {
                    let mut inner = pair.into_inner();
                    let path = match inner.next() {
                        Some(p) => key_path(p)?,
                        None => return Err(UnderscoreError::Parse("missing key".to_string())),
                    };
                    let value = match inner.next() {
                        Some(v) => build_value(v)?,
                        None => return Err(UnderscoreError::Parse("missing value".to_string())),
                    };
                    let mut full = table.clone();
                    full.extend(path);
                    insert_at(&mut root, &full, value)?;
                }
                _ => {}
            }
        }
        Ok(root)
    }
}

fn first_inner(pair: Pair<Rule>) -> Result<Pair<Rule>, UnderscoreError> {
    let rule = pair.as_rule();
    pair.into_inner()
        .next()
        .ok_or_else(|| UnderscoreError::Parse(format!("empty {:?}", rule)))
}

fn key_path(pair: Pair<Rule>) -> Result<Vec<String>, UnderscoreError> {
    pair.into_inner()
        .map(|k| match k.as_rule() {
            Rule::bare_key => Ok(k.as_str().to_string()),
            Rule::quoted_key => Ok(unescape(first_inner(k)?.as_str())),
            r => Err(UnderscoreError::Parse(format!("unexpected {:?} in key", r))),
        })
        .collect()
}

fn build_value(pair: Pair<Rule>) -> Result<Value, UnderscoreError> {
    match pair.as_rule() {
        Rule::string => Ok(Value::String(unescape(first_inner(pair)?.as_str()))),
        Rule::integer => pair
            .as_str()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| UnderscoreError::Parse(e.to_string())),
        Rule::float => pair
            .as_str()
            .parse::<f64>()
            .map(Value::from)
            .map_err(|e| UnderscoreError::Parse(e.to_string())),
        Rule::boolean => Ok(Value::Bool(pair.as_str() == "true")),
        Rule::array => pair
            .into_inner()
            .map(build_value)
            .collect::<Result<Vec<Value>, _>>()
            .map(Value::Array),
        r => Err(UnderscoreError::Parse(format!("unexpected {:?} as value", r))),
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn ensure_table<'a>(root: &'a mut ValueMap, path: &[String]) -> Result<&'a mut ValueMap, UnderscoreError> {
    let mut current = root;
    for segment in path {
        let slot = current.entry_or_insert_with(segment, || Value::Map(ValueMap::new()));
        current = match slot {
            Value::Map(m) => m,
            _ => {
                return Err(UnderscoreError::Parse(format!(
                    "key \"{}\" is both a value and a table",
                    segment
                )))
            }
        };
    }
    Ok(current)
}

fn insert_at(root: &mut ValueMap, path: &[String], value: Value) -> Result<(), UnderscoreError> {
    match path.split_last() {
        Some((last, parents)) => {
            ensure_table(root, parents)?.insert(last.clone(), value);
            Ok(())
        }
        None => Ok(()),
    }
}
