use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::map::ValueMap;
use crate::runner::ds::value::Value;

pub const ATTRIBUTES_KEY: &str = "@attributes";

#[derive(Parser)]
#[grammar = "parser/xml.pest"] // relative to src
pub struct XmlParser;

impl XmlParser {
    /// Convert a document into nested values.
    ///
    /// The root element itself is dropped and its content returned. Child
    /// elements become keys, repeated children collect into a list, text-only
    /// elements become strings and attributes sit under `@attributes`.
    pub fn parse_to_value(xml: &str) -> Result<Value, UnderscoreError> {
        let document = XmlParser::parse(Rule::document, xml.trim())
            .map_err(|e| UnderscoreError::Parse(e.to_string()))?
            .next()
            .ok_or_else(|| UnderscoreError::Parse("empty XML document".to_string()))?;

        let root = document
            .into_inner()
            .find(|p| p.as_rule() == Rule::element)
            .ok_or_else(|| UnderscoreError::Parse("missing root element".to_string()))?;
        Ok(element_to_value(root).1)
    }
}

fn element_to_value(element: Pair<Rule>) -> (String, Value) {
    let mut name = String::new();
    let mut attributes = ValueMap::new();
    let mut children = ValueMap::new();
    let mut repeated: Vec<String> = Vec::new();
    let mut text = String::new();

    for part in element.into_inner() {
        match part.as_rule() {
            Rule::name => name = part.as_str().to_string(),
            Rule::attribute => {
                let mut inner = part.into_inner();
                if let (Some(key), Some(value)) = (inner.next(), inner.next()) {
                    attributes.insert(key.as_str(), Value::String(decode_entities(value.as_str())));
                }
            }
            Rule::element => {
                let (child_name, child) = element_to_value(part);
                push_child(&mut children, &mut repeated, child_name, child);
            }
            Rule::text => text.push_str(&decode_entities(part.as_str())),
            Rule::cdata => {
                if let Some(inner) = part.into_inner().next() {
                    text.push_str(inner.as_str());
                }
            }
            _ => {}
        }
    }

    if children.is_empty() && attributes.is_empty() {
        let value = if text.is_empty() {
            Value::Map(ValueMap::new())
        } else {
            Value::String(text)
        };
        return (name, value);
    }

    let mut out = ValueMap::new();
    if !attributes.is_empty() {
        out.insert(ATTRIBUTES_KEY, Value::Map(attributes));
    }
    if children.is_empty() && !text.trim().is_empty() {
        out.insert("0", Value::String(text));
    }
    for (k, v) in children {
        out.insert(k, v);
    }
    (name, Value::Map(out))
}

fn push_child(children: &mut ValueMap, repeated: &mut Vec<String>, name: String, child: Value) {
    if repeated.contains(&name) {
        if let Some(Value::Array(items)) = children.get_mut(&name) {
            items.push(child);
        }
        return;
    }
    match children.get_mut(&name) {
        Some(slot) => {
            let previous = std::mem::take(slot);
            *slot = Value::Array(vec![previous, child]);
            repeated.push(name);
        }
        None => {
            children.insert(name, child);
        }
    }
}

pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        match after.find(';') {
            Some(end) => {
                let entity = &after[1..end];
                match decode_entity(entity) {
                    Some(c) => out.push(c),
                    None => out.push_str(&after[..=end]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(after);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse::<u32>().ok()?
            };
            std::char::from_u32(code)
        }
    }
}
