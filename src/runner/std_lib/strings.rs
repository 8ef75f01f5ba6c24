//! `Strings` methods.

use std::net::IpAddr;

use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use crate::runner::api::Underscore;
use crate::runner::ds::arguments::Arguments;
use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::value::{NumberType, Value};
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{MethodCollection, WrapperType};

const RANDOM_POOL: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
            .expect("valid regex");
    static ref URL: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://[^\s/?#]+(?:[/?#]\S*)?$").expect("valid regex");
    static ref SLUG_JUNK: Regex = Regex::new(r"[^\p{L}\p{N}\s_-]+").expect("valid regex");
    static ref FORMAT_PLACEHOLDER: Regex = Regex::new(r"%[ds]").expect("valid regex");
}

pub fn register(registry: &mut BuiltInRegistry) {
    let strings = MethodCollection::new("Strings")
        .add_method("accord", strings_accord)
        .add_method("random", strings_random)
        .add_method("quickRandom", strings_quick_random)
        .add_method("randomStrings", strings_random_strings)
        .add_method("endsWith", strings_ends_with)
        .add_method("startsWith", strings_starts_with)
        .add_method("isIp", strings_is_ip)
        .add_method("isEmail", strings_is_email)
        .add_method("isUrl", strings_is_url)
        .add_method("find", strings_find)
        .add_method("slice", strings_slice)
        .add_method("sliceFrom", strings_slice_from)
        .add_method("sliceTo", strings_slice_to)
        .add_method("baseClass", strings_base_class)
        .add_method("prepend", strings_prepend)
        .add_method("append", strings_append)
        .add_method("limit", strings_limit)
        .add_method("remove", strings_remove)
        .add_method("replace", strings_replace)
        .add_method("toggle", strings_toggle)
        .add_method("slugify", strings_slugify)
        .add_method("explode", strings_explode)
        .add_method("lower", strings_lower)
        .add_method("upper", strings_upper)
        .add_method("title", strings_title)
        .add_method("words", strings_words)
        .add_method("plural", strings_plural)
        .add_method("singular", strings_singular)
        .add_method("toPascalCase", strings_to_pascal_case)
        .add_method("toSnakeCase", strings_to_snake_case)
        .add_method("toCamelCase", strings_to_camel_case);

    registry.register_collection(strings);
}

/// A string argument or a list of them.
fn string_list(args: &Arguments, index: usize) -> Result<Vec<String>, UnderscoreError> {
    match args.get(index) {
        Some(v) if v.is_collection() => args.list(index).iter().map(|s| expect(s)).collect(),
        Some(_) => Ok(vec![args.string(index)?]),
        None => Ok(Vec::new()),
    }
}

fn expect(v: &Value) -> Result<String, UnderscoreError> {
    crate::runner::ds::operations::type_conversion::expect_string(v, "needle")
}

fn strings_accord(args: Arguments) -> Result<Value, UnderscoreError> {
    let count = args.value(0);
    let many = args.string(1)?;
    let one = args.string(2)?;
    let zero = args.opt_string(3)?.filter(|z| !z.is_empty() && z != "0");

    let output = match (&count, zero) {
        (Value::Number(NumberType::Integer(1)), _) => one,
        (Value::Number(NumberType::Integer(0)), Some(zero)) => zero,
        _ => many,
    };
    let count = crate::runner::ds::operations::type_conversion::to_string(&count);
    Ok(Value::String(FORMAT_PLACEHOLDER.replace_all(&output, count.as_str()).into_owned()))
}

fn strings_random(args: Arguments) -> Result<Value, UnderscoreError> {
    let length = args.int_or(0, 16).max(0) as usize;
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();
    Ok(Value::String(random))
}

fn strings_quick_random(args: Arguments) -> Result<Value, UnderscoreError> {
    let length = args.int_or(0, 16).max(0) as usize;
    let mut pool: Vec<char> = RANDOM_POOL.repeat(length).chars().collect();
    pool.shuffle(&mut rand::thread_rng());
    Ok(Value::String(pool.into_iter().take(length).collect()))
}

/// `words` space-separated chunks of `length` characters drawn from a shuffled pool.
fn strings_random_strings(args: Arguments) -> Result<Value, UnderscoreError> {
    let words = args.int(0);
    let length = args.int_or(1, 10);

    let mut strings = Underscore::new().of(WrapperType::Strings).from(RANDOM_POOL);
    strings
        .chain("shuffle", vec![])?
        .chain("split", vec![Value::from(length)])?
        .chain("slice", vec![Value::from(0), Value::from(words)])?
        .chain("implode", vec![Value::from(" ")])?;
    Ok(strings.obtain())
}

fn strings_ends_with(args: Arguments) -> Result<Value, UnderscoreError> {
    let haystack = args.string(0)?;
    let found = string_list(&args, 1)?
        .iter()
        .any(|n| haystack.ends_with(n.as_str()) && (!n.is_empty() || haystack.is_empty()));
    Ok(Value::Bool(found))
}

fn strings_starts_with(args: Arguments) -> Result<Value, UnderscoreError> {
    let haystack = args.string(0)?;
    let found = string_list(&args, 1)?
        .iter()
        .any(|n| !n.is_empty() && haystack.starts_with(n.as_str()));
    Ok(Value::Bool(found))
}

fn strings_is_ip(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::Bool(args.string(0)?.parse::<IpAddr>().is_ok()))
}

fn strings_is_email(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::Bool(EMAIL.is_match(&args.string(0)?)))
}

fn strings_is_url(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::Bool(URL.is_match(&args.string(0)?)))
}

fn contains(haystack: &str, needle: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        haystack.contains(needle)
    } else {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Search `needle` in the subject. Either side may be a list: then any (or,
/// when `absolute`, every) element of that list must match.
fn strings_find(args: Arguments) -> Result<Value, UnderscoreError> {
    let case_sensitive = args.bool_or(2, false);
    let absolute = args.bool_or(3, false);
    let subject = args.value(0);
    let needle = args.value(1);

    let (many, single) = if needle.is_collection() {
        (string_list(&args, 1)?, expect(&subject)?)
    } else if subject.is_collection() {
        (string_list(&args, 0)?, expect(&needle)?)
    } else {
        let found = contains(&expect(&subject)?, &expect(&needle)?, case_sensitive);
        return Ok(Value::Bool(found));
    };

    let found = many.iter().filter(|n| contains(&single, n, case_sensitive)).count();
    Ok(Value::Bool(if absolute { found == many.len() } else { found > 0 }))
}

/// Split around the first occurrence of `slice`. A missing delimiter leaves
/// everything on the right.
fn split_at_first(string: &str, slice: &str) -> (String, String) {
    match string.find(slice) {
        Some(i) => (string[..i].to_string(), string[i..].to_string()),
        None => (String::new(), string.to_string()),
    }
}

fn strings_slice(args: Arguments) -> Result<Value, UnderscoreError> {
    let (to, from) = split_at_first(&args.string(0)?, &args.string(1)?);
    Ok(Value::Array(vec![Value::String(to), Value::String(from)]))
}

fn strings_slice_from(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(split_at_first(&args.string(0)?, &args.string(1)?).1))
}

fn strings_slice_to(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(split_at_first(&args.string(0)?, &args.string(1)?).0))
}

fn strings_base_class(args: Arguments) -> Result<Value, UnderscoreError> {
    let path = args.string(0)?.replace('\\', "/");
    let base = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    Ok(Value::from(base))
}

fn strings_prepend(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(args.string(1)? + &args.string(0)?))
}

fn strings_append(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(args.string(0)? + &args.string(1)?))
}

fn strings_limit(args: Arguments) -> Result<Value, UnderscoreError> {
    let value = args.string(0)?;
    let limit = args.int_or(1, 100).max(0) as usize;
    let end = args.opt_string(2)?.unwrap_or_else(|| "...".to_string());
    if value.chars().count() <= limit {
        return Ok(Value::String(value));
    }
    let cut: String = value.chars().take(limit).collect();
    Ok(Value::String(cut.trim_end().to_string() + &end))
}

fn strings_remove(args: Arguments) -> Result<Value, UnderscoreError> {
    let mut string = args.string(0)?;
    for needle in string_list(&args, 1)?.iter().filter(|n| !n.is_empty()) {
        string = string.replace(needle.as_str(), "");
    }
    Ok(Value::String(string.trim().to_string()))
}

fn strings_replace(args: Arguments) -> Result<Value, UnderscoreError> {
    let mut string = args.string(0)?;
    let replace = string_list(&args, 1)?;
    let with = string_list(&args, 2)?;
    let single_with = !args.value(2).is_collection();
    for (i, needle) in replace.iter().enumerate().filter(|(_, n)| !n.is_empty()) {
        let replacement = if single_with {
            with.first().cloned().unwrap_or_default()
        } else {
            with.get(i).cloned().unwrap_or_default()
        };
        string = string.replace(needle.as_str(), &replacement);
    }
    Ok(Value::String(string))
}

fn strings_toggle(args: Arguments) -> Result<Value, UnderscoreError> {
    let string = args.value(0);
    let first = args.value(1);
    let second = args.value(2);
    let loose = args.bool_or(3, false);
    if !loose && string != first && string != second {
        return Ok(string);
    }
    Ok(if string == first { second } else { first })
}

fn strings_slugify(args: Arguments) -> Result<Value, UnderscoreError> {
    let separator = args.opt_string(1)?.unwrap_or_else(|| "-".to_string());
    let flip = if separator == "-" { "_" } else { "-" };

    let title = args.string(0)?.replace('_', " ").replace(flip, &separator);
    let title = SLUG_JUNK.replace_all(&title.to_lowercase(), "").into_owned();

    let mut slug = String::new();
    let mut pending = false;
    for c in title.chars() {
        if c.is_whitespace() || separator.contains(c) || c == '_' || c == '-' {
            pending = true;
        } else {
            if pending && !slug.is_empty() {
                slug.push_str(&separator);
            }
            pending = false;
            slug.push(c);
        }
    }
    Ok(Value::String(slug))
}

/// Split on `with`. A positive limit caps the number of pieces, a negative
/// one drops that many from the end.
fn strings_explode(args: Arguments) -> Result<Value, UnderscoreError> {
    let string = args.string(0)?;
    let with = args.string(1)?;
    if with.is_empty() {
        return Err(UnderscoreError::type_error("explode delimiter must not be empty"));
    }
    let pieces: Vec<String> = match args.opt_int(2) {
        Some(limit) if limit > 0 => string
            .splitn(limit as usize, with.as_str())
            .map(String::from)
            .collect(),
        Some(limit) if limit < 0 => {
            let mut all: Vec<String> = string.split(with.as_str()).map(String::from).collect();
            all.truncate(all.len().saturating_sub(limit.unsigned_abs() as usize));
            all
        }
        _ => string.split(with.as_str()).map(String::from).collect(),
    };
    Ok(Value::Array(pieces.into_iter().map(Value::String).collect()))
}

fn strings_lower(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(args.string(0)?.to_lowercase()))
}

fn strings_upper(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(args.string(0)?.to_uppercase()))
}

pub(crate) fn title_case(string: &str) -> String {
    let mut out = String::with_capacity(string.len());
    let mut at_word_start = true;
    for c in string.chars() {
        if c.is_alphanumeric() || c == '\'' {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

fn strings_title(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(title_case(&args.string(0)?)))
}

fn strings_words(args: Arguments) -> Result<Value, UnderscoreError> {
    let value = args.string(0)?;
    let words = args.int_or(1, 100).max(1) as usize;
    let end = args.opt_string(2)?.unwrap_or_else(|| "...".to_string());

    let mut seen = 0;
    let mut in_word = false;
    let mut cut = value.len();
    for (i, c) in value.char_indices() {
        if c.is_whitespace() {
            in_word = false;
        } else if !in_word {
            if seen == words {
                cut = i;
                break;
            }
            seen += 1;
            in_word = true;
        }
    }
    if cut == value.len() {
        return Ok(Value::String(value));
    }
    Ok(Value::String(value[..cut].trim_end().to_string() + &end))
}

const IRREGULARS: [(&str, &str); 11] = [
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("ox", "oxen"),
    ("leaf", "leaves"),
    ("life", "lives"),
];

const UNCOUNTABLES: [&str; 10] = [
    "equipment", "information", "rice", "money", "species", "series", "fish", "sheep", "deer",
    "news",
];

/// Keep the case of the first letter of `like` on `word`.
fn match_case(like: &str, word: &str) -> String {
    match like.chars().next() {
        Some(c) if c.is_uppercase() => title_case(word),
        _ => word.to_string(),
    }
}

fn stem(word: &str, n: usize) -> &str {
    &word[..word.len() - n]
}

pub(crate) fn pluralize(word: &str) -> String {
    let lower = word.to_lowercase();
    if UNCOUNTABLES.contains(&lower.as_str()) || IRREGULARS.iter().any(|(_, p)| *p == lower) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULARS.iter().find(|(s, _)| *s == lower) {
        return match_case(word, plural);
    }
    if lower.ends_with("quiz") {
        format!("{}zes", word)
    } else if lower.ends_with("ss") || lower.ends_with("sh") || lower.ends_with("ch")
        || lower.ends_with('x') || lower.ends_with('z')
    {
        format!("{}es", word)
    } else if lower.ends_with('s') {
        word.to_string()
    } else if lower.ends_with('y') && !lower.ends_with("ay") && !lower.ends_with("ey")
        && !lower.ends_with("oy") && !lower.ends_with("uy")
    {
        format!("{}ies", stem(word, 1))
    } else if lower.ends_with("fe") {
        format!("{}ves", stem(word, 2))
    } else if lower.ends_with("lf") || lower.ends_with("rf") {
        format!("{}ves", stem(word, 1))
    } else {
        format!("{}s", word)
    }
}

pub(crate) fn singularize(word: &str) -> String {
    let lower = word.to_lowercase();
    if UNCOUNTABLES.contains(&lower.as_str()) || IRREGULARS.iter().any(|(s, _)| *s == lower) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULARS.iter().find(|(_, p)| *p == lower) {
        return match_case(word, singular);
    }
    if lower.ends_with("ies") && lower.len() > 3 {
        format!("{}y", stem(word, 3))
    } else if lower.ends_with("ves") {
        format!("{}f", stem(word, 3))
    } else if lower.ends_with("sses") || lower.ends_with("shes") || lower.ends_with("ches")
        || lower.ends_with("xes") || lower.ends_with("zes")
    {
        stem(word, 2).to_string()
    } else if lower.ends_with('s') && !lower.ends_with("ss") {
        stem(word, 1).to_string()
    } else {
        word.to_string()
    }
}

fn strings_plural(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(pluralize(&args.string(0)?)))
}

fn strings_singular(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(singularize(&args.string(0)?)))
}

/// `this_is-a string` -> `ThisIsAString`.
pub(crate) fn classify_case(string: &str) -> String {
    string
        .split(|c: char| c == '_' || c == '-' || c == ' ')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

fn strings_to_pascal_case(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(Value::String(classify_case(&args.string(0)?)))
}

fn strings_to_snake_case(args: Arguments) -> Result<Value, UnderscoreError> {
    let string = args.string(0)?;
    let mut out = String::with_capacity(string.len() + 4);
    for c in string.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    Ok(Value::String(out))
}

fn strings_to_camel_case(args: Arguments) -> Result<Value, UnderscoreError> {
    let pascal = classify_case(&args.string(0)?);
    let mut chars = pascal.chars();
    Ok(Value::String(match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }))
}
