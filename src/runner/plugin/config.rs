//! Options file loading.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::parser::OptionsParser;
use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::map::ValueMap;
use crate::runner::ds::operations::path::get_path;
use crate::runner::ds::operations::type_conversion::to_i64;
use crate::runner::ds::value::Value;

const DEFAULT_OPTIONS: &str = include_str!("../../../config/underscore.toml");

/// Alias hops followed when the options do not say otherwise.
pub const DEFAULT_MAX_ALIAS_DEPTH: usize = 8;

lazy_static! {
    static ref DEFAULTS: Options = match Options::parse(DEFAULT_OPTIONS) {
        Ok(options) => {
            tracing::debug!("loaded default options");
            options
        }
        Err(e) => {
            tracing::warn!(error = %e, "default options failed to parse, using none");
            Options::new()
        }
    };
}

/// Nested key/value options, read once and then only queried.
///
/// Expected format:
/// ```toml
/// [aliases]
/// select = "filter"
///
/// [resolver]
/// max_alias_depth = 8
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    root: Value,
}

impl Options {
    /// Create an empty option set.
    pub fn new() -> Self {
        Options {
            root: Value::Map(ValueMap::new()),
        }
    }

    /// Built-in options, parsed on first use.
    pub fn defaults() -> Options {
        DEFAULTS.clone()
    }

    /// Load options from a file.
    pub fn load(path: &Path) -> Result<Self, UnderscoreError> {
        let content = fs::read_to_string(path)
            .map_err(|e| UnderscoreError::Config(format!("Failed to read options file: {}", e)))?;
        Self::parse(&content)
    }

    /// Parse options from a string.
    pub fn parse(content: &str) -> Result<Self, UnderscoreError> {
        let root = OptionsParser::parse_to_map(content)
            .map_err(|e| UnderscoreError::Config(e.to_string()))?;
        Ok(Options {
            root: Value::Map(root),
        })
    }

    /// Dotted lookup, e.g. `option("aliases.select")`.
    pub fn option(&self, key: &str) -> Option<&Value> {
        get_path(&self.root, key)
    }

    /// The alias table. Non-string entries are ignored.
    pub fn aliases(&self) -> HashMap<String, String> {
        match self.option("aliases") {
            Some(Value::Map(m)) => m
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect(),
            _ => HashMap::new(),
        }
    }

    pub fn max_alias_depth(&self) -> usize {
        match self.option("resolver.max_alias_depth") {
            Some(v) if to_i64(v) > 0 => to_i64(v) as usize,
            _ => DEFAULT_MAX_ALIAS_DEPTH,
        }
    }

    /// Add or replace an alias.
    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        if let Value::Map(root) = &mut self.root {
            let aliases = root.entry_or_insert_with("aliases", || Value::Map(ValueMap::new()));
            if let Value::Map(m) = aliases {
                m.insert(alias, Value::String(target.into()));
            }
        }
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_options() {
        let options = Options::parse("").unwrap();
        assert!(options.aliases().is_empty());
        assert_eq!(options.max_alias_depth(), DEFAULT_MAX_ALIAS_DEPTH);
    }

    #[test]
    fn test_defaults_carry_aliases() {
        let options = Options::defaults();
        assert_eq!(options.option("aliases.select"), Some(&Value::from("filter")));
        assert_eq!(options.aliases().get("uniq").map(String::as_str), Some("unique"));
        assert!(options.option("aliases.nope").is_none());
    }

    #[test]
    fn test_with_alias_overrides() {
        let options = Options::new().with_alias("pick", "first");
        assert_eq!(options.option("aliases.pick"), Some(&Value::from("first")));
    }

    #[test]
    fn test_bad_options_are_config_errors() {
        match Options::parse("[unclosed") {
            Err(UnderscoreError::Config(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
