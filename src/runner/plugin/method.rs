//! Static method tables consulted during dispatch.

use std::collections::{HashMap, HashSet};

use super::config::Options;
use super::registry::{BuiltInRegistry, NATIVE_COLLECTION};
use super::types::{CallTarget, WrapperType};

/// Methods deferred to a host primitive. `(method, primitive)`.
const NATIVE_DEFERRALS: [(&str, &str); 12] = [
    ("trim", "trim"),
    ("count", "count"),
    ("round", "round"),
    ("ceil", "ceil"),
    ("floor", "floor"),
    ("substr", "substr"),
    ("pad", "str_pad"),
    ("ucfirst", "ucfirst"),
    ("lcfirst", "lcfirst"),
    ("ucwords", "ucwords"),
    ("strtolower", "strtolower"),
    ("strtoupper", "strtoupper"),
];

/// Methods whose chained call must not receive the subject.
const SUBJECTLESS: [&str; 1] = ["fill"];

/// Methods that end a chain and hand back their raw result.
const BREAKERS: [&str; 8] = [
    "get", "sum", "count", "fromJSON", "toJSON", "fromXML", "fromCSV", "toCSV",
];

/// Pairs that may only be called statically.
const UNCHAINABLE: [(WrapperType, &str); 2] =
    [(WrapperType::Lists, "range"), (WrapperType::Lists, "repeat")];

/// The dispatcher's read-only classification tables.
pub struct MethodRegistry {
    native_deferrals: HashMap<&'static str, &'static str>,
    subjectless: HashSet<&'static str>,
    breakers: HashSet<&'static str>,
    unchainable: HashSet<(WrapperType, &'static str)>,
    aliases: HashMap<String, String>,
    max_alias_depth: usize,
}

impl MethodRegistry {
    pub fn new(options: &Options) -> Self {
        MethodRegistry {
            native_deferrals: NATIVE_DEFERRALS.iter().cloned().collect(),
            subjectless: SUBJECTLESS.iter().cloned().collect(),
            breakers: BREAKERS.iter().cloned().collect(),
            unchainable: UNCHAINABLE.iter().cloned().collect(),
            aliases: options.aliases(),
            max_alias_depth: options.max_alias_depth(),
        }
    }

    pub fn is_subjectless(&self, method: &str) -> bool {
        self.subjectless.contains(method)
    }

    pub fn is_breaker(&self, method: &str) -> bool {
        self.breakers.contains(method)
    }

    pub fn is_unchainable(&self, wrapper: WrapperType, method: &str) -> bool {
        self.unchainable
            .iter()
            .any(|(t, m)| *t == wrapper && *m == method)
    }

    pub fn alias_of(&self, method: &str) -> Option<&str> {
        self.aliases.get(method).map(String::as_str)
    }

    pub fn max_alias_depth(&self) -> usize {
        self.max_alias_depth
    }

    /// Host primitive answering `method` for `target`, if one is implemented.
    ///
    /// The explicit table is consulted first. Lists then try `array_<method>`
    /// and Strings `str_<method>`, each also in snake case.
    pub fn native_deferral(
        &self,
        target: CallTarget,
        method: &str,
        builtins: &BuiltInRegistry,
    ) -> Option<String> {
        let implemented = |name: &str| builtins.has_method(NATIVE_COLLECTION, name);

        if let Some(native) = self.native_deferrals.get(method) {
            if implemented(*native) {
                return Some(native.to_string());
            }
        }

        let prefix = match target {
            CallTarget::Typed(WrapperType::Lists) => "array_",
            CallTarget::Typed(WrapperType::Strings) => "str_",
            _ => return None,
        };
        let candidates = [
            format!("{}{}", prefix, method),
            format!("{}{}", prefix, to_snake_case(method)),
        ];
        candidates.iter().find(|c| implemented(c.as_str())).cloned()
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new(&Options::defaults())
    }
}

/// `sortKeys` -> `sort_keys`.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
