//! Core types for method dispatch.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::runner::ds::arguments::Arguments;
use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::map::ValueMap;
use crate::runner::ds::operations::type_conversion::{to_array, to_integer, to_object};
use crate::runner::ds::value::Value;

/// The closed set of wrapper families a value can be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperType {
    Strings,
    Numbers,
    Lists,
    Structs,
    Functions,
}

impl WrapperType {
    pub const ALL: [WrapperType; 5] = [
        WrapperType::Strings,
        WrapperType::Numbers,
        WrapperType::Lists,
        WrapperType::Structs,
        WrapperType::Functions,
    ];

    /// Canonical name, also the name of the type's method collection.
    pub fn name(&self) -> &'static str {
        match self {
            WrapperType::Strings => "Strings",
            WrapperType::Numbers => "Numbers",
            WrapperType::Lists => "Lists",
            WrapperType::Structs => "Structs",
            WrapperType::Functions => "Functions",
        }
    }

    /// Subject used when a wrapper is created without one.
    pub fn default_value(&self) -> Value {
        match self {
            WrapperType::Strings | WrapperType::Functions => Value::String(String::new()),
            WrapperType::Numbers => Value::from(0),
            WrapperType::Lists => Value::Array(Vec::new()),
            WrapperType::Structs => Value::Object(ValueMap::new()),
        }
    }

    /// Coerce a subject into the canonical shape for this type.
    pub fn typecast(&self, subject: Value) -> Value {
        match self {
            WrapperType::Lists => to_array(subject),
            WrapperType::Structs => to_object(subject),
            WrapperType::Numbers => match subject {
                Value::Number(_) => subject,
                other => Value::from(to_integer(&other)),
            },
            WrapperType::Strings | WrapperType::Functions => subject,
        }
    }
}

impl fmt::Display for WrapperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a call was addressed: the generic entry point or a concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallTarget {
    Generic,
    Typed(WrapperType),
}

impl CallTarget {
    pub const GENERIC_NAME: &'static str = "Underscore";

    pub fn name(&self) -> &'static str {
        match self {
            CallTarget::Generic => Self::GENERIC_NAME,
            CallTarget::Typed(t) => t.name(),
        }
    }
}

impl From<WrapperType> for CallTarget {
    fn from(t: WrapperType) -> Self {
        CallTarget::Typed(t)
    }
}

impl fmt::Display for CallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Function signature for library methods.
pub type NativeFn = fn(args: Arguments) -> Result<Value, UnderscoreError>;

/// User-registered extension.
pub type MacroFn = Arc<dyn Fn(Vec<Value>) -> Result<Value, UnderscoreError> + Send + Sync>;

/// A resolved implementation - either compiled-in or registered at runtime.
#[derive(Clone)]
pub enum BuiltInFn {
    /// Direct function pointer for library methods.
    Native(NativeFn),

    /// Closure registered through `extend`.
    Macro(MacroFn),
}

impl BuiltInFn {
    /// Invoke with any number of positional arguments.
    pub fn call(&self, args: Vec<Value>) -> Result<Value, UnderscoreError> {
        match self {
            BuiltInFn::Native(f) => f(Arguments::new(args)),
            BuiltInFn::Macro(f) => f(args),
        }
    }
}

impl fmt::Debug for BuiltInFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltInFn::Native(_) => write!(f, "BuiltInFn::Native"),
            BuiltInFn::Macro(_) => write!(f, "BuiltInFn::Macro"),
        }
    }
}

/// A named set of library methods, e.g. every method of `Lists`.
///
/// A collection may inherit from a parent collection; lookups fall through
/// to the parent when the method is not defined locally.
pub struct MethodCollection {
    /// Name of the collection (e.g. "Lists", "Parse").
    pub name: String,

    /// Collection consulted when a method is missing here.
    pub parent: Option<String>,

    pub methods: HashMap<String, NativeFn>,
}

impl MethodCollection {
    pub fn new(name: impl Into<String>) -> Self {
        MethodCollection {
            name: name.into(),
            parent: None,
            methods: HashMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn add_method(mut self, name: impl Into<String>, func: NativeFn) -> Self {
        self.methods.insert(name.into(), func);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typecasters() {
        assert_eq!(
            WrapperType::Lists.typecast(Value::from("foo")),
            Value::Array(vec![Value::from("foo")])
        );
        assert_eq!(WrapperType::Numbers.typecast(Value::from("foo")), Value::from(3));
        assert!(matches!(
            WrapperType::Structs.typecast(Value::Map(ValueMap::new())),
            Value::Object(_)
        ));
        assert_eq!(WrapperType::Strings.typecast(Value::from(5)), Value::from(5));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(WrapperType::Strings.default_value(), Value::from(""));
        assert_eq!(WrapperType::Numbers.default_value(), Value::from(0));
        assert_eq!(WrapperType::Lists.default_value(), Value::Array(vec![]));
        assert_eq!(CallTarget::Generic.name(), "Underscore");
    }
}
