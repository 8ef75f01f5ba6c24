//! Tiered method resolution.
//!
//! A `(target, method)` pair is answered by the first tier that knows it:
//!
//! ```text
//! 1. Library        the type's own method collection
//! 2. Alias          configured synonym, resolved again against the same target
//! 3. FormatParser   shared parse/serialize collection
//! 4. NativeDeferral host primitive, by explicit table or type prefix
//! 5. Macro          closure registered through `extend`
//! ```
//!
//! A miss on every tier is a `MethodNotFound` error naming the target and method.

use std::sync::Arc;

use super::dispatch::{compute_target, find_in_types};
use super::extensions::ExtensionRegistry;
use super::method::MethodRegistry;
use super::registry::{BuiltInRegistry, NATIVE_COLLECTION, PARSE_COLLECTION};
use super::types::{BuiltInFn, CallTarget, MacroFn, NativeFn, WrapperType};
use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::value::Value;

/// Outcome of resolving a method name.
#[derive(Clone)]
pub enum MethodDescriptor {
    Library(NativeFn),
    Alias {
        target: String,
        resolved: Box<MethodDescriptor>,
    },
    FormatParser(NativeFn),
    NativeDeferral {
        native: String,
        func: NativeFn,
    },
    Macro(MacroFn),
}

impl MethodDescriptor {
    /// Name of the tier that produced this descriptor.
    pub fn tier(&self) -> &'static str {
        match self {
            MethodDescriptor::Library(_) => "library",
            MethodDescriptor::Alias { .. } => "alias",
            MethodDescriptor::FormatParser(_) => "format_parser",
            MethodDescriptor::NativeDeferral { .. } => "native_deferral",
            MethodDescriptor::Macro(_) => "macro",
        }
    }

    pub fn implementation(&self) -> BuiltInFn {
        match self {
            MethodDescriptor::Library(f)
            | MethodDescriptor::FormatParser(f)
            | MethodDescriptor::NativeDeferral { func: f, .. } => BuiltInFn::Native(*f),
            MethodDescriptor::Alias { resolved, .. } => resolved.implementation(),
            MethodDescriptor::Macro(m) => BuiltInFn::Macro(m.clone()),
        }
    }

    pub fn invoke(&self, args: Vec<Value>) -> Result<Value, UnderscoreError> {
        self.implementation().call(args)
    }
}

impl std::fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MethodDescriptor::Alias { target, resolved } => {
                write!(f, "Alias({} -> {:?})", target, resolved)
            }
            MethodDescriptor::NativeDeferral { native, .. } => write!(f, "NativeDeferral({})", native),
            other => write!(f, "{}", other.tier()),
        }
    }
}

/// Resolves method names using the library, the tables and the macros.
#[derive(Clone)]
pub struct MethodResolver {
    builtins: Arc<BuiltInRegistry>,
    tables: Arc<MethodRegistry>,
    extensions: Arc<ExtensionRegistry>,
}

impl MethodResolver {
    pub fn new(
        builtins: Arc<BuiltInRegistry>,
        tables: Arc<MethodRegistry>,
        extensions: Arc<ExtensionRegistry>,
    ) -> Self {
        MethodResolver {
            builtins,
            tables,
            extensions,
        }
    }

    pub fn tables(&self) -> &MethodRegistry {
        &self.tables
    }

    pub fn extensions(&self) -> &Arc<ExtensionRegistry> {
        &self.extensions
    }

    pub fn resolve(&self, target: CallTarget, method: &str) -> Result<MethodDescriptor, UnderscoreError> {
        self.resolve_at_depth(target, method, 0)
            .ok_or_else(|| UnderscoreError::method_not_found(target.name(), method))
    }

    fn resolve_at_depth(&self, target: CallTarget, method: &str, depth: usize) -> Option<MethodDescriptor> {
        if let CallTarget::Typed(wrapper) = target {
            if let Some(f) = self.builtins.library_method(wrapper, method) {
                tracing::trace!(wrapper = %target, method, "resolved from library");
                return Some(MethodDescriptor::Library(f));
            }
        }

        if let Some(alias) = self.tables.alias_of(method) {
            if depth < self.tables.max_alias_depth() {
                tracing::trace!(wrapper = %target, method, alias, "following alias");
                return self
                    .resolve_at_depth(target, alias, depth + 1)
                    .map(|resolved| MethodDescriptor::Alias {
                        target: alias.to_string(),
                        resolved: Box::new(resolved),
                    });
            }
            tracing::trace!(wrapper = %target, method, depth, "alias chain too deep");
            return None;
        }

        if let Some(f) = self.builtins.get_method(PARSE_COLLECTION, method) {
            tracing::trace!(wrapper = %target, method, "resolved from format parsers");
            return Some(MethodDescriptor::FormatParser(f));
        }

        if let Some(native) = self.tables.native_deferral(target, method, &self.builtins) {
            if let Some(func) = self.builtins.get_method(NATIVE_COLLECTION, &native) {
                tracing::trace!(wrapper = %target, method, native = %native, "deferred to native");
                return Some(MethodDescriptor::NativeDeferral { native, func });
            }
        }

        if let Some(m) = self.extensions.lookup(target, method) {
            tracing::trace!(wrapper = %target, method, "resolved from macros");
            return Some(MethodDescriptor::Macro(m));
        }

        None
    }

    /// First concrete type whose library defines `method`.
    pub fn find_in_types(&self, method: &str) -> Option<WrapperType> {
        find_in_types(&self.builtins, method)
    }

    /// Static call: pick the effective target, resolve, invoke.
    pub fn call(&self, target: CallTarget, method: &str, args: Vec<Value>) -> Result<Value, UnderscoreError> {
        let effective = compute_target(&self.builtins, target, method, &args)?;
        self.resolve(effective, method)?.invoke(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::plugin::config::Options;

    fn resolver(options: &Options) -> MethodResolver {
        MethodResolver::new(
            BuiltInRegistry::core(),
            Arc::new(MethodRegistry::new(options)),
            Arc::new(ExtensionRegistry::new()),
        )
    }

    #[test]
    fn test_tier_order() {
        let r = resolver(&Options::defaults());
        let lists = CallTarget::Typed(WrapperType::Lists);
        assert_eq!(r.resolve(lists, "filter").unwrap().tier(), "library");
        assert_eq!(r.resolve(lists, "select").unwrap().tier(), "alias");
        assert_eq!(r.resolve(lists, "toJSON").unwrap().tier(), "format_parser");
        assert_eq!(r.resolve(lists, "sum").unwrap().tier(), "native_deferral");
        assert!(r.resolve(lists, "nope").is_err());
    }

    #[test]
    fn test_library_beats_alias() {
        // `first` is an alias target and also defined by Lists: the alias table is never consulted.
        let options = Options::defaults().with_alias("first", "last");
        let r = resolver(&options);
        assert_eq!(
            r.resolve(WrapperType::Lists.into(), "first").unwrap().tier(),
            "library"
        );
    }

    #[test]
    fn test_alias_cycles_end_in_not_found() {
        let options = Options::new().with_alias("ping", "pong").with_alias("pong", "ping");
        let r = resolver(&options);
        match r.resolve(WrapperType::Lists.into(), "ping") {
            Err(UnderscoreError::MethodNotFound { target, method }) => {
                assert_eq!(target, "Lists");
                assert_eq!(method, "ping");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_macro_is_last_tier() {
        let r = resolver(&Options::defaults());
        r.extensions()
            .register(WrapperType::Lists.into(), "toJSON", |_| Ok(Value::from("macro")));
        r.extensions()
            .register(WrapperType::Lists.into(), "shout", |_| Ok(Value::from("macro")));
        assert_eq!(r.resolve(WrapperType::Lists.into(), "toJSON").unwrap().tier(), "format_parser");
        assert_eq!(r.resolve(WrapperType::Lists.into(), "shout").unwrap().tier(), "macro");
    }
}
