//! Built-in registry holding the library method collections.

use std::collections::HashMap;
use std::sync::Arc;

use super::types::{MethodCollection, NativeFn, WrapperType};
use crate::runner::std_lib::register_core_builtins;

/// Collection holding the cross-type format parsers.
pub const PARSE_COLLECTION: &str = "Parse";

/// Collection holding host primitives reachable through native deferral.
pub const NATIVE_COLLECTION: &str = "Native";

/// Collection shared by `Lists` and `Structs`.
pub const COLLECTION_COLLECTION: &str = "Collection";

lazy_static! {
    static ref CORE_REGISTRY: Arc<BuiltInRegistry> = Arc::new(BuiltInRegistry::with_core());
}

/// Registry of method collections. Read-only once built.
pub struct BuiltInRegistry {
    collections: HashMap<String, MethodCollection>,
}

impl BuiltInRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        BuiltInRegistry {
            collections: HashMap::new(),
        }
    }

    /// Create a registry with every library collection.
    pub fn with_core() -> Self {
        let mut registry = Self::new();
        register_core_builtins(&mut registry);
        registry
    }

    /// The process-wide core registry, built on first use.
    pub fn core() -> Arc<BuiltInRegistry> {
        CORE_REGISTRY.clone()
    }

    pub fn register_collection(&mut self, collection: MethodCollection) {
        self.collections.insert(collection.name.clone(), collection);
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Look a method up in a collection, then along its parent chain.
    pub fn get_method(&self, collection: &str, method: &str) -> Option<NativeFn> {
        let mut current = self.collections.get(collection);
        while let Some(c) = current {
            if let Some(f) = c.methods.get(method) {
                return Some(*f);
            }
            current = c.parent.as_ref().and_then(|p| self.collections.get(p));
        }
        None
    }

    pub fn has_method(&self, collection: &str, method: &str) -> bool {
        self.get_method(collection, method).is_some()
    }

    /// Method from the dedicated collection of a wrapper type.
    pub fn library_method(&self, wrapper: WrapperType, method: &str) -> Option<NativeFn> {
        self.get_method(wrapper.name(), method)
    }
}

impl Default for BuiltInRegistry {
    fn default() -> Self {
        Self::with_core()
    }
}
