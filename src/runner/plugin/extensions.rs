//! User-registered macros, namespaced per wrapper type.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::types::{CallTarget, MacroFn};
use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::value::Value;

/// Mutable macro table shared by a context and every wrapper it creates.
///
/// Entries are never removed. A registration is visible to every lookup that
/// starts after `register` returns.
#[derive(Default)]
pub struct ExtensionRegistry {
    macros: Mutex<HashMap<(CallTarget, String), MacroFn>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        ExtensionRegistry {
            macros: Mutex::new(HashMap::new()),
        }
    }

    /// Store or overwrite the macro for `(target, name)`.
    pub fn register<F>(&self, target: CallTarget, name: impl Into<String>, closure: F)
    where
        F: Fn(Vec<Value>) -> Result<Value, UnderscoreError> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(wrapper = %target, method = %name, "registering macro");
        self.macros.lock().insert((target, name), Arc::new(closure));
    }

    pub fn lookup(&self, target: CallTarget, name: &str) -> Option<MacroFn> {
        self.macros.lock().get(&(target, name.to_string())).cloned()
    }

    pub fn len(&self) -> usize {
        self.macros.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
