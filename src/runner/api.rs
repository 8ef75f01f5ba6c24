//! Public entry points.
//!
//! An [`Underscore`] context owns the method tables and the macro registry.
//! Every wrapper built from it shares both, so a macro registered on the
//! context is visible to all of its wrappers.

use std::sync::Arc;

use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::value::Value;
use crate::runner::plugin::config::Options;
use crate::runner::plugin::dispatch::classify;
use crate::runner::plugin::extensions::ExtensionRegistry;
use crate::runner::plugin::method::MethodRegistry;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::resolver::MethodResolver;
use crate::runner::plugin::types::{CallTarget, WrapperType};
use crate::runner::repository::Repository;

/// Build a `Vec<Value>` of call arguments.
///
/// ```
/// use underscore::args;
/// use underscore::runner::ds::value::Value;
///
/// assert_eq!(args![1, "a"], vec![Value::from(1), Value::from("a")]);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        Vec::<$crate::runner::ds::value::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        vec![$($crate::runner::ds::value::Value::from($arg)),+]
    };
}

/// The generic entry point.
#[derive(Clone)]
pub struct Underscore {
    resolver: MethodResolver,
}

impl Underscore {
    /// Context with the built-in options.
    pub fn new() -> Self {
        Self::with_options(&Options::defaults())
    }

    pub fn with_options(options: &Options) -> Self {
        Underscore {
            resolver: MethodResolver::new(
                BuiltInRegistry::core(),
                Arc::new(MethodRegistry::new(options)),
                Arc::new(ExtensionRegistry::new()),
            ),
        }
    }

    pub fn resolver(&self) -> &MethodResolver {
        &self.resolver
    }

    /// Wrap `subject` into the wrapper of its own type.
    pub fn from(&self, subject: impl Into<Value>) -> Result<Repository, UnderscoreError> {
        let subject = subject.into();
        let wrapper = classify(&subject)?;
        Ok(Repository::new(wrapper, Some(subject), self.resolver.clone()))
    }

    /// Handle on one wrapper type.
    pub fn of(&self, wrapper: WrapperType) -> WrapperOf {
        WrapperOf {
            wrapper,
            resolver: self.resolver.clone(),
        }
    }

    /// Static call on the generic entry point: the target type is picked from
    /// the arguments and the method name.
    pub fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, UnderscoreError> {
        self.resolver.call(CallTarget::Generic, method, args)
    }

    /// Register a macro on the generic entry point.
    pub fn extend<F>(&self, name: &str, closure: F)
    where
        F: Fn(Vec<Value>) -> Result<Value, UnderscoreError> + Send + Sync + 'static,
    {
        self.resolver.extensions().register(CallTarget::Generic, name, closure);
    }
}

impl Default for Underscore {
    fn default() -> Self {
        Self::new()
    }
}

/// One wrapper type bound to a context: `Lists`, `Strings`, ...
#[derive(Clone)]
pub struct WrapperOf {
    wrapper: WrapperType,
    resolver: MethodResolver,
}

impl WrapperOf {
    pub fn wrapper_type(&self) -> WrapperType {
        self.wrapper
    }

    pub fn from(&self, subject: impl Into<Value>) -> Repository {
        Repository::new(self.wrapper, Some(subject.into()), self.resolver.clone())
    }

    pub fn create(&self) -> Repository {
        Repository::new(self.wrapper, None, self.resolver.clone())
    }

    /// Static call. Arguments are passed as given, nothing is prepended.
    pub fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, UnderscoreError> {
        self.resolver.call(self.wrapper.into(), method, args)
    }

    pub fn extend<F>(&self, name: &str, closure: F)
    where
        F: Fn(Vec<Value>) -> Result<Value, UnderscoreError> + Send + Sync + 'static,
    {
        self.resolver.extensions().register(self.wrapper.into(), name, closure);
    }
}
