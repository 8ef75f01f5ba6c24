//! Method dispatch machinery.
//!
//! A call reaches an implementation in three steps:
//!
//! ```text
//! 1. Target    the wrapper type, from the call site or by classifying a value
//! 2. Resolve   walk the tiers of [`MethodResolver`] for (target, method)
//! 3. Invoke    hand the positional arguments to the resolved implementation
//! ```
//!
//! ### Key Components
//!
//! - **[`BuiltInRegistry`]**: method collections of the library, built once
//! - **[`MethodRegistry`]**: subjectless, breaker, unchainable, alias and native-deferral tables
//! - **[`ExtensionRegistry`]**: user macros, namespaced per wrapper type
//! - **[`MethodResolver`]**: the tiered lookup tying the three together
//!
//! ## Example: Resolving a Method
//!
//! ```
//! use std::sync::Arc;
//! use underscore::runner::plugin::{
//!     BuiltInRegistry, ExtensionRegistry, MethodRegistry, MethodResolver, Options, WrapperType,
//! };
//! use underscore::runner::ds::value::Value;
//!
//! let resolver = MethodResolver::new(
//!     BuiltInRegistry::core(),
//!     Arc::new(MethodRegistry::new(&Options::defaults())),
//!     Arc::new(ExtensionRegistry::new()),
//! );
//!
//! let words = Value::Array(vec![Value::from("a"), Value::from("b")]);
//! let joined = resolver
//!     .call(WrapperType::Lists.into(), "implode", vec![words, Value::from("-")])
//!     .unwrap();
//! assert_eq!(joined, Value::from("a-b"));
//! ```

pub mod config;
pub mod dispatch;
pub mod extensions;
pub mod method;
pub mod registry;
pub mod resolver;
pub mod types;

pub use config::Options;
pub use dispatch::classify;
pub use extensions::ExtensionRegistry;
pub use method::MethodRegistry;
pub use registry::BuiltInRegistry;
pub use resolver::{MethodDescriptor, MethodResolver};
pub use types::{BuiltInFn, CallTarget, MacroFn, MethodCollection, NativeFn, WrapperType};
