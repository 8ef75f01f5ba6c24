//! # underscore - fluent utility wrappers with tiered method dispatch
//!
//! Values are wrapped by type (`Strings`, `Numbers`, `Lists`, `Structs`,
//! `Functions`) and methods are looked up by name at call time:
//! - Classification of a value into its wrapper type
//! - Tiered resolution: library, alias, format parser, native primitive, macro
//! - Fluent chains that replace the subject, or break out with a raw result
//! - Per-type macros registered at runtime
//!
//! ## Quick Start
//!
//! ### Static calls
//!
//! ```
//! use underscore::args;
//! use underscore::runner::api::Underscore;
//! use underscore::runner::ds::value::Value;
//! use underscore::runner::plugin::WrapperType;
//!
//! let u = Underscore::new();
//! let sequence = u.of(WrapperType::Lists).call("range", args![3]).unwrap();
//! assert_eq!(sequence, Value::Array(args![1, 2, 3]));
//!
//! // The generic entry point picks the type from the first argument.
//! let joined = u.call("implode", args![args!["a", "b"], ","]).unwrap();
//! assert_eq!(joined, Value::from("a,b"));
//! ```
//!
//! ### Chained calls
//!
//! ```
//! use underscore::args;
//! use underscore::runner::api::Underscore;
//! use underscore::runner::ds::value::Value;
//! use underscore::runner::plugin::WrapperType;
//!
//! let u = Underscore::new();
//! let mut title = u.of(WrapperType::Strings).from("FOO.BAR");
//! title
//!     .chain("lower", args![])?
//!     .chain("explode", args!["."])?
//!     .chain("last", args![])?
//!     .chain("title", args![])?;
//! assert_eq!(title.obtain(), Value::from("Bar"));
//! # Ok::<(), underscore::runner::ds::error::UnderscoreError>(())
//! ```
//!
//! ### Macros
//!
//! ```
//! use underscore::args;
//! use underscore::runner::api::Underscore;
//! use underscore::runner::ds::value::Value;
//! use underscore::runner::plugin::WrapperType;
//!
//! let u = Underscore::new();
//! let strings = u.of(WrapperType::Strings);
//! strings.extend("shout", |args| Ok(Value::from(format!("{}!", args[0]))));
//!
//! let mut greeting = strings.from("hey");
//! greeting.chain("shout", args![])?;
//! assert_eq!(greeting.obtain(), Value::from("hey!"));
//! # Ok::<(), underscore::runner::ds::error::UnderscoreError>(())
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - PEG grammars for the options file and XML input
//! - **[`runner`]** - dispatch runtime
//!   - **[`runner::plugin`]** - classification, method tables and the resolver
//!   - **[`runner::ds`]** - values, errors and path operations
//!   - **[`runner::std_lib`]** - method collections of every wrapper type
//!   - **[`runner::repository`]** - the fluent wrapper

#[macro_use]
extern crate lazy_static;

pub mod parser;
pub mod runner;

pub use runner::api::{Underscore, WrapperOf};
pub use runner::ds::error::UnderscoreError;
pub use runner::ds::value::Value;
pub use runner::plugin::WrapperType;
pub use runner::repository::{Outcome, Repository};
