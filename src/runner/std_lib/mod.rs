//! Method libraries.
//!
//! One module per method collection: the five wrapper types, the methods
//! shared by `Lists` and `Structs`, the format parsers and the host
//! primitives reached through native deferral.

pub mod arrays;
pub mod collection;
pub mod core;
pub mod functions;
pub mod native;
pub mod number;
pub mod object;
pub mod parse;
pub mod strings;

pub use self::core::register_core_builtins;
