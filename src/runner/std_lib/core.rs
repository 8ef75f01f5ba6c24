//! Core library registration.

use crate::runner::plugin::registry::BuiltInRegistry;

use super::arrays;
use super::collection;
use super::functions;
use super::native;
use super::number;
use super::object;
use super::parse;
use super::strings;

/// Register every method collection with the registry.
pub fn register_core_builtins(registry: &mut BuiltInRegistry) {
    // Lists and Structs resolve missing names through Collection.
    collection::register(registry);
    arrays::register(registry);
    object::register(registry);
    strings::register(registry);
    number::register(registry);
    functions::register(registry);
    parse::register(registry);
    native::register(registry);
}
