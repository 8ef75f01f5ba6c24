//! `Structs` methods.

use crate::runner::ds::arguments::Arguments;
use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::map::ValueMap;
use crate::runner::ds::operations::path::get_path;
use crate::runner::ds::operations::type_conversion::{to_object, to_string};
use crate::runner::ds::value::Value;
use crate::runner::plugin::registry::{BuiltInRegistry, COLLECTION_COLLECTION};
use crate::runner::plugin::types::MethodCollection;

pub fn register(registry: &mut BuiltInRegistry) {
    let structs = MethodCollection::new("Structs")
        .with_parent(COLLECTION_COLLECTION)
        .add_method("methods", structs_methods)
        .add_method("unpack", structs_unpack);

    registry.register_collection(structs);
}

/// Names of the fields holding callables.
fn structs_methods(args: Arguments) -> Result<Value, UnderscoreError> {
    let names = match args.value(0) {
        Value::Object(fields) | Value::Map(fields) => fields
            .iter()
            .filter(|(_, v)| v.as_callable().is_some())
            .map(|(k, _)| Value::from(k.as_str()))
            .collect(),
        _ => Vec::new(),
    };
    Ok(Value::Array(names))
}

/// Pull a nested struct up: the named attribute, or the first field.
fn structs_unpack(args: Arguments) -> Result<Value, UnderscoreError> {
    let object = args.value(0);
    let inner = match args.get(1) {
        Some(attribute) => get_path(&object, &to_string(attribute)).cloned(),
        None => object.into_values().into_iter().next(),
    };
    Ok(match inner {
        Some(v) => to_object(v),
        None => Value::Object(ValueMap::new()),
    })
}
