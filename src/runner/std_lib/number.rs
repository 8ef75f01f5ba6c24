//! `Numbers` methods.

use super::native::{pad_string, PadSide};
use crate::runner::ds::arguments::Arguments;
use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::value::Value;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::MethodCollection;

pub fn register(registry: &mut BuiltInRegistry) {
    let numbers = MethodCollection::new("Numbers")
        .add_method("padding", numbers_padding)
        .add_method("paddingLeft", numbers_padding_left)
        .add_method("paddingRight", numbers_padding_right);

    registry.register_collection(numbers);
}

fn pad_with_zeros(args: &Arguments, side: PadSide) -> Value {
    let length = args.int_or(1, 1).max(0) as usize;
    Value::String(pad_string(&to_string(&args.value(0)), length, "0", side))
}

fn numbers_padding(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(pad_with_zeros(&args, PadSide::Both))
}

fn numbers_padding_left(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(pad_with_zeros(&args, PadSide::Left))
}

fn numbers_padding_right(args: Arguments) -> Result<Value, UnderscoreError> {
    Ok(pad_with_zeros(&args, PadSide::Right))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(f: fn(Arguments) -> Result<Value, UnderscoreError>) -> Value {
        f(Arguments::new(vec![Value::from(5), Value::from(3)])).unwrap()
    }

    #[test]
    fn test_padding() {
        assert_eq!(pad(numbers_padding), Value::from("050"));
        assert_eq!(pad(numbers_padding_left), Value::from("005"));
        assert_eq!(pad(numbers_padding_right), Value::from("500"));
    }
}
