//! Value classification and static call targeting.

use super::registry::BuiltInRegistry;
use super::types::{CallTarget, WrapperType};
use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::operations::type_conversion::get_type;
use crate::runner::ds::value::Value;

/// Order in which concrete types are searched for a method.
pub const FIND_ORDER: [WrapperType; 5] = [
    WrapperType::Lists,
    WrapperType::Functions,
    WrapperType::Numbers,
    WrapperType::Structs,
    WrapperType::Strings,
];

/// Pick the wrapper family responsible for `value`.
///
/// `Null` lands on `Strings`, matching the empty-string default subject.
/// Booleans and resources belong to no family.
pub fn classify(value: &Value) -> Result<WrapperType, UnderscoreError> {
    match value {
        Value::String(_) | Value::Null => Ok(WrapperType::Strings),
        Value::Number(_) => Ok(WrapperType::Numbers),
        Value::Array(_) | Value::Map(_) => Ok(WrapperType::Lists),
        Value::Function(_) => Ok(WrapperType::Functions),
        Value::Object(_) => Ok(WrapperType::Structs),
        Value::Bool(_) | Value::Resource(_) => {
            Err(UnderscoreError::Classification(get_type(value).to_string()))
        }
    }
}

/// First type in [`FIND_ORDER`] whose library defines `method`.
pub fn find_in_types(builtins: &BuiltInRegistry, method: &str) -> Option<WrapperType> {
    FIND_ORDER
        .iter()
        .find(|t| builtins.library_method(**t, method).is_some())
        .copied()
}

/// Work out which type a static call should run against.
///
/// Calls on a concrete type stay there. Calls on the generic entry point use
/// the type of the first argument. Without arguments the owning type is
/// searched for, falling back to the generic target.
pub fn compute_target(
    builtins: &BuiltInRegistry,
    target: CallTarget,
    method: &str,
    args: &[Value],
) -> Result<CallTarget, UnderscoreError> {
    if let CallTarget::Typed(_) = target {
        return Ok(target);
    }
    match args.first() {
        Some(first) => Ok(classify(first)?.into()),
        None => Ok(find_in_types(builtins, method)
            .map(CallTarget::Typed)
            .unwrap_or(target)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::map::ValueMap;
    use crate::runner::ds::value::{Callable, ResourceHandle};

    #[test]
    fn test_classify() {
        assert_eq!(classify(&Value::from("foo")).unwrap(), WrapperType::Strings);
        assert_eq!(classify(&Value::Null).unwrap(), WrapperType::Strings);
        assert_eq!(classify(&Value::from(1.5)).unwrap(), WrapperType::Numbers);
        assert_eq!(classify(&Value::Map(ValueMap::new())).unwrap(), WrapperType::Lists);
        assert_eq!(classify(&Value::Object(ValueMap::new())).unwrap(), WrapperType::Structs);
        assert_eq!(
            classify(&Value::Function(Callable::new(|_| Ok(Value::Null)))).unwrap(),
            WrapperType::Functions
        );
    }

    #[test]
    fn test_classify_rejects_resources() {
        let handle = Value::Resource(ResourceHandle::new("stream", 3));
        match classify(&handle) {
            Err(UnderscoreError::Classification(t)) => assert_eq!(t, "resource"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_generic_target_follows_first_argument() {
        let builtins = BuiltInRegistry::core();
        let args = vec![Value::Array(vec![Value::from(1)])];
        assert_eq!(
            compute_target(&builtins, CallTarget::Generic, "pluck", &args).unwrap(),
            CallTarget::Typed(WrapperType::Lists)
        );
        assert_eq!(
            compute_target(&builtins, CallTarget::Generic, "range", &[Value::from(5)]).unwrap(),
            CallTarget::Typed(WrapperType::Numbers)
        );
        assert_eq!(
            compute_target(&builtins, CallTarget::Generic, "upper", &args).unwrap(),
            CallTarget::Typed(WrapperType::Lists)
        );
        assert_eq!(
            compute_target(&builtins, CallTarget::Generic, "range", &[]).unwrap(),
            CallTarget::Typed(WrapperType::Lists)
        );
        assert_eq!(
            compute_target(&builtins, CallTarget::Generic, "nope", &[]).unwrap(),
            CallTarget::Generic
        );
        assert_eq!(
            compute_target(&builtins, WrapperType::Strings.into(), "range", &[]).unwrap(),
            CallTarget::Typed(WrapperType::Strings)
        );
    }
}
