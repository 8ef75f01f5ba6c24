//! The fluent wrapper.
//!
//! A [`Repository`] owns one subject. Chained calls classify the subject
//! again on every step, so a chain may move from `Strings` to `Lists` and back
//! as the subject changes shape.

use std::fmt;

use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::operations::path::{get_path, resolve_default, set_path};
use crate::runner::ds::operations::type_conversion::{to_boolean, to_string};
use crate::runner::ds::value::Value;
use crate::runner::plugin::dispatch::classify;
use crate::runner::plugin::resolver::MethodResolver;
use crate::runner::plugin::types::WrapperType;

/// What a chained call did with its result.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The result replaced the subject.
    Chained,
    /// A breaker ran: the raw result, subject untouched.
    Broken(Value),
}

impl Outcome {
    pub fn is_broken(&self) -> bool {
        matches!(self, Outcome::Broken(_))
    }

    pub fn into_broken(self) -> Option<Value> {
        match self {
            Outcome::Broken(v) => Some(v),
            Outcome::Chained => None,
        }
    }
}

#[derive(Clone)]
pub struct Repository {
    wrapper: WrapperType,
    subject: Value,
    resolver: MethodResolver,
}

impl Repository {
    /// Build a wrapper. A missing or `Null` subject takes the type's default,
    /// then the type's typecaster is applied.
    pub fn new(wrapper: WrapperType, subject: Option<Value>, resolver: MethodResolver) -> Self {
        let subject = match subject {
            None | Some(Value::Null) => wrapper.default_value(),
            Some(v) => v,
        };
        let subject = wrapper.typecast(subject);
        tracing::debug!(wrapper = %wrapper, subject = subject.type_name(), "constructed wrapper");
        Repository {
            wrapper,
            subject,
            resolver,
        }
    }

    /// Type this wrapper was constructed as.
    pub fn wrapper_type(&self) -> WrapperType {
        self.wrapper
    }

    pub fn subject(&self) -> &Value {
        &self.subject
    }

    pub fn obtain(&self) -> Value {
        self.subject.clone()
    }

    pub fn into_inner(self) -> Value {
        self.subject
    }

    pub fn set_subject(&mut self, value: Value) -> &mut Self {
        self.subject = value;
        self
    }

    /// Loosely falsy subject: `""`, `0`, `[]`, ...
    pub fn is_empty(&self) -> bool {
        !to_boolean(&self.subject)
    }

    /// Dotted-path read. `default` is returned, or called when it is a
    /// callable, if any segment is missing.
    pub fn get(&self, key: &str, default: Value) -> Result<Value, UnderscoreError> {
        match get_path(&self.subject, key) {
            Some(v) => Ok(v.clone()),
            None => resolve_default(default),
        }
    }

    /// Dotted-path write, creating missing intermediate containers.
    pub fn set(&mut self, key: &str, value: Value) -> Result<&mut Self, UnderscoreError> {
        set_path(&mut self.subject, key, value)?;
        Ok(self)
    }

    /// Run `method` on the subject.
    ///
    /// The subject is prepended to `args` unless the method is subjectless.
    /// Breakers hand back their result and leave the subject alone, every
    /// other method replaces the subject with its result.
    pub fn call(&mut self, method: &str, mut args: Vec<Value>) -> Result<Outcome, UnderscoreError> {
        let wrapper = classify(&self.subject)?;
        let tables = self.resolver.tables();
        if tables.is_unchainable(wrapper, method) {
            return Err(UnderscoreError::non_chainable(wrapper.name(), method));
        }
        if !tables.is_subjectless(method) {
            args.insert(0, self.subject.clone());
        }
        let breaker = tables.is_breaker(method);

        let result = self.resolver.call(wrapper.into(), method, args)?;
        if breaker {
            return Ok(Outcome::Broken(result));
        }
        self.subject = result;
        Ok(Outcome::Chained)
    }

    /// [`call`](Self::call) for fluent use. A breaker's result is dropped.
    pub fn chain(&mut self, method: &str, args: Vec<Value>) -> Result<&mut Self, UnderscoreError> {
        self.call(method, args)?;
        Ok(self)
    }

    /// Run `method` and return its value: the raw result of a breaker, the
    /// new subject otherwise.
    pub fn value(&mut self, method: &str, args: Vec<Value>) -> Result<Value, UnderscoreError> {
        match self.call(method, args)? {
            Outcome::Broken(v) => Ok(v),
            Outcome::Chained => Ok(self.obtain()),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_string(&self.subject))
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("wrapper", &self.wrapper)
            .field("subject", &self.subject)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::api::Underscore;

    fn numbers(values: &[i64]) -> Value {
        Value::Array(values.iter().map(|v| Value::from(*v)).collect())
    }

    #[test]
    fn test_breaker_leaves_subject() {
        let mut list = Underscore::new().of(WrapperType::Lists).from(numbers(&[1, 2, 3]));
        let outcome = list.call("sum", vec![]).unwrap();
        assert_eq!(outcome, Outcome::Broken(Value::from(6)));
        assert_eq!(list.obtain(), numbers(&[1, 2, 3]));
    }

    #[test]
    fn test_failed_call_keeps_last_good_state() {
        let mut list = Underscore::new().of(WrapperType::Lists).from(numbers(&[1, 2]));
        assert!(list.call("nope", vec![]).is_err());
        assert_eq!(list.obtain(), numbers(&[1, 2]));
    }

    #[test]
    fn test_default_and_typecast() {
        let u = Underscore::new();
        assert_eq!(u.of(WrapperType::Numbers).create().obtain(), Value::from(0));
        assert_eq!(
            u.of(WrapperType::Lists).from("foo").obtain(),
            Value::Array(vec![Value::from("foo")])
        );
        assert!(u.of(WrapperType::Strings).create().is_empty());
    }
}
