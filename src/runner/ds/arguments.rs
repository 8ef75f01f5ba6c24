use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::operations::type_conversion::{
    expect_string, get_type, to_boolean, to_f64, to_i64,
};
use crate::runner::ds::value::{Callable, Value};

/// Positional arguments handed to a library method.
///
/// Missing trailing arguments read as `Null`, which lets every method apply
/// its own defaults without caring how many values the caller passed.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Arguments { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Present and not `Null`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).filter(|v| !v.is_null())
    }

    pub fn value(&self, index: usize) -> Value {
        self.values.get(index).cloned().unwrap_or(Value::Null)
    }

    /// Move the argument out, leaving `Null` behind.
    pub fn take(&mut self, index: usize) -> Value {
        match self.values.get_mut(index) {
            Some(v) => std::mem::take(v),
            None => Value::Null,
        }
    }

    pub fn string(&self, index: usize) -> Result<String, UnderscoreError> {
        expect_string(&self.value(index), &format!("argument {}", index + 1))
    }

    pub fn opt_string(&self, index: usize) -> Result<Option<String>, UnderscoreError> {
        match self.get(index) {
            Some(_) => self.string(index).map(Some),
            None => Ok(None),
        }
    }

    pub fn int(&self, index: usize) -> i64 {
        to_i64(&self.value(index))
    }

    pub fn int_or(&self, index: usize, default: i64) -> i64 {
        self.opt_int(index).unwrap_or(default)
    }

    pub fn opt_int(&self, index: usize) -> Option<i64> {
        self.get(index).map(to_i64)
    }

    pub fn float(&self, index: usize) -> f64 {
        to_f64(&self.value(index))
    }

    pub fn bool_or(&self, index: usize, default: bool) -> bool {
        self.get(index).map(to_boolean).unwrap_or(default)
    }

    pub fn callable(&self, index: usize) -> Result<Callable, UnderscoreError> {
        match self.values.get(index) {
            Some(Value::Function(f)) => Ok(f.clone()),
            Some(other) => Err(UnderscoreError::type_error(format!(
                "argument {} must be callable, {} given",
                index + 1,
                get_type(other)
            ))),
            None => Err(UnderscoreError::type_error(format!(
                "argument {} must be callable, none given",
                index + 1
            ))),
        }
    }

    pub fn opt_callable(&self, index: usize) -> Option<Callable> {
        self.values.get(index).and_then(|v| v.as_callable()).cloned()
    }

    /// Values of a collection argument. A scalar becomes a one-element list.
    pub fn list(&self, index: usize) -> Vec<Value> {
        match self.get(index) {
            Some(v) if v.is_collection() => v.clone().into_values(),
            Some(v) => vec![v.clone()],
            None => Vec::new(),
        }
    }

    /// Everything from `from` onwards.
    pub fn rest(&self, from: usize) -> Vec<Value> {
        self.values.iter().skip(from).cloned().collect()
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Arguments::new(values)
    }
}
