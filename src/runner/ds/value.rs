use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use uuid::Uuid;

use crate::runner::ds::error::UnderscoreError;
use crate::runner::ds::map::ValueMap;
use crate::runner::ds::operations::type_conversion::{get_type, to_string};

/// A runtime value held by a wrapper or passed to a method.
///
/// `Array` and `Map` are the two shapes of a list (sequential and keyed),
/// `Object` is a struct with named fields.
pub enum Value {
    Null,
    Bool(bool),
    Number(NumberType),
    String(String),
    Array(Vec<Value>),
    Map(ValueMap),
    Object(ValueMap),
    Function(Callable),
    Resource(ResourceHandle),
}

impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(*b),
            Value::Number(n) => Value::Number(n.clone()),
            Value::String(s) => Value::String(s.to_string()),
            Value::Array(a) => Value::Array(a.clone()),
            Value::Map(m) => Value::Map(m.clone()),
            Value::Object(o) => Value::Object(o.clone()),
            Value::Function(f) => Value::Function(f.clone()),
            Value::Resource(r) => Value::Resource(r.clone()),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", to_string(self))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Value::Null"),
            Value::Bool(b) => write!(f, "Value::Bool({})", b),
            Value::Number(n) => write!(f, "Value::Number({:?})", n),
            Value::String(s) => write!(f, "Value::String({:?})", s),
            Value::Array(a) => f.debug_tuple("Value::Array").field(a).finish(),
            Value::Map(m) => f.debug_tuple("Value::Map").field(m).finish(),
            Value::Object(o) => f.debug_tuple("Value::Object").field(o).finish(),
            Value::Function(c) => write!(f, "Value::Function({})", c.id()),
            Value::Resource(r) => write!(f, "Value::Resource({})", r),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(&a.func, &b.func),
            (Value::Resource(a), Value::Resource(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Arrays and keyed maps.
    pub fn is_list(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Map(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Map(_) | Value::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Function(c) => Some(c),
            _ => None,
        }
    }

    /// Number of entries of a collection, `None` for scalars.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Array(a) => Some(a.len()),
            Value::Map(m) | Value::Object(m) => Some(m.len()),
            _ => None,
        }
    }

    /// `(key, value)` pairs of a collection in order. Array keys are integers.
    pub fn entries(&self) -> Vec<(Value, Value)> {
        match self {
            Value::Array(a) => a
                .iter()
                .enumerate()
                .map(|(i, v)| (Value::from(i as i64), v.clone()))
                .collect(),
            Value::Map(m) | Value::Object(m) => m
                .iter()
                .map(|(k, v)| (Value::String(k.to_string()), v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Values of a collection in order, discarding keys.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Value::Array(a) => a,
            Value::Map(m) | Value::Object(m) => m.into_values(),
            _ => Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        get_type(self)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum NumberType {
    Integer(i64),
    Float(f64),
}

impl NumberType {
    pub fn as_f64(&self) -> f64 {
        match self {
            NumberType::Integer(i) => *i as f64,
            NumberType::Float(f) => *f,
        }
    }

    /// Truncating conversion, saturating at the i64 bounds.
    pub fn as_i64(&self) -> i64 {
        match self {
            NumberType::Integer(i) => *i,
            NumberType::Float(f) => *f as i64,
        }
    }
}

impl PartialEq for NumberType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NumberType::Integer(a), NumberType::Integer(b)) => a == b,
            (NumberType::Float(a), NumberType::Float(b)) => a == b,
            _ => false,
        }
    }
}

impl Display for NumberType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NumberType::Integer(i) => write!(f, "{}", i),
            NumberType::Float(nf) => write!(f, "{}", nf),
        }
    }
}

pub type NativeCallable = dyn Fn(Vec<Value>) -> Result<Value, UnderscoreError> + Send + Sync;

/// An invokable value. Identity is the allocation, so clones compare equal.
#[derive(Clone)]
pub struct Callable {
    id: Uuid,
    func: Arc<NativeCallable>,
}

impl Callable {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, UnderscoreError> + Send + Sync + 'static,
    {
        Callable {
            id: Uuid::new_v4(),
            func: Arc::new(func),
        }
    }

    pub fn call(&self, args: Vec<Value>) -> Result<Value, UnderscoreError> {
        (self.func)(args)
    }

    pub fn id(&self) -> String {
        self.id.to_hyphenated().to_string()
    }
}

/// Opaque host handle (file, socket, ...). Carried around but never classified.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceHandle {
    pub kind: String,
    pub id: u64,
}

impl ResourceHandle {
    pub fn new(kind: impl Into<String>, id: u64) -> Self {
        ResourceHandle {
            kind: kind.into(),
            id,
        }
    }
}

impl Display for ResourceHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Resource id #{} of type ({})", self.id, self.kind)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(NumberType::Integer(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Number(NumberType::Integer(i as i64))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Number(NumberType::Integer(i as i64))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Number(NumberType::Float(f))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(a: Vec<Value>) -> Self {
        Value::Array(a)
    }
}

impl From<ValueMap> for Value {
    fn from(m: ValueMap) -> Self {
        Value::Map(m)
    }
}

impl From<Callable> for Value {
    fn from(c: Callable) -> Self {
        Value::Function(c)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        match o {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
