//! Core value model for the tracked graph.

use crate::model::{Model, ModelRef};
use serde::{Serialize, Serializer};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a sequence of values.
pub type SeqRef = Rc<RefCell<Vec<Value>>>;

/// Shared handle to a plain mapping.
pub type MapRef = Rc<RefCell<BTreeMap<String, Value>>>;

/// A value in the tracked graph.
///
/// Scalars are plain data, compared by value. Structured values are
/// shared handles: cloning a `Value` clones the handle, not the contents,
/// and change detection compares identity, never deep equality.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(SeqRef),
    Mapping(MapRef),
    Model(ModelRef),
}

/// Structural kind of a value.
///
/// Computed once per value by capability probing and matched exhaustively
/// wherever the interception strategy depends on it. A model without a
/// path mutator probes as `Mapping` (a plain-mapping candidate).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Sequence,
    Model,
    Mapping,
    Scalar,
}

/// Stable identity token for a structured value: the address of its
/// shared allocation. Keys the surrogate arenas.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

impl ObjectId {
    pub fn of_sequence(target: &SeqRef) -> Self {
        ObjectId(Rc::as_ptr(target) as usize)
    }

    pub fn of_mapping(target: &MapRef) -> Self {
        ObjectId(Rc::as_ptr(target) as usize)
    }

    pub fn of_model(target: &ModelRef) -> Self {
        ObjectId(Rc::as_ptr(target) as *const () as usize)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({:#x})", self.0)
    }
}

impl Value {
    /// A fresh empty mapping.
    pub fn mapping() -> Value {
        Value::Mapping(Rc::new(RefCell::new(BTreeMap::new())))
    }

    /// A fresh empty sequence.
    pub fn sequence() -> Value {
        Value::Sequence(Rc::new(RefCell::new(Vec::new())))
    }

    /// Wrap a model implementation into a value.
    pub fn model<M: Model + 'static>(model: M) -> Value {
        Value::Model(Rc::new(model))
    }

    /// Structural kind, probed from capabilities.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Sequence(_) => Kind::Sequence,
            Value::Model(model) if model.has_path_mutator() => Kind::Model,
            Value::Model(_) | Value::Mapping(_) => Kind::Mapping,
            _ => Kind::Scalar,
        }
    }

    /// Identity token for structured values; `None` for scalars.
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Value::Sequence(target) => Some(ObjectId::of_sequence(target)),
            Value::Mapping(target) => Some(ObjectId::of_mapping(target)),
            Value::Model(target) => Some(ObjectId::of_model(target)),
            _ => None,
        }
    }

    /// Change-detection equality: scalar equality for primitives (floats
    /// bitwise, so NaN equals NaN and `0.0` differs from `-0.0`),
    /// identity for structured values.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => Rc::ptr_eq(a, b),
            (Value::Mapping(a), Value::Mapping(b)) => Rc::ptr_eq(a, b),
            (Value::Model(a), Value::Model(b)) => {
                ObjectId::of_model(a) == ObjectId::of_model(b)
            }
            _ => false,
        }
    }

    /// Build a value graph from JSON. Objects become mappings, arrays
    /// become sequences; each structured node gets its own allocation.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Bool(flag),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(int) => Value::Int(int),
                None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(text) => Value::String(text),
            serde_json::Value::Array(items) => Value::Sequence(Rc::new(RefCell::new(
                items.into_iter().map(Value::from_json).collect(),
            ))),
            serde_json::Value::Object(entries) => Value::Mapping(Rc::new(RefCell::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from_json(value)))
                    .collect(),
            ))),
        }
    }

    /// Snapshot this graph as JSON. Models snapshot through their key
    /// API; non-finite floats become null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(flag) => serde_json::Value::Bool(*flag),
            Value::Int(int) => serde_json::Value::from(*int),
            Value::Float(float) => serde_json::Number::from_f64(*float)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(text) => serde_json::Value::String(text.clone()),
            Value::Sequence(items) => {
                serde_json::Value::Array(items.borrow().iter().map(Value::to_json).collect())
            }
            Value::Mapping(entries) => serde_json::Value::Object(
                entries
                    .borrow()
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Value::Model(model) => serde_json::Value::Object(
                model
                    .keys()
                    .into_iter()
                    .filter_map(|key| model.get(&key).map(|value| (key, value.to_json())))
                    .collect(),
            ),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(int) => Some(*int),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(float) => Some(*float),
            Value::Int(int) => Some(*int as f64),
            _ => None,
        }
    }
}

/// Equality over optional values, treating absence as distinct from
/// `Null`.
pub(crate) fn same_option(a: &Option<Value>, b: &Option<Value>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_as(b),
        _ => false,
    }
}

/// Structural equality, for assertions and comparisons; change detection
/// uses [`Value::same_as`] instead. Models still compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Sequence(a), Value::Sequence(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Mapping(a), Value::Mapping(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            _ => self.same_as(other),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(flag) => write!(f, "Bool({flag})"),
            Value::Int(int) => write!(f, "Int({int})"),
            Value::Float(float) => write!(f, "Float({float})"),
            Value::String(text) => write!(f, "String({text:?})"),
            Value::Sequence(items) => match items.try_borrow() {
                Ok(items) => f.debug_list().entries(items.iter()).finish(),
                Err(_) => f.write_str("Sequence(<borrowed>)"),
            },
            Value::Mapping(entries) => match entries.try_borrow() {
                Ok(entries) => f.debug_map().entries(entries.iter()).finish(),
                Err(_) => f.write_str("Mapping(<borrowed>)"),
            },
            Value::Model(model) => write!(f, "Model({:?})", ObjectId::of_model(model)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(int: i64) -> Self {
        Value::Int(int)
    }
}

impl From<f64> for Value {
    fn from(float: f64) -> Self {
        Value::Float(float)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(text)
    }
}
