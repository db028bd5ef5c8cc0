//! Interception layer: observing surrogates over the data graph.
//!
//! A surrogate is an identity-stable wrapper around one structured value
//! (mapping, sequence, or typed model). Rust has no transparent property
//! interception, so the layer is an explicit accessor/mutator discipline:
//! traversal goes through `get`, writes through `set`/`delete` and the
//! sequence mutators, and `raw()` is the escape hatch back to the
//! unwrapped target. Every write is compared against the previous value
//! and, when different, triggers recursive re-capture of the new value's
//! substructure followed by synchronous emission.
//!
//! Exactly one surrogate exists per target for the lifetime of the store;
//! the arenas in [`cache`] hold them, keyed by target identity, without
//! owning the targets.

mod cache;
mod capture;
mod mapping;
mod model;
mod sequence;

pub(crate) use cache::SurrogateCache;
pub(crate) use capture::{capture, ensure_surrogate};

pub use mapping::MapSurrogate;
pub use model::ModelSurrogate;
pub use sequence::SeqSurrogate;

use crate::error::{Result, StoreError};
use crate::path::Path;
use crate::types::{Kind, Value};
use std::rc::Rc;

/// A wrapped structured value.
#[derive(Clone)]
pub enum SurrogateRef {
    Mapping(Rc<MapSurrogate>),
    Sequence(Rc<SeqSurrogate>),
    Model(Rc<ModelSurrogate>),
}

/// Result of resolving one key through a surrogate: structured children
/// come back wrapped, scalars as plain values.
#[derive(Clone)]
pub enum Resolved {
    Leaf(Value),
    Node(SurrogateRef),
}

impl Resolved {
    /// The underlying value, unwrapped.
    pub fn value(&self) -> Result<Value> {
        match self {
            Resolved::Leaf(value) => Ok(value.clone()),
            Resolved::Node(node) => node.raw(),
        }
    }

    pub fn node(&self) -> Option<&SurrogateRef> {
        match self {
            Resolved::Node(node) => Some(node),
            Resolved::Leaf(_) => None,
        }
    }
}

impl SurrogateRef {
    /// Structural kind of the wrapped target.
    pub fn kind(&self) -> Kind {
        match self {
            SurrogateRef::Mapping(_) => Kind::Mapping,
            SurrogateRef::Sequence(_) => Kind::Sequence,
            SurrogateRef::Model(surrogate) => surrogate.kind(),
        }
    }

    /// Path this surrogate was first captured at.
    pub fn path(&self) -> &Path {
        match self {
            SurrogateRef::Mapping(surrogate) => surrogate.path(),
            SurrogateRef::Sequence(surrogate) => surrogate.path(),
            SurrogateRef::Model(surrogate) => surrogate.path(),
        }
    }

    /// Escape hatch: the unwrapped target, bypassing all tracking.
    pub fn raw(&self) -> Result<Value> {
        match self {
            SurrogateRef::Mapping(surrogate) => surrogate.raw(),
            SurrogateRef::Sequence(surrogate) => surrogate.raw(),
            SurrogateRef::Model(surrogate) => surrogate.raw(),
        }
    }

    /// Resolve `segment`. Sequence surrogates expect a decimal index;
    /// anything else reads as absent.
    pub fn get(&self, segment: &str) -> Result<Option<Resolved>> {
        match self {
            SurrogateRef::Mapping(surrogate) => surrogate.get(segment),
            SurrogateRef::Model(surrogate) => surrogate.get(segment),
            SurrogateRef::Sequence(surrogate) => match segment.parse::<usize>() {
                Ok(index) => surrogate.get(index),
                Err(_) => Ok(None),
            },
        }
    }

    /// Write `segment`. Sequences require a decimal index.
    pub fn set(&self, segment: &str, value: Value) -> Result<()> {
        match self {
            SurrogateRef::Mapping(surrogate) => surrogate.set(segment, value),
            SurrogateRef::Model(surrogate) => surrogate.set(segment, value),
            SurrogateRef::Sequence(surrogate) => {
                let index = segment
                    .parse::<usize>()
                    .map_err(|_| StoreError::InvalidIndex(segment.to_string()))?;
                surrogate.set(index, value)
            }
        }
    }

    /// Delete `segment`; absent keys are a successful no-op.
    pub fn delete(&self, segment: &str) -> Result<Option<Value>> {
        match self {
            SurrogateRef::Mapping(surrogate) => surrogate.delete(segment),
            SurrogateRef::Model(surrogate) => surrogate.delete(segment),
            SurrogateRef::Sequence(surrogate) => match segment.parse::<usize>() {
                Ok(index) => surrogate.delete(index),
                Err(_) => Ok(None),
            },
        }
    }

    pub fn as_mapping(&self) -> Option<&Rc<MapSurrogate>> {
        match self {
            SurrogateRef::Mapping(surrogate) => Some(surrogate),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Rc<SeqSurrogate>> {
        match self {
            SurrogateRef::Sequence(surrogate) => Some(surrogate),
            _ => None,
        }
    }

    pub fn as_model(&self) -> Option<&Rc<ModelSurrogate>> {
        match self {
            SurrogateRef::Model(surrogate) => Some(surrogate),
            _ => None,
        }
    }
}
