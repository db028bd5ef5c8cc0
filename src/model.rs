//! The model contract: typed sub-models nested in the tracked graph.
//!
//! The model/validation layer is an external collaborator. The store only
//! needs the surface below: a domain `assign`/`is_valid` pair, key-level
//! field access, and (usually) a path-addressed mutator. Everything else
//! about a model is opaque.

use crate::error::{Result, StoreError};
use crate::types::{Kind, Value};
use std::cmp::Ordering;
use std::rc::Rc;

/// A typed sub-model.
///
/// Models participate in change tracking as `Kind::Model` when they
/// expose a path mutator. Without one they are plain-mapping candidates:
/// key-level interception still works and still emits, but no mutator
/// decorator is installed.
pub trait Model {
    /// Apply a (possibly nested) patch to this model.
    fn assign(&self, patch: Value);

    /// Validate this model, optionally scoped to one field.
    fn is_valid(&self, scope: Option<&str>) -> bool;

    /// Whether [`Model::set_value_at_path`] is usable on this model.
    fn has_path_mutator(&self) -> bool {
        true
    }

    /// Write `value` at `segments`, optionally into an explicit foreign
    /// `target` instead of this model (domain operations that recursively
    /// descend pass the inner object here).
    ///
    /// The default implementation descends through existing structured
    /// children and creates intermediate mappings where the path runs off
    /// the data.
    fn set_value_at_path(
        &self,
        segments: &[String],
        value: Value,
        target: Option<&Value>,
    ) -> Result<Value> {
        if let Some(foreign) = target {
            return write_path(foreign, segments, value);
        }
        let Some((head, rest)) = segments.split_first() else {
            return Err(StoreError::EmptyPath);
        };
        if rest.is_empty() {
            self.set(head, value.clone());
            return Ok(value);
        }
        let child = match self.get(head) {
            Some(existing) if existing.kind() != Kind::Scalar => existing,
            _ => {
                let fresh = Value::mapping();
                self.set(head, fresh.clone());
                fresh
            }
        };
        write_path(&child, rest, value)
    }

    /// Declared field layout, if any. Capture uses this to reach fields
    /// that exist structurally but were never assigned through the store.
    fn schema_fields(&self) -> Option<Vec<String>> {
        None
    }

    /// Current value of a field.
    fn get(&self, key: &str) -> Option<Value>;

    /// Write a field. Returns false when the model rejects the write.
    fn set(&self, key: &str, value: Value) -> bool;

    /// Remove a field, returning its previous value.
    fn remove(&self, key: &str) -> Option<Value>;

    /// Currently present field names.
    fn keys(&self) -> Vec<String>;
}

/// Shared handle to a model.
pub type ModelRef = Rc<dyn Model>;

/// Write `value` at `segments` below `target`, creating intermediate
/// mappings where the path runs off the data. Returns the written value.
pub fn write_path(target: &Value, segments: &[String], value: Value) -> Result<Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Err(StoreError::EmptyPath);
    };
    if rest.is_empty() {
        write_key(target, head, value.clone())?;
        return Ok(value);
    }
    let child = ensure_child(target, head)?;
    write_path(&child, rest, value)
}

fn write_key(target: &Value, key: &str, value: Value) -> Result<()> {
    match target {
        Value::Mapping(entries) => {
            entries.borrow_mut().insert(key.to_string(), value);
            Ok(())
        }
        Value::Sequence(items) => {
            let index: usize = key
                .parse()
                .map_err(|_| StoreError::InvalidIndex(key.to_string()))?;
            let mut items = items.borrow_mut();
            let len = items.len();
            match index.cmp(&len) {
                Ordering::Less => {
                    items[index] = value;
                    Ok(())
                }
                Ordering::Equal => {
                    items.push(value);
                    Ok(())
                }
                Ordering::Greater => Err(StoreError::IndexOutOfBounds { index, len }),
            }
        }
        Value::Model(model) => {
            let _ = model.set(key, value);
            Ok(())
        }
        _ => Err(StoreError::Unsupported("write into a scalar")),
    }
}

fn ensure_child(target: &Value, key: &str) -> Result<Value> {
    let current = match target {
        Value::Mapping(entries) => entries.borrow().get(key).cloned(),
        Value::Sequence(items) => key
            .parse::<usize>()
            .ok()
            .and_then(|index| items.borrow().get(index).cloned()),
        Value::Model(model) => model.get(key),
        _ => return Err(StoreError::Unsupported("write into a scalar")),
    };
    match current {
        Some(existing) if existing.kind() != Kind::Scalar => Ok(existing),
        _ => {
            let fresh = Value::mapping();
            write_key(target, key, fresh.clone())?;
            Ok(fresh)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{read_at, Path};
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    struct FieldModel {
        fields: RefCell<BTreeMap<String, Value>>,
    }

    impl FieldModel {
        fn new() -> Self {
            Self {
                fields: RefCell::new(BTreeMap::new()),
            }
        }
    }

    impl Model for FieldModel {
        fn assign(&self, _patch: Value) {}

        fn is_valid(&self, _scope: Option<&str>) -> bool {
            true
        }

        fn get(&self, key: &str) -> Option<Value> {
            self.fields.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, value: Value) -> bool {
            self.fields.borrow_mut().insert(key.to_string(), value);
            true
        }

        fn remove(&self, key: &str) -> Option<Value> {
            self.fields.borrow_mut().remove(key)
        }

        fn keys(&self) -> Vec<String> {
            self.fields.borrow().keys().cloned().collect()
        }
    }

    fn segments(path: &str) -> Vec<String> {
        Path::parse(path).segments().to_vec()
    }

    #[test]
    fn test_write_path_creates_intermediates() {
        let root = Value::from_json(json!({}));
        write_path(&root, &segments("a.b.c"), Value::from(1i64)).unwrap();
        assert_eq!(
            read_at(&root, &segments("a.b.c")),
            Some(Value::Int(1))
        );
    }

    #[test]
    fn test_write_path_replaces_scalar_intermediates() {
        let root = Value::from_json(json!({"a": "scalar"}));
        write_path(&root, &segments("a.b"), Value::from(2i64)).unwrap();
        assert_eq!(read_at(&root, &segments("a.b")), Some(Value::Int(2)));
    }

    #[test]
    fn test_write_path_indexes_sequences() {
        let root = Value::from_json(json!({"items": ["a", "b"]}));
        write_path(&root, &segments("items.1"), Value::from("x")).unwrap();
        assert_eq!(
            read_at(&root, &segments("items")),
            Some(Value::from_json(json!(["a", "x"])))
        );

        // Appending at len is allowed; past the end is not.
        write_path(&root, &segments("items.2"), Value::from("y")).unwrap();
        assert!(write_path(&root, &segments("items.9"), Value::from("z")).is_err());
        assert!(write_path(&root, &segments("items.nope"), Value::from("z")).is_err());
    }

    #[test]
    fn test_write_path_rejects_empty_and_scalar_targets() {
        let root = Value::from_json(json!({}));
        assert!(write_path(&root, &[], Value::Null).is_err());
        assert!(write_path(&Value::from(1i64), &segments("a"), Value::Null).is_err());
    }

    #[test]
    fn test_default_mutator_descends_self() {
        let model = FieldModel::new();
        model
            .set_value_at_path(&segments("nested.field"), Value::from("deep"), None)
            .unwrap();
        let nested = model.get("nested").unwrap();
        assert_eq!(
            read_at(&nested, &segments("field")),
            Some(Value::from("deep"))
        );
    }

    #[test]
    fn test_default_mutator_writes_foreign_target() {
        let model = FieldModel::new();
        let foreign = Value::mapping();
        model
            .set_value_at_path(&segments("field"), Value::from("external"), Some(&foreign))
            .unwrap();
        assert_eq!(
            read_at(&foreign, &segments("field")),
            Some(Value::from("external"))
        );
        // The model itself was not written.
        assert!(model.get("field").is_none());
    }
}
