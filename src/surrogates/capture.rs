//! Recursive capture: kind dispatch and surrogate creation.

use crate::path::Path;
use crate::store::StoreShared;
use crate::types::{Kind, Value};
use std::rc::Rc;

use super::{Resolved, SurrogateRef};

/// Ensure a surrogate exists for a structured value observed at `path`.
/// Returns `None` for scalars. The arenas are identity-stable: repeated
/// calls for the same target return the same surrogate, and the first
/// path wins.
pub(crate) fn ensure_surrogate(
    shared: &Rc<StoreShared>,
    value: &Value,
    path: &Path,
) -> Option<SurrogateRef> {
    match value {
        Value::Sequence(target) => Some(SurrogateRef::Sequence(
            shared.surrogates.sequence(shared, target, path),
        )),
        Value::Mapping(target) => Some(SurrogateRef::Mapping(
            shared.surrogates.mapping(shared, target, path),
        )),
        Value::Model(target) => Some(SurrogateRef::Model(
            shared.surrogates.model(shared, target, path),
        )),
        _ => None,
    }
}

/// Wrap a child value read at `path`: scalars come back as leaves,
/// structured values as their (cached) surrogates.
pub(crate) fn resolve(shared: &Rc<StoreShared>, value: Value, path: &Path) -> Resolved {
    match ensure_surrogate(shared, &value, path) {
        Some(node) => Resolved::Node(node),
        None => Resolved::Leaf(value),
    }
}

/// Recursively capture `value` and its reachable substructure at `path`.
///
/// Dispatches on structural kind in priority order: sequences first, then
/// models with a path mutator, then mappings (a model without a mutator
/// is a plain-mapping candidate), then scalars. Model instrumentation
/// happens here, at most once per instance.
pub(crate) fn capture(shared: &Rc<StoreShared>, value: &Value, path: &Path) {
    match value.kind() {
        Kind::Sequence => {
            let Value::Sequence(target) = value else { return };
            shared.surrogates.sequence(shared, target, path);
            let items: Vec<Value> = target.borrow().clone();
            for (index, item) in items.iter().enumerate() {
                capture(shared, item, &path.child(index.to_string()));
            }
        }
        Kind::Model => {
            let Value::Model(target) = value else { return };
            shared.surrogates.model(shared, target, path);
            shared.surrogates.instrument(target, path);
            // Declared fields are reachable even if never assigned
            // through the store; models without a layout are opaque
            // beyond their mutator.
            if let Some(fields) = target.schema_fields() {
                for field in fields {
                    if let Some(current) = target.get(&field) {
                        capture(shared, &current, &path.child(field));
                    }
                }
            }
        }
        Kind::Mapping => match value {
            Value::Mapping(target) => {
                shared.surrogates.mapping(shared, target, path);
                let entries: Vec<(String, Value)> = target
                    .borrow()
                    .iter()
                    .map(|(key, child)| (key.clone(), child.clone()))
                    .collect();
                for (key, child) in entries {
                    capture(shared, &child, &path.child(key));
                }
            }
            // A model without a path mutator: no decorator, recursion
            // over its own keys.
            Value::Model(target) => {
                shared.surrogates.model(shared, target, path);
                for key in target.keys() {
                    if let Some(current) = target.get(&key) {
                        capture(shared, &current, &path.child(key));
                    }
                }
            }
            _ => {}
        },
        Kind::Scalar => {}
    }
}
