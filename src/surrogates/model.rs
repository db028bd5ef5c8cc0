//! Model surrogates and the mutator decorator.

use crate::error::{Result, StoreError};
use crate::model::{Model, ModelRef};
use crate::path::{read_at, Path};
use crate::store::StoreShared;
use crate::subscriptions::{Change, ChangeKind};
use crate::types::{same_option, Kind, Value};
use std::rc::{Rc, Weak};

use super::capture::{capture, resolve};
use super::Resolved;

/// Observing wrapper around a typed model.
///
/// Field access and assignment behave like mapping surrogates. The
/// model's domain operations are bound to the real target; path-addressed
/// writes route through the model's [`ModelMutator`] decorator.
pub struct ModelSurrogate {
    shared: Weak<StoreShared>,
    target: Weak<dyn Model>,
    path: Path,
}

impl ModelSurrogate {
    pub(crate) fn new(shared: Weak<StoreShared>, target: Weak<dyn Model>, path: Path) -> Self {
        Self {
            shared,
            target,
            path,
        }
    }

    pub(crate) fn is_live(&self) -> bool {
        self.target.strong_count() > 0
    }

    fn shared(&self) -> Result<Rc<StoreShared>> {
        self.shared.upgrade().ok_or(StoreError::DetachedStore)
    }

    fn target(&self) -> Result<ModelRef> {
        self.target.upgrade().ok_or(StoreError::DetachedTarget)
    }

    /// Path this model was first captured at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Kind::Model` when the target has a path mutator; otherwise the
    /// target is a plain-mapping candidate.
    pub fn kind(&self) -> Kind {
        match self.target.upgrade() {
            Some(model) if model.has_path_mutator() => Kind::Model,
            _ => Kind::Mapping,
        }
    }

    /// Escape hatch: the unwrapped model.
    pub fn raw(&self) -> Result<Value> {
        Ok(Value::Model(self.target()?))
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.target()?.keys())
    }

    /// Resolve one field, lazily wrapping structured children.
    pub fn get(&self, key: &str) -> Result<Option<Resolved>> {
        let shared = self.shared()?;
        let value = self.target()?.get(key);
        Ok(value.map(|value| resolve(&shared, value, &self.path.child(key))))
    }

    /// Write one field through the model. Emits `Set` when the model
    /// accepted the write and the value differs from the previous one.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let shared = self.shared()?;
        let model = self.target()?;
        let previous = model.get(key);
        if !model.set(key, value.clone()) {
            // The model rejected the write; nothing changed.
            return Ok(());
        }
        let changed = previous
            .as_ref()
            .map_or(true, |previous| !previous.same_as(&value));
        if changed {
            let path = self.path.child(key);
            capture(&shared, &value, &path);
            shared
                .subscriptions
                .emit(Change::new(ChangeKind::Set, path, Some(value), previous));
        }
        Ok(())
    }

    /// Remove one field, emitting a `Delete` event carrying the previous
    /// value. Removing an absent field is a successful no-op.
    pub fn delete(&self, key: &str) -> Result<Option<Value>> {
        let shared = self.shared()?;
        let previous = self.target()?.remove(key);
        if let Some(previous) = previous.clone() {
            shared.subscriptions.emit(Change::new(
                ChangeKind::Delete,
                self.path.child(key),
                None,
                Some(previous),
            ));
        }
        Ok(previous)
    }

    // --- Bound domain operations ---

    /// Pass-through to the model's `assign`.
    pub fn assign(&self, patch: Value) -> Result<()> {
        self.target()?.assign(patch);
        Ok(())
    }

    /// Pass-through to the model's `is_valid`.
    pub fn is_valid(&self, scope: Option<&str>) -> Result<bool> {
        Ok(self.target()?.is_valid(scope))
    }

    /// Path-addressed write through the model's mutator decorator.
    /// Errors when the model has no path mutator.
    pub fn set_value_at_path(
        &self,
        segments: &[String],
        value: Value,
        target: Option<&Value>,
    ) -> Result<Value> {
        let shared = self.shared()?;
        let model = self.target()?;
        let Some(mutator) = shared.surrogates.mutator_of(&model) else {
            return Err(StoreError::Unsupported("set_value_at_path"));
        };
        mutator.apply(&shared, segments, value, target)
    }
}

/// Decorator standing in for a one-time patch of a model's path mutator.
///
/// Constructed at most once per model instance, at first capture, with
/// the path the model was captured at. Path-addressed writes the store
/// tracks go through [`ModelMutator::apply`] instead of the raw mutator.
pub(crate) struct ModelMutator {
    owner: Weak<dyn Model>,
    base_path: Path,
}

impl ModelMutator {
    pub(crate) fn new(owner: Weak<dyn Model>, base_path: Path) -> Self {
        Self { owner, base_path }
    }

    pub(crate) fn is_live(&self) -> bool {
        self.owner.strong_count() > 0
    }

    /// Observe-around-delegate: read the value at `segments` before and
    /// after the raw mutator runs, and emit a `Set` at
    /// `base_path + segments` when they differ.
    ///
    /// A call with a foreign `target` (not identity-equal to the owning
    /// model) still executes but is never observed: the written path is
    /// not reachable from the tracked root.
    pub(crate) fn apply(
        &self,
        shared: &Rc<StoreShared>,
        segments: &[String],
        value: Value,
        target: Option<&Value>,
    ) -> Result<Value> {
        let owner = self.owner.upgrade().ok_or(StoreError::DetachedTarget)?;
        let owner_value = Value::Model(Rc::clone(&owner));
        let observed = match target {
            None => true,
            Some(explicit) => explicit.same_as(&owner_value),
        };
        if !observed {
            return owner.set_value_at_path(segments, value, target);
        }

        let previous = read_at(&owner_value, segments);
        let result = owner.set_value_at_path(segments, value, None)?;
        let next = read_at(&owner_value, segments);
        if !same_option(&previous, &next) {
            let path = self.base_path.join(segments);
            if let Some(next) = &next {
                capture(shared, next, &path);
            }
            shared
                .subscriptions
                .emit(Change::new(ChangeKind::Set, path, next, previous));
        }
        Ok(result)
    }
}
