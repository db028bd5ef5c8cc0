//! Mapping surrogates.

use crate::error::{Result, StoreError};
use crate::path::Path;
use crate::store::StoreShared;
use crate::subscriptions::{Change, ChangeKind};
use crate::types::{MapRef, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::capture::{capture, resolve};
use super::Resolved;

/// Observing wrapper around a plain mapping.
pub struct MapSurrogate {
    shared: Weak<StoreShared>,
    target: Weak<RefCell<BTreeMap<String, Value>>>,
    path: Path,
}

impl MapSurrogate {
    pub(crate) fn new(
        shared: Weak<StoreShared>,
        target: Weak<RefCell<BTreeMap<String, Value>>>,
        path: Path,
    ) -> Self {
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

    fn target(&self) -> Result<MapRef> {
        self.target.upgrade().ok_or(StoreError::DetachedTarget)
    }

    /// Path this mapping was first captured at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Escape hatch: the unwrapped mapping.
    pub fn raw(&self) -> Result<Value> {
        Ok(Value::Mapping(self.target()?))
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.target()?.borrow().keys().cloned().collect())
    }

    pub fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.target()?.borrow().contains_key(key))
    }

    /// Resolve one key, lazily wrapping structured children.
    pub fn get(&self, key: &str) -> Result<Option<Resolved>> {
        let shared = self.shared()?;
        let value = { self.target()?.borrow().get(key).cloned() };
        Ok(value.map(|value| resolve(&shared, value, &self.path.child(key))))
    }

    /// Write one key. When the new value differs from the previous one
    /// (scalar equality for primitives, identity for structured values),
    /// its substructure is captured and a `Set` event is emitted.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let shared = self.shared()?;
        let previous = {
            self.target()?
                .borrow_mut()
                .insert(key.to_string(), value.clone())
        };
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

    /// Remove one key, emitting a `Delete` event carrying the previous
    /// value. Removing an absent key is a successful no-op.
    pub fn delete(&self, key: &str) -> Result<Option<Value>> {
        let shared = self.shared()?;
        let previous = { self.target()?.borrow_mut().remove(key) };
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
}
