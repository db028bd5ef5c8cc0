//! Sequence surrogates.

use crate::error::{Result, StoreError};
use crate::path::Path;
use crate::store::StoreShared;
use crate::subscriptions::{Change, ChangeKind};
use crate::types::{SeqRef, Value};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::{Rc, Weak};

use super::capture::{capture, resolve};
use super::Resolved;

/// Observing wrapper around a sequence.
///
/// Element access and assignment behave like the other surrogate kinds.
/// The fixed set of mutating operations — `push`, `pop`, `insert`,
/// `remove`, `swap`, `reverse`, `truncate`, `splice` — each run the real
/// operation, re-capture the sequence's full contents at the sequence's
/// own path, and emit a single `Mutate` event for that path.
pub struct SeqSurrogate {
    shared: Weak<StoreShared>,
    target: Weak<RefCell<Vec<Value>>>,
    path: Path,
}

impl SeqSurrogate {
    pub(crate) fn new(
        shared: Weak<StoreShared>,
        target: Weak<RefCell<Vec<Value>>>,
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

    fn target(&self) -> Result<SeqRef> {
        self.target.upgrade().ok_or(StoreError::DetachedTarget)
    }

    /// Path this sequence was first captured at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Escape hatch: the unwrapped sequence.
    pub fn raw(&self) -> Result<Value> {
        Ok(Value::Sequence(self.target()?))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.target()?.borrow().len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.target()?.borrow().is_empty())
    }

    /// Resolve one element, lazily wrapping structured children.
    pub fn get(&self, index: usize) -> Result<Option<Resolved>> {
        let shared = self.shared()?;
        let value = { self.target()?.borrow().get(index).cloned() };
        Ok(value.map(|value| resolve(&shared, value, &self.path.child(index.to_string()))))
    }

    /// Element assignment: emits `Set` at the element's path when the
    /// value differs. `index == len` appends; past the end errors.
    pub fn set(&self, index: usize, value: Value) -> Result<()> {
        let shared = self.shared()?;
        let target = self.target()?;
        let previous = {
            let mut items = target.borrow_mut();
            let len = items.len();
            match index.cmp(&len) {
                Ordering::Less => Some(std::mem::replace(&mut items[index], value.clone())),
                Ordering::Equal => {
                    items.push(value.clone());
                    None
                }
                Ordering::Greater => return Err(StoreError::IndexOutOfBounds { index, len }),
            }
        };
        let changed = previous
            .as_ref()
            .map_or(true, |previous| !previous.same_as(&value));
        if changed {
            let path = self.path.child(index.to_string());
            capture(&shared, &value, &path);
            shared
                .subscriptions
                .emit(Change::new(ChangeKind::Set, path, Some(value), previous));
        }
        Ok(())
    }

    /// Remove the element at `index`, shifting the tail, and emit
    /// `Delete` at the element's path. Past-the-end indices are a
    /// successful no-op.
    pub fn delete(&self, index: usize) -> Result<Option<Value>> {
        let shared = self.shared()?;
        let target = self.target()?;
        let previous = {
            let mut items = target.borrow_mut();
            if index < items.len() {
                Some(items.remove(index))
            } else {
                None
            }
        };
        if let Some(previous) = previous.clone() {
            shared.subscriptions.emit(Change::new(
                ChangeKind::Delete,
                self.path.child(index.to_string()),
                None,
                Some(previous),
            ));
        }
        Ok(previous)
    }

    // --- Mutating operations ---
    //
    // Each emits exactly one `Mutate` event after the real operation
    // runs, even when the operation was a semantic no-op. An operation
    // that fails validation emits nothing.

    pub fn push(&self, value: Value) -> Result<()> {
        self.mutated(move |items| {
            items.push(value);
            Ok(())
        })
    }

    pub fn pop(&self) -> Result<Option<Value>> {
        self.mutated(|items| Ok(items.pop()))
    }

    pub fn insert(&self, index: usize, value: Value) -> Result<()> {
        self.mutated(move |items| {
            let len = items.len();
            if index > len {
                return Err(StoreError::IndexOutOfBounds { index, len });
            }
            items.insert(index, value);
            Ok(())
        })
    }

    pub fn remove(&self, index: usize) -> Result<Value> {
        self.mutated(move |items| {
            let len = items.len();
            if index >= len {
                return Err(StoreError::IndexOutOfBounds { index, len });
            }
            Ok(items.remove(index))
        })
    }

    pub fn swap(&self, a: usize, b: usize) -> Result<()> {
        self.mutated(move |items| {
            let len = items.len();
            let furthest = a.max(b);
            if furthest >= len {
                return Err(StoreError::IndexOutOfBounds {
                    index: furthest,
                    len,
                });
            }
            items.swap(a, b);
            Ok(())
        })
    }

    pub fn reverse(&self) -> Result<()> {
        self.mutated(|items| {
            items.reverse();
            Ok(())
        })
    }

    pub fn truncate(&self, len: usize) -> Result<()> {
        self.mutated(move |items| {
            items.truncate(len);
            Ok(())
        })
    }

    /// Splice-like resize: remove `delete_count` elements at `start`
    /// (both clamped to the current length) and insert `values` in their
    /// place. Returns the removed elements.
    pub fn splice(
        &self,
        start: usize,
        delete_count: usize,
        values: Vec<Value>,
    ) -> Result<Vec<Value>> {
        self.mutated(move |items| {
            let start = start.min(items.len());
            let end = (start + delete_count).min(items.len());
            Ok(items.splice(start..end, values).collect())
        })
    }

    fn mutated<R>(&self, operation: impl FnOnce(&mut Vec<Value>) -> Result<R>) -> Result<R> {
        let shared = self.shared()?;
        let target = self.target()?;
        let result = {
            let mut items = target.borrow_mut();
            operation(&mut items)?
        };
        capture(&shared, &Value::Sequence(Rc::clone(&target)), &self.path);
        shared.subscriptions.emit(Change::new(
            ChangeKind::Mutate,
            self.path.clone(),
            Some(Value::Sequence(target)),
            None,
        ));
        Ok(result)
    }
}
