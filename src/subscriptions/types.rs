//! Event and subscription types for change notification.

use crate::path::Path;
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::rc::Weak;

use super::manager::SubscriptionManager;

/// What a change describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A key was written with a different value.
    Set,
    /// A key was removed.
    Delete,
    /// A sequence was modified in place through one of its mutating
    /// operations.
    Mutate,
}

/// Base form of a change, built once per mutation.
///
/// This is what the store-wide `on_update` hook receives.
#[derive(Clone, Debug, Serialize)]
pub struct Change {
    pub kind: ChangeKind,
    /// Path that changed.
    pub path: Path,
    /// Canonical key of `path`.
    pub key: String,
    /// New value (`None` for deletions).
    pub value: Option<Value>,
    /// Previous value (`None` when there was none, and for sequence
    /// mutations).
    pub previous: Option<Value>,
}

impl Change {
    pub(crate) fn new(
        kind: ChangeKind,
        path: Path,
        value: Option<Value>,
        previous: Option<Value>,
    ) -> Self {
        let key = path.key();
        Self {
            kind,
            path,
            key,
            value,
            previous,
        }
    }
}

/// A change as delivered to one subscriber.
#[derive(Clone, Debug, Serialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub path: Path,
    pub key: String,
    pub value: Option<Value>,
    pub previous: Option<Value>,
    /// Ancestor key this notification is for.
    pub observer_key: String,
    /// Post-bump revision of `observer_key`.
    pub revision: u64,
}

impl ChangeEvent {
    pub(crate) fn deliver(change: &Change, observer_key: &str, revision: u64) -> Self {
        Self {
            kind: change.kind,
            path: change.path.clone(),
            key: change.key.clone(),
            value: change.value.clone(),
            previous: change.previous.clone(),
            observer_key: observer_key.to_string(),
            revision,
        }
    }
}

/// Unique identifier for a subscriber entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

/// Handle to an active subscription.
///
/// Dropping the handle does not unsubscribe; call
/// [`SubscriptionHandle::unsubscribe`] to remove the entry.
pub struct SubscriptionHandle {
    pub(crate) id: SubscriberId,
    pub(crate) key: String,
    pub(crate) manager: Weak<SubscriptionManager>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Key of the subscribed path.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Remove this subscription. Calling it more than once is a no-op, as
    /// is calling it after the store is gone.
    pub fn unsubscribe(&self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.unsubscribe(&self.key, self.id);
        }
    }
}
