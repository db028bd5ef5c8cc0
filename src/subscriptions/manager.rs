//! Subscription registry: per-path subscriber buckets, per-path revision
//! counters, and the leaf-to-root emission walk.

use crate::path::Path;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::trace;

use super::types::{Change, ChangeEvent, SubscriberId, SubscriptionHandle};

/// Store-wide hook invoked once per qualifying change, regardless of
/// subscriptions.
pub type UpdateHook = Box<dyn Fn(&Change)>;

type Callback = Rc<dyn Fn(&ChangeEvent)>;

struct SubscriberEntry {
    id: SubscriberId,
    exact: bool,
    callback: Callback,
}

/// Owns subscriber buckets and revision counters for one store.
///
/// Everything here is single-threaded state; emission runs on the
/// mutator's call stack and no internal borrow is held while a callback
/// runs, so callbacks may mutate the graph, subscribe, or unsubscribe
/// reentrantly.
pub struct SubscriptionManager {
    buckets: RefCell<HashMap<String, Vec<SubscriberEntry>>>,
    revisions: RefCell<HashMap<String, u64>>,
    next_id: Cell<u64>,
    on_update: Option<UpdateHook>,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::with_hook(None)
    }

    pub fn with_hook(on_update: Option<UpdateHook>) -> Self {
        Self {
            buckets: RefCell::new(HashMap::new()),
            revisions: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
            on_update,
        }
    }

    /// Register a subscriber at `path`. An `exact` subscriber only fires
    /// when the changed key equals its own key; otherwise it fires for
    /// changes at or below the path.
    pub fn subscribe(
        self: &Rc<Self>,
        path: &Path,
        exact: bool,
        callback: impl Fn(&ChangeEvent) + 'static,
    ) -> SubscriptionHandle {
        let id = SubscriberId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let key = path.key();
        self.buckets
            .borrow_mut()
            .entry(key.clone())
            .or_default()
            .push(SubscriberEntry {
                id,
                exact,
                callback: Rc::new(callback),
            });
        trace!(key = %key, id = id.0, exact, "subscribed");
        SubscriptionHandle {
            id,
            key,
            manager: Rc::downgrade(self),
        }
    }

    /// Remove one subscriber entry, pruning its bucket when emptied.
    /// Unknown entries are ignored.
    pub fn unsubscribe(&self, key: &str, id: SubscriberId) {
        let mut buckets = self.buckets.borrow_mut();
        if let Some(entries) = buckets.get_mut(key) {
            entries.retain(|entry| entry.id != id);
            if entries.is_empty() {
                buckets.remove(key);
            }
            trace!(key = %key, id = id.0, "unsubscribed");
        }
    }

    /// Current revision for a key; 0 if it never changed.
    pub fn revision(&self, key: &str) -> u64 {
        self.revisions.borrow().get(key).copied().unwrap_or(0)
    }

    /// Total registered subscriber entries.
    pub fn subscriber_count(&self) -> usize {
        self.buckets.borrow().values().map(Vec::len).sum()
    }

    /// Fan a change out to subscribers.
    ///
    /// Invokes the global hook first, then walks ancestor keys leaf to
    /// root, visiting each key at most once even when prefixes collapse
    /// to the same key. Every visited key gets its revision bumped;
    /// matching subscribers receive the event extended with the observer
    /// key and its post-bump revision.
    pub fn emit(&self, change: Change) {
        trace!(key = %change.key, kind = ?change.kind, "change");
        if let Some(hook) = &self.on_update {
            hook(&change);
        }

        let mut visited = HashSet::new();
        for ancestor_key in change.path.ancestor_keys() {
            if !visited.insert(ancestor_key.clone()) {
                continue;
            }
            let revision = self.bump_revision(&ancestor_key);
            let listeners: Vec<(SubscriberId, bool, Callback)> =
                match self.buckets.borrow().get(&ancestor_key) {
                    Some(entries) => entries
                        .iter()
                        .map(|entry| (entry.id, entry.exact, Rc::clone(&entry.callback)))
                        .collect(),
                    None => continue,
                };
            for (id, exact, callback) in listeners {
                if exact && ancestor_key != change.key {
                    continue;
                }
                // A callback earlier in this walk may have unsubscribed
                // this entry.
                let live = self
                    .buckets
                    .borrow()
                    .get(&ancestor_key)
                    .map_or(false, |entries| entries.iter().any(|entry| entry.id == id));
                if live {
                    callback(&ChangeEvent::deliver(&change, &ancestor_key, revision));
                }
            }
        }
    }

    fn bump_revision(&self, key: &str) -> u64 {
        let mut revisions = self.revisions.borrow_mut();
        let counter = revisions.entry(key.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriptions::ChangeKind;
    use crate::types::Value;

    fn set_change(path: &str) -> Change {
        Change::new(
            ChangeKind::Set,
            Path::parse(path),
            Some(Value::from(1i64)),
            None,
        )
    }

    fn counter() -> (Rc<Cell<u64>>, impl Fn(&ChangeEvent) + 'static) {
        let count = Rc::new(Cell::new(0));
        let shared = Rc::clone(&count);
        (count, move |_event: &ChangeEvent| {
            shared.set(shared.get() + 1)
        })
    }

    #[test]
    fn test_subscribe_unsubscribe() {
        let manager = Rc::new(SubscriptionManager::new());
        let (count, callback) = counter();

        let handle = manager.subscribe(&Path::parse("a"), false, callback);
        assert_eq!(manager.subscriber_count(), 1);

        manager.emit(set_change("a.b"));
        assert_eq!(count.get(), 1);

        handle.unsubscribe();
        assert_eq!(manager.subscriber_count(), 0);

        manager.emit(set_change("a.b"));
        assert_eq!(count.get(), 1);

        // Repeated unsubscribe is a no-op.
        handle.unsubscribe();
    }

    #[test]
    fn test_exact_restricts_to_changed_key() {
        let manager = Rc::new(SubscriptionManager::new());
        let (exact_count, exact_callback) = counter();
        let (loose_count, loose_callback) = counter();

        manager.subscribe(&Path::parse("profile"), true, exact_callback);
        manager.subscribe(&Path::parse("profile"), false, loose_callback);

        manager.emit(set_change("profile.bio"));
        assert_eq!(exact_count.get(), 0);
        assert_eq!(loose_count.get(), 1);

        manager.emit(set_change("profile"));
        assert_eq!(exact_count.get(), 1);
        assert_eq!(loose_count.get(), 2);
    }

    #[test]
    fn test_revisions_bump_per_ancestor() {
        let manager = Rc::new(SubscriptionManager::new());

        manager.emit(set_change("a.b.c"));
        assert_eq!(manager.revision("a.b.c"), 1);
        assert_eq!(manager.revision("a.b"), 1);
        assert_eq!(manager.revision("a"), 1);
        assert_eq!(manager.revision(""), 1);
        assert_eq!(manager.revision("a.b.c.d"), 0);

        // Sibling changes never bump an ancestor that does not contain
        // them.
        manager.emit(set_change("x"));
        assert_eq!(manager.revision("a"), 1);
        assert_eq!(manager.revision("x"), 1);
        assert_eq!(manager.revision(""), 2);
    }

    #[test]
    fn test_collapsing_prefixes_visit_once() {
        let manager = Rc::new(SubscriptionManager::new());
        let (count, callback) = counter();
        manager.subscribe(&Path::root(), false, callback);

        // The path [""] has two prefixes whose keys both collapse to "".
        manager.emit(Change::new(
            ChangeKind::Set,
            Path::from_segments([""]),
            Some(Value::Bool(true)),
            None,
        ));
        assert_eq!(count.get(), 1);
        assert_eq!(manager.revision(""), 1);
    }

    #[test]
    fn test_hook_fires_without_subscribers() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let manager = Rc::new(SubscriptionManager::with_hook(Some(Box::new(
            move |change: &Change| sink.borrow_mut().push(change.key.clone()),
        ))));

        manager.emit(set_change("a.b"));
        assert_eq!(*seen.borrow(), ["a.b"]);
    }

    #[test]
    fn test_unsubscribed_mid_emission_is_skipped() {
        let manager = Rc::new(SubscriptionManager::new());
        let (count, callback) = counter();

        // First subscriber unsubscribes the second before it is visited.
        let second = Rc::new(RefCell::new(None::<SubscriptionHandle>));
        let second_slot = Rc::clone(&second);
        manager.subscribe(&Path::parse("a"), false, move |_event| {
            if let Some(handle) = second_slot.borrow().as_ref() {
                handle.unsubscribe();
            }
        });
        let handle = manager.subscribe(&Path::parse("a"), false, callback);
        *second.borrow_mut() = Some(handle);

        manager.emit(set_change("a"));
        assert_eq!(count.get(), 0);
    }
}
