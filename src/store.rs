//! Store façade tying the layers together.

use crate::error::{Result, StoreError};
use crate::model::write_path;
use crate::path::{read_at, Path};
use crate::subscriptions::{
    Change, ChangeEvent, ChangeKind, SubscriptionHandle, SubscriptionManager, UpdateHook,
};
use crate::surrogates::{capture, ensure_surrogate, Resolved, SurrogateCache, SurrogateRef};
use crate::types::{same_option, Kind, Value};
use std::rc::Rc;
use tracing::debug;

/// Store creation options.
#[derive(Default)]
pub struct StoreOptions {
    /// Hook invoked once per qualifying change, regardless of
    /// subscriptions.
    pub on_update: Option<UpdateHook>,
}

/// Internal state shared between the façade, the registry, and every
/// surrogate (which hold it weakly).
pub(crate) struct StoreShared {
    pub(crate) subscriptions: Rc<SubscriptionManager>,
    pub(crate) surrogates: SurrogateCache,
}

/// The change-tracking store.
///
/// Wraps a root model in identity-stable observing surrogates, keeps a
/// revision counter per path, and notifies subscribers synchronously —
/// on the mutating caller's stack — when the value at a path actually
/// changes.
pub struct Store {
    root: Value,
    wrapped: SurrogateRef,
    shared: Rc<StoreShared>,
}

impl Store {
    /// Create a store over `model`. Scalar and null roots are rejected.
    pub fn create(model: Value) -> Result<Self> {
        Self::with_options(model, StoreOptions::default())
    }

    /// Create a store with options. Performs a full recursive capture of
    /// the model before wrapping it.
    pub fn with_options(model: Value, options: StoreOptions) -> Result<Self> {
        if model.kind() == Kind::Scalar {
            return Err(StoreError::InvalidRoot);
        }
        let shared = Rc::new(StoreShared {
            subscriptions: Rc::new(SubscriptionManager::with_hook(options.on_update)),
            surrogates: SurrogateCache::new(),
        });
        capture(&shared, &model, &Path::root());
        let wrapped =
            ensure_surrogate(&shared, &model, &Path::root()).ok_or(StoreError::InvalidRoot)?;
        debug!(kind = ?model.kind(), "store created");
        Ok(Self {
            root: model,
            wrapped,
            shared,
        })
    }

    /// The wrapped root.
    pub fn root(&self) -> &SurrogateRef {
        &self.wrapped
    }

    /// The raw, unwrapped root model.
    pub fn original(&self) -> &Value {
        &self.root
    }

    /// Subscribe at `path`; fires for changes at or below it.
    pub fn subscribe<P, F>(&self, path: P, callback: F) -> SubscriptionHandle
    where
        P: Into<Path>,
        F: Fn(&ChangeEvent) + 'static,
    {
        self.shared
            .subscriptions
            .subscribe(&path.into(), false, callback)
    }

    /// Subscribe at `path`; fires only for changes exactly at it.
    pub fn subscribe_exact<P, F>(&self, path: P, callback: F) -> SubscriptionHandle
    where
        P: Into<Path>,
        F: Fn(&ChangeEvent) + 'static,
    {
        self.shared
            .subscriptions
            .subscribe(&path.into(), true, callback)
    }

    /// Read the value at `path` through the wrapped root, so traversal
    /// lazily wraps everything it passes. Missing paths and
    /// non-traversable intermediates read as `None`.
    pub fn get_value<P: Into<Path>>(&self, path: P) -> Result<Option<Value>> {
        let path = path.into();
        let segments = path.segments();
        let mut node = self.wrapped.clone();
        for (depth, segment) in segments.iter().enumerate() {
            match node.get(segment)? {
                None => return Ok(None),
                Some(Resolved::Leaf(value)) => {
                    return Ok(if depth + 1 == segments.len() {
                        Some(value)
                    } else {
                        None
                    });
                }
                Some(Resolved::Node(child)) => node = child,
            }
        }
        node.raw().map(Some)
    }

    /// The surrogate at `path`, when the path resolves to a structured
    /// value.
    pub fn surrogate_at<P: Into<Path>>(&self, path: P) -> Result<Option<SurrogateRef>> {
        let path = path.into();
        let mut node = self.wrapped.clone();
        for segment in path.segments() {
            match node.get(segment)? {
                Some(Resolved::Node(child)) => node = child,
                _ => return Ok(None),
            }
        }
        Ok(Some(node))
    }

    /// Write `value` at `path` and return it. A root model with a path
    /// mutator is written through its mutator decorator; any other root
    /// is written directly and observed the same way. The root path is
    /// rejected.
    pub fn set_value<P: Into<Path>>(&self, path: P, value: Value) -> Result<Value> {
        let path = path.into();
        if path.is_root() {
            return Err(StoreError::EmptyPath);
        }
        if let Value::Model(model) = &self.root {
            if let Some(mutator) = self.shared.surrogates.mutator_of(model) {
                return mutator.apply(&self.shared, path.segments(), value, None);
            }
        }
        let previous = read_at(&self.root, path.segments());
        let result = write_path(&self.root, path.segments(), value)?;
        let next = read_at(&self.root, path.segments());
        if !same_option(&previous, &next) {
            if let Some(next) = &next {
                capture(&self.shared, next, &path);
            }
            self.shared
                .subscriptions
                .emit(Change::new(ChangeKind::Set, path, next, previous));
        }
        Ok(result)
    }

    /// Revision counter for `path`; 0 if it never changed.
    pub fn get_revision<P: Into<Path>>(&self, path: P) -> u64 {
        self.shared.subscriptions.revision(&path.into().key())
    }

    /// Pass-through to the original model's `assign`.
    pub fn assign(&self, patch: Value) -> Result<()> {
        match &self.root {
            Value::Model(model) => {
                model.assign(patch);
                Ok(())
            }
            _ => Err(StoreError::Unsupported("assign")),
        }
    }

    /// Pass-through to the original model's `is_valid`.
    pub fn is_valid(&self, scope: Option<&str>) -> Result<bool> {
        match &self.root {
            Value::Model(model) => Ok(model.is_valid(scope)),
            _ => Err(StoreError::Unsupported("is_valid")),
        }
    }

    /// Total registered subscriber entries.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscriptions.subscriber_count()
    }
}
