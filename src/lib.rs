//! # Vantage
//!
//! A fine-grained change-tracking store for nested data graphs.
//!
//! ## Core Concepts
//!
//! - **Values**: a shared-handle graph of scalars, mappings, sequences,
//!   and typed models
//! - **Surrogates**: identity-stable observing wrappers with an explicit
//!   `get`/`set`/`delete` discipline and a `raw()` escape hatch
//! - **Paths**: dot-keyed locations in the graph; every change is
//!   addressed by one
//! - **Revisions**: per-path monotonic counters, bumped on every change
//!   at or below the path
//! - **Subscriptions**: synchronous leaf-to-root notification, exact or
//!   subtree-scoped
//!
//! ## Example
//!
//! ```ignore
//! use vantage::{Store, Value};
//! use serde_json::json;
//!
//! let store = Store::create(Value::from_json(json!({
//!     "profile": { "firstName": "Ada", "lastName": "Lovelace" }
//! })))?;
//!
//! let handle = store.subscribe("profile.firstName", |event| {
//!     println!("{} -> {:?} (rev {})", event.observer_key, event.value, event.revision);
//! });
//!
//! store.set_value("profile.firstName", Value::from("Grace"))?;
//! assert_eq!(store.get_revision("profile.firstName"), 1);
//! handle.unsubscribe();
//! ```

pub mod error;
pub mod model;
pub mod path;
pub mod store;
pub mod subscriptions;
pub mod surrogates;
pub mod types;

// Re-exports
pub use error::{Result, StoreError};
pub use model::{write_path, Model, ModelRef};
pub use path::{read_at, Path, ROOT_KEY};
pub use store::{Store, StoreOptions};
pub use subscriptions::{
    Change, ChangeEvent, ChangeKind, SubscriberId, SubscriptionHandle, SubscriptionManager,
    UpdateHook,
};
pub use surrogates::{MapSurrogate, ModelSurrogate, Resolved, SeqSurrogate, SurrogateRef};
pub use types::{Kind, MapRef, ObjectId, SeqRef, Value};
