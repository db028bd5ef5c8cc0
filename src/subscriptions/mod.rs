//! Subscription and emission registry.
//!
//! Synchronous, deterministic change fan-out:
//! - subscriber buckets keyed by canonical path key, exact or
//!   subtree-scoped
//! - one monotonic revision counter per path key, bumped for every
//!   qualifying change at or below it
//! - a leaf-to-root emission walk that visits each ancestor key at most
//!   once per change
//!
//! Callbacks run on the mutating caller's stack, before the mutating call
//! returns. Reentrant mutation from a callback runs its own emission
//! cycle to completion before the outer walk resumes.
//!
//! # Example
//!
//! ```ignore
//! let store = Store::create(model)?;
//!
//! let handle = store.subscribe("profile.firstName", |event| {
//!     println!("{} is now {:?} (rev {})", event.key, event.value, event.revision);
//! });
//!
//! store.set_value("profile.firstName", Value::from("Grace"))?;
//! handle.unsubscribe();
//! ```

mod manager;
mod types;

pub use manager::{SubscriptionManager, UpdateHook};
pub use types::{Change, ChangeEvent, ChangeKind, SubscriberId, SubscriptionHandle};
