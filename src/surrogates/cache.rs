//! Identity-stable surrogate arenas.

use crate::model::ModelRef;
use crate::path::Path;
use crate::store::StoreShared;
use crate::types::{MapRef, ObjectId, SeqRef};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::trace;

use super::mapping::MapSurrogate;
use super::model::{ModelMutator, ModelSurrogate};
use super::sequence::SeqSurrogate;

/// Per-kind arenas of surrogates, keyed by target identity.
///
/// Surrogates hold their targets weakly, so an arena entry never extends
/// a target's lifetime. A dead entry (its target dropped) is evicted and
/// rebuilt on lookup; an address reused by a fresh allocation therefore
/// cannot resurrect a stale surrogate.
///
/// Lookups are get-or-create and ignore the path argument once an entry
/// exists: the path a target was first captured at sticks for the
/// store's lifetime.
pub(crate) struct SurrogateCache {
    mappings: RefCell<HashMap<ObjectId, Rc<MapSurrogate>>>,
    sequences: RefCell<HashMap<ObjectId, Rc<SeqSurrogate>>>,
    models: RefCell<HashMap<ObjectId, Rc<ModelSurrogate>>>,
    /// Mutator decorators; presence here is the instrumentation marker.
    mutators: RefCell<HashMap<ObjectId, Rc<ModelMutator>>>,
}

impl SurrogateCache {
    pub fn new() -> Self {
        Self {
            mappings: RefCell::new(HashMap::new()),
            sequences: RefCell::new(HashMap::new()),
            models: RefCell::new(HashMap::new()),
            mutators: RefCell::new(HashMap::new()),
        }
    }

    pub fn mapping(
        &self,
        shared: &Rc<StoreShared>,
        target: &MapRef,
        path: &Path,
    ) -> Rc<MapSurrogate> {
        let id = ObjectId::of_mapping(target);
        let mut arena = self.mappings.borrow_mut();
        if let Some(existing) = arena.get(&id) {
            if existing.is_live() {
                return Rc::clone(existing);
            }
        }
        let created = Rc::new(MapSurrogate::new(
            Rc::downgrade(shared),
            Rc::downgrade(target),
            path.clone(),
        ));
        arena.insert(id, Rc::clone(&created));
        created
    }

    pub fn sequence(
        &self,
        shared: &Rc<StoreShared>,
        target: &SeqRef,
        path: &Path,
    ) -> Rc<SeqSurrogate> {
        let id = ObjectId::of_sequence(target);
        let mut arena = self.sequences.borrow_mut();
        if let Some(existing) = arena.get(&id) {
            if existing.is_live() {
                return Rc::clone(existing);
            }
        }
        let created = Rc::new(SeqSurrogate::new(
            Rc::downgrade(shared),
            Rc::downgrade(target),
            path.clone(),
        ));
        arena.insert(id, Rc::clone(&created));
        created
    }

    pub fn model(
        &self,
        shared: &Rc<StoreShared>,
        target: &ModelRef,
        path: &Path,
    ) -> Rc<ModelSurrogate> {
        let id = ObjectId::of_model(target);
        let mut arena = self.models.borrow_mut();
        if let Some(existing) = arena.get(&id) {
            if existing.is_live() {
                return Rc::clone(existing);
            }
        }
        let created = Rc::new(ModelSurrogate::new(
            Rc::downgrade(shared),
            Rc::downgrade(target),
            path.clone(),
        ));
        arena.insert(id, Rc::clone(&created));
        created
    }

    /// Install the mutator decorator for a model, once. Re-instrumenting
    /// an already-instrumented model is a no-op; models without a path
    /// mutator are skipped entirely.
    pub fn instrument(&self, target: &ModelRef, base_path: &Path) {
        if !target.has_path_mutator() {
            return;
        }
        let id = ObjectId::of_model(target);
        let mut arena = self.mutators.borrow_mut();
        if let Some(existing) = arena.get(&id) {
            if existing.is_live() {
                return;
            }
        }
        trace!(key = %base_path.key(), "model instrumented");
        arena.insert(
            id,
            Rc::new(ModelMutator::new(Rc::downgrade(target), base_path.clone())),
        );
    }

    /// The mutator decorator for a model, if it was instrumented.
    pub fn mutator_of(&self, target: &ModelRef) -> Option<Rc<ModelMutator>> {
        let id = ObjectId::of_model(target);
        self.mutators
            .borrow()
            .get(&id)
            .filter(|mutator| mutator.is_live())
            .cloned()
    }
}
