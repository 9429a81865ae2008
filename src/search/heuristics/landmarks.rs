use crate::search::{states::StateId, OpId};
use std::collections::HashMap;

/// A disjunctive action landmark: a sorted, non-empty set of operator ids of
/// which every plan must use at least one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landmark {
    ops: Vec<OpId>,
}

impl Landmark {
    /// Builds a landmark from operator ids; the ids are sorted and
    /// deduplicated.
    pub fn new(mut ops: Vec<OpId>) -> Self {
        debug_assert!(!ops.is_empty());
        ops.sort_unstable();
        ops.dedup();
        Self { ops }
    }

    pub fn ops(&self) -> &[OpId] {
        &self.ops
    }

    pub fn contains(&self, op: OpId) -> bool {
        self.ops.binary_search(&op).is_ok()
    }
}

/// An ordered collection of landmarks, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandmarkSet {
    landmarks: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, landmark: Landmark) {
        self.landmarks.push(landmark);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn clear(&mut self) {
        self.landmarks.clear();
    }
}

/// Stores landmark sets per state id for the cache-incremental LM-Cut.
/// An existing entry is never overwritten. With pruning enabled the cache
/// drops the previously queried parent's entry as soon as lookups move on to
/// a different parent; drivers evaluate all children of one parent back to
/// back, and a pruned entry only costs a cache miss.
#[derive(Debug, Default)]
pub struct LandmarkCache {
    entries: HashMap<StateId, LandmarkSet>,
    prune: bool,
    last_queried: Option<StateId>,
}

impl LandmarkCache {
    pub fn new(prune: bool) -> Self {
        Self {
            entries: HashMap::new(),
            prune,
            last_queried: None,
        }
    }

    pub fn get(&mut self, state_id: StateId) -> Option<&LandmarkSet> {
        if self.prune && self.last_queried != Some(state_id) {
            if let Some(previous) = self.last_queried.take() {
                self.entries.remove(&previous);
            }
        }
        self.last_queried = Some(state_id);
        self.entries.get(&state_id)
    }

    /// Inserts a landmark set for a state. Returns false (and keeps the old
    /// entry) if the state is already cached.
    pub fn insert(&mut self, state_id: StateId, landmarks: LandmarkSet) -> bool {
        if self.entries.contains_key(&state_id) {
            return false;
        }
        self.entries.insert(state_id, landmarks);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
