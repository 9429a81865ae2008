use crate::search::{
    states::{PackedState, State, StatePacker},
    Operator, PartialState, Task,
};
use segvec::{Linear, SegVec};
use std::collections::HashMap;

/// Identifier of a registered state. Ids are dense, 0-based, assigned in
/// insertion order and stable for the lifetime of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    pub fn id(self) -> usize {
        self.0
    }

    /// Rebuilds a state id from its dense index, for callers that keep
    /// id-indexed auxiliary storage.
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// Sentinel for "no state", used as the parent of root nodes.
pub const NO_STATE: StateId = StateId(usize::MAX);

/// Content-addressed storage of packed states. Inserting the same total
/// assignment twice yields the same id; states are never evicted.
#[derive(Debug)]
pub struct StatePool {
    packer: StatePacker,
    states: SegVec<PackedState, Linear>,
    registered: HashMap<PackedState, StateId>,
}

impl StatePool {
    pub fn new(task: &Task) -> Self {
        Self {
            packer: StatePacker::new(&task.variables),
            states: SegVec::new(),
            registered: HashMap::new(),
        }
    }

    pub fn insert(&mut self, state: &State) -> StateId {
        let packed = self.packer.pack(state);
        match self.registered.get(&packed) {
            Some(&id) => id,
            None => {
                let id = StateId(self.states.len());
                self.states.push(packed.clone());
                self.registered.insert(packed, id);
                id
            }
        }
    }

    pub fn state(&self, id: StateId) -> State {
        self.packer.unpack(self.packed(id))
    }

    pub fn packed(&self, id: StateId) -> &PackedState {
        self.states.get(id.0).expect("invalid state id")
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// True if every assignment of `partial` holds in the registered state.
    /// Reads single variables out of the packed words, no unpacking.
    pub fn is_subset(&self, partial: &PartialState, id: StateId) -> bool {
        let packed = self.packed(id);
        partial
            .iter()
            .all(|(var, val)| self.packer.value(packed, var) == val)
    }

    /// Applies `op` to the registered state and registers the result.
    pub fn apply(&mut self, op: &Operator, id: StateId) -> StateId {
        let state = self.state(id);
        let next = op.apply(&state);
        self.insert(&next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn identical_content_yields_identical_id() {
        let task = two_switches_task();
        let mut pool = StatePool::new(&task);

        let a = pool.insert(&State::new(vec![0, 0]));
        let b = pool.insert(&State::new(vec![0, 1]));
        let a_again = pool.insert(&State::new(vec![0, 0]));

        assert_eq!(a, a_again);
        assert_ne!(a, b);
        assert_eq!(pool.num_states(), 2);
    }

    #[test]
    fn ids_are_dense_and_stable() {
        let task = chain_task();
        let mut pool = StatePool::new(&task);
        let ids: Vec<_> = (0..3).map(|v| pool.insert(&State::new(vec![v]))).collect();
        assert_eq!(ids.iter().map(|id| id.id()).collect::<Vec<_>>(), vec![0, 1, 2]);
        for (v, id) in ids.iter().enumerate() {
            assert_eq!(pool.state(*id), State::new(vec![v]));
        }
    }

    #[test]
    fn subset_test_reads_packed_values() {
        let task = two_switches_task();
        let mut pool = StatePool::new(&task);
        let id = pool.insert(&State::new(vec![1, 0]));
        assert!(pool.is_subset(&ps(&[(0, 1)]), id));
        assert!(pool.is_subset(&PartialState::empty(), id));
        assert!(!pool.is_subset(&ps(&[(1, 1)]), id));
    }

    #[test]
    fn apply_registers_the_successor() {
        let task = chain_task();
        let mut pool = StatePool::new(&task);
        let init = pool.insert(&task.initial_state);
        let next = pool.apply(&task.operators[0], init);
        assert_eq!(pool.state(next), State::new(vec![1]));
        // Applying again from the same state reuses the id.
        assert_eq!(pool.apply(&task.operators[0], init), next);
    }
}
