use crate::search::states::State;
use smallvec::SmallVec;

/// Most operator preconditions and effects touch only a few variables.
const TYPICAL_NUM_ASSIGNMENTS: usize = 4;

/// An assignment to a subset of the task's variables, kept in canonical form:
/// (variable, value) pairs sorted by variable, at most one value per
/// variable. The empty partial state matches every total state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PartialState {
    vals: SmallVec<[(usize, usize); TYPICAL_NUM_ASSIGNMENTS]>,
}

impl PartialState {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a partial state from (variable, value) pairs. The pairs may
    /// arrive in any order and may repeat as long as they agree; two
    /// different values for one variable are rejected with that variable's
    /// id.
    pub fn new(pairs: impl IntoIterator<Item = (usize, usize)>) -> Result<Self, usize> {
        let mut vals: SmallVec<[(usize, usize); TYPICAL_NUM_ASSIGNMENTS]> =
            pairs.into_iter().collect();
        vals.sort_unstable();
        vals.dedup();
        for window in vals.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(window[0].0);
            }
        }
        Ok(Self { vals })
    }

    pub fn len(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    /// The value assigned to `var`, if any.
    pub fn get(&self, var: usize) -> Option<usize> {
        self.vals
            .binary_search_by_key(&var, |&(v, _)| v)
            .ok()
            .map(|i| self.vals[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.vals.iter().copied()
    }

    /// True if every assignment of this partial state holds in `state`.
    pub fn is_subset_of_state(&self, state: &State) -> bool {
        self.vals.iter().all(|&(var, val)| state.value(var) == val)
    }

    /// True if every assignment of this partial state also appears in
    /// `other`.
    pub fn is_subset_of(&self, other: &PartialState) -> bool {
        self.vals
            .iter()
            .all(|&(var, val)| other.get(var) == Some(val))
    }

    /// Writes all assignments of this partial state into `state`.
    pub fn apply_to(&self, state: &mut State) {
        for &(var, val) in &self.vals {
            state.set(var, val);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_and_lookup() {
        let ps = PartialState::new([(3, 1), (0, 2), (1, 0)]).unwrap();
        assert_eq!(ps.iter().collect::<Vec<_>>(), vec![(0, 2), (1, 0), (3, 1)]);
        assert_eq!(ps.get(0), Some(2));
        assert_eq!(ps.get(2), None);
        assert_eq!(ps.get(3), Some(1));
    }

    #[test]
    fn conflicting_assignment_is_rejected() {
        assert_eq!(PartialState::new([(2, 0), (2, 1)]), Err(2));
        // Repeated but agreeing pairs are fine.
        let ps = PartialState::new([(2, 1), (2, 1)]).unwrap();
        assert_eq!(ps.len(), 1);
    }

    #[test]
    fn empty_matches_everything() {
        let state = State::new(vec![0, 1, 2]);
        assert!(PartialState::empty().is_subset_of_state(&state));
    }

    #[test]
    fn subset_relations() {
        let small = PartialState::new([(0, 1)]).unwrap();
        let big = PartialState::new([(0, 1), (2, 0)]).unwrap();
        assert!(small.is_subset_of(&big));
        assert!(!big.is_subset_of(&small));

        let state = State::new(vec![1, 5, 0]);
        assert!(big.is_subset_of_state(&state));
        assert!(!PartialState::new([(1, 0)]).unwrap().is_subset_of_state(&state));
    }
}
