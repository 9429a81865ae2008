use crate::search::{states::StateId, Cost};
use std::collections::{BTreeMap, VecDeque};

/// Cost key of the tie-breaking open list. For A* the first component is the
/// f-value and the second the h-value used to break ties.
pub type OpenListKey = (Cost, Cost);

/// Open list as an ordered map from cost keys to FIFO keynodes of state ids.
/// Pops are deterministic: lowest key first, insertion order within a key.
#[derive(Debug, Default)]
pub struct TieBreakingOpenList {
    keynodes: BTreeMap<OpenListKey, VecDeque<StateId>>,
    len: usize,
}

impl TieBreakingOpenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: OpenListKey, state_id: StateId) {
        self.keynodes.entry(key).or_default().push_back(state_id);
        self.len += 1;
    }

    pub fn pop(&mut self) -> Option<(OpenListKey, StateId)> {
        let mut entry = self.keynodes.first_entry()?;
        let key = *entry.key();
        let state_id = entry.get_mut().pop_front().expect("keynodes are non-empty");
        if entry.get().is_empty() {
            entry.remove();
        }
        self.len -= 1;
        Some((key, state_id))
    }

    pub fn top(&self) -> Option<(OpenListKey, StateId)> {
        let (key, fifo) = self.keynodes.first_key_value()?;
        Some((*key, *fifo.front().expect("keynodes are non-empty")))
    }

    pub fn clear(&mut self) {
        self.keynodes.clear();
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::states::{State, StatePool};
    use crate::test_utils::*;

    fn ids(n: usize) -> Vec<StateId> {
        let task = delivery_task();
        let mut pool = StatePool::new(&task);
        (0..n)
            .map(|i| pool.insert(&State::new(vec![i % 3, i / 3])))
            .collect()
    }

    #[test]
    fn orders_by_key_then_fifo() {
        let ids = ids(4);
        let mut list = TieBreakingOpenList::new();
        list.push((5, 2), ids[0]);
        list.push((3, 1), ids[1]);
        list.push((3, 1), ids[2]);
        list.push((3, 0), ids[3]);

        assert_eq!(list.top(), Some(((3, 0), ids[3])));
        assert_eq!(list.pop(), Some(((3, 0), ids[3])));
        // Equal keys come out in insertion order.
        assert_eq!(list.pop(), Some(((3, 1), ids[1])));
        assert_eq!(list.pop(), Some(((3, 1), ids[2])));
        assert_eq!(list.pop(), Some(((5, 2), ids[0])));
        assert_eq!(list.pop(), None);
    }

    #[test]
    fn second_component_breaks_ties() {
        let ids = ids(2);
        let mut list = TieBreakingOpenList::new();
        list.push((4, 3), ids[0]);
        list.push((4, 1), ids[1]);
        assert_eq!(list.pop(), Some(((4, 1), ids[1])));
    }

    #[test]
    fn clear_empties_the_list() {
        let ids = ids(1);
        let mut list = TieBreakingOpenList::new();
        list.push((1, 1), ids[0]);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.pop(), None);
    }
}
