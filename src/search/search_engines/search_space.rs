use crate::search::{
    search_engines::SearchNode,
    states::{State, StateId, StatePool},
    Operator, PartialState, Plan, PlanStep, Task,
};
use segvec::{Linear, SegVec};

/// The node registry over the state pool: for every registered state exactly
/// one [`SearchNode`]. Nodes are created lazily as states are registered and
/// live as long as the search.
#[derive(Debug)]
pub struct SearchSpace {
    pool: StatePool,
    nodes: SegVec<SearchNode, Linear>,
}

impl SearchSpace {
    pub fn new(task: &Task) -> Self {
        Self {
            pool: StatePool::new(task),
            nodes: SegVec::new(),
        }
    }

    /// Registers a state and makes sure it has a node.
    pub fn insert_state(&mut self, state: &State) -> StateId {
        let id = self.pool.insert(state);
        self.ensure_nodes();
        id
    }

    /// Applies `op` to a registered state; the successor is registered too.
    pub fn apply_op(&mut self, op: &Operator, state_id: StateId) -> StateId {
        let next = self.pool.apply(op, state_id);
        self.ensure_nodes();
        next
    }

    pub fn state(&self, state_id: StateId) -> State {
        self.pool.state(state_id)
    }

    pub fn satisfies(&self, partial: &PartialState, state_id: StateId) -> bool {
        self.pool.is_subset(partial, state_id)
    }

    pub fn num_states(&self) -> usize {
        self.pool.num_states()
    }

    pub fn node(&self, state_id: StateId) -> &SearchNode {
        self.nodes.get(state_id.id()).expect("invalid state id")
    }

    pub fn node_mut(&mut self, state_id: StateId) -> &mut SearchNode {
        self.nodes.get_mut(state_id.id()).expect("invalid state id")
    }

    fn ensure_nodes(&mut self) {
        while self.nodes.len() < self.pool.num_states() {
            self.nodes.push(SearchNode::new());
        }
    }

    /// Walks the parent chain from the goal node and returns the operator
    /// sequence in execution order.
    pub fn extract_plan(&self, goal_state: StateId) -> Plan {
        let mut steps = Vec::new();
        let mut current = goal_state;
        loop {
            let node = self.node(current);
            let Some(op) = node.get_op() else {
                break;
            };
            steps.push(PlanStep {
                op,
                from: node.get_parent_id(),
                to: current,
            });
            current = node.get_parent_id();
        }
        steps.reverse();
        Plan::new(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::states::NO_STATE;
    use crate::test_utils::*;

    #[test]
    fn nodes_track_registered_states() {
        let task = chain_task();
        let mut space = SearchSpace::new(&task);
        let init = space.insert_state(&task.initial_state);
        assert!(space.node(init).is_new());

        let next = space.apply_op(&task.operators[0], init);
        assert_ne!(init, next);
        assert!(space.node(next).is_new());
        assert_eq!(space.state(next), State::new(vec![1]));
    }

    #[test]
    fn plan_extraction_walks_the_parent_chain() {
        let task = chain_task();
        let mut space = SearchSpace::new(&task);
        let s0 = space.insert_state(&task.initial_state);
        let s1 = space.apply_op(&task.operators[0], s0);
        let s2 = space.apply_op(&task.operators[1], s1);

        space.node_mut(s0).update_path(NO_STATE, None, 0);
        space.node_mut(s1).update_path(s0, Some(0), 1);
        space.node_mut(s2).update_path(s1, Some(1), 5);

        let plan = space.extract_plan(s2);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.steps()[0], PlanStep { op: 0, from: s0, to: s1 });
        assert_eq!(plan.steps()[1], PlanStep { op: 1, from: s1, to: s2 });
        assert_eq!(plan.cost(&task), 5);
    }
}
