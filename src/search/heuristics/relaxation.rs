use crate::search::{
    heuristics::{CostTransform, CrossRefOptions, FactOpCrossRef},
    priority_queue::AdaptivePriorityQueue,
    states::State,
    Cost, OpId, PartialState, Task, COST_MAX, DEAD_END,
};

/// Which delete-relaxation value the shared core computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxationKind {
    /// Sum of precondition values; inadmissible.
    Add,
    /// Maximum of precondition values; admissible.
    Max,
    /// Cost of an extracted relaxed plan; inadmissible.
    Ff,
}

#[derive(Debug, Clone, Copy)]
struct FactRecord {
    value: Cost,
    reached_by: Option<usize>,
    goal: bool,
    visited: bool,
}

#[derive(Debug, Clone, Copy)]
struct OpRecord {
    value: Cost,
    cost: Cost,
    unsat: usize,
}

/// Shared exploration core of the delete-relaxation heuristics. One engine is
/// built per heuristic object; all working arrays and the priority queue are
/// reused across evaluations.
#[derive(Debug)]
pub struct RelaxationEngine {
    kind: RelaxationKind,
    graph: FactOpCrossRef,
    facts: Vec<FactRecord>,
    ops: Vec<OpRecord>,
    goal_facts: Vec<usize>,
    goal_unsat: usize,
    relaxed_plan: Vec<bool>,
    queue: AdaptivePriorityQueue,
}

impl RelaxationEngine {
    pub fn new(task: &Task, kind: RelaxationKind, cost: CostTransform) -> Self {
        let graph = FactOpCrossRef::new(
            task,
            &CrossRefOptions {
                with_goal_op: false,
                with_fact_eff: false,
                simplify: true,
                cost,
            },
        );
        let facts = vec![
            FactRecord {
                value: COST_MAX,
                reached_by: None,
                goal: false,
                visited: false,
            };
            graph.fact_count
        ];
        let ops = (0..graph.num_ops())
            .map(|op| OpRecord {
                value: graph.op_cost[op],
                cost: graph.op_cost[op],
                unsat: graph.op_pre[op].len(),
            })
            .collect();
        Self {
            kind,
            relaxed_plan: vec![false; task.operators.len()],
            goal_facts: graph.goal_facts.clone(),
            goal_unsat: 0,
            facts,
            ops,
            graph,
            queue: AdaptivePriorityQueue::new(),
        }
    }

    /// Heuristic value of `state` against the task goal.
    pub fn evaluate(&mut self, state: &State) -> Cost {
        self.evaluate_full(state, None, false)
    }

    /// Like [`RelaxationEngine::evaluate`], but additionally extracts the
    /// relaxed plan and reports which of the `applicable` operators appear in
    /// it, in ascending id order.
    pub fn evaluate_with_preferred(
        &mut self,
        state: &State,
        applicable: &[OpId],
    ) -> (Cost, Vec<OpId>) {
        let value = self.evaluate_full(state, None, true);
        if value == DEAD_END {
            return (value, Vec::new());
        }
        let preferred = applicable
            .iter()
            .copied()
            .filter(|&op| self.relaxed_plan[op])
            .collect();
        (value, preferred)
    }

    /// Heuristic value of `state` against an arbitrary goal. The given
    /// partial state temporarily replaces the task goal.
    pub fn evaluate_with_goal(&mut self, state: &State, goal: &PartialState) -> Cost {
        self.evaluate_full(state, Some(goal), false)
    }

    /// Operators of the most recent relaxed plan, ascending.
    pub fn relaxed_plan_ops(&self) -> impl Iterator<Item = OpId> + '_ {
        self.relaxed_plan
            .iter()
            .enumerate()
            .filter_map(|(op, &marked)| marked.then_some(op))
    }

    fn evaluate_full(
        &mut self,
        state: &State,
        goal_override: Option<&PartialState>,
        want_plan: bool,
    ) -> Cost {
        self.init(goal_override);
        self.push_initial(state);
        if !self.main_loop() {
            return DEAD_END;
        }
        match self.kind {
            RelaxationKind::Add | RelaxationKind::Max => {
                if want_plan {
                    self.mark_relaxed_plan();
                }
                let mut value = 0;
                for &fact in &self.goal_facts {
                    let fact_value = self.facts[fact].value;
                    value = match self.kind {
                        RelaxationKind::Add => value + fact_value,
                        _ => value.max(fact_value),
                    };
                }
                value
            }
            RelaxationKind::Ff => {
                self.mark_relaxed_plan();
                (0..self.graph.base_op_count)
                    .filter(|&op| self.relaxed_plan[op])
                    .map(|op| self.ops[op].cost)
                    .sum()
            }
        }
    }

    fn init(&mut self, goal_override: Option<&PartialState>) {
        for fact in &mut self.facts {
            fact.value = COST_MAX;
            fact.reached_by = None;
            fact.goal = false;
            fact.visited = false;
        }
        for op in 0..self.ops.len() {
            self.ops[op].value = self.graph.op_cost[op];
            self.ops[op].cost = self.graph.op_cost[op];
            self.ops[op].unsat = self.graph.op_pre[op].len();
        }
        self.goal_facts = match goal_override {
            Some(goal) => self.graph.fact_index.partial_state_facts(goal),
            None => self.graph.goal_facts.clone(),
        };
        for &fact in &self.goal_facts {
            self.facts[fact].goal = true;
        }
        self.goal_unsat = self.goal_facts.len();
        self.queue.clear();
    }

    fn push_initial(&mut self, state: &State) {
        let state_facts = self.graph.fact_index.state_facts(state);
        for fact in state_facts {
            self.update_fact(fact, None, 0);
        }
        self.update_fact(self.graph.nopre_fact, None, 0);
    }

    fn update_fact(&mut self, fact: usize, reached_by: Option<usize>, value: Cost) {
        self.facts[fact].value = value;
        self.facts[fact].reached_by = reached_by;
        // Only facts that can still be consumed are worth queueing.
        if self.facts[fact].goal || !self.graph.fact_pre[fact].is_empty() {
            self.queue.push(value, fact);
        }
    }

    /// Returns true once every goal fact has been reached, false if the
    /// queue runs dry first.
    fn main_loop(&mut self) -> bool {
        if self.goal_unsat == 0 {
            return true;
        }
        while let Some((value, fact)) = self.queue.pop() {
            if self.facts[fact].value != value {
                continue;
            }
            if self.facts[fact].goal {
                self.facts[fact].goal = false;
                self.goal_unsat -= 1;
                if self.goal_unsat == 0 {
                    return true;
                }
            }
            for i in 0..self.graph.fact_pre[fact].len() {
                let op = self.graph.fact_pre[fact][i];
                self.process_op(op, value);
            }
        }
        false
    }

    fn process_op(&mut self, op: usize, fact_value: Cost) {
        let record = &mut self.ops[op];
        record.value = match self.kind {
            RelaxationKind::Add | RelaxationKind::Ff => record.value + fact_value,
            RelaxationKind::Max => record.value.max(record.cost + fact_value),
        };
        record.unsat = record.unsat.saturating_sub(1);
        if record.unsat == 0 {
            let op_value = record.value;
            for i in 0..self.graph.op_eff[op].len() {
                let fact = self.graph.op_eff[op][i];
                if self.facts[fact].value > op_value {
                    self.update_fact(fact, Some(op), op_value);
                }
            }
        }
    }

    /// Walks `reached_by` edges backward from the goal facts and marks every
    /// operator on the way as part of the relaxed plan.
    fn mark_relaxed_plan(&mut self) {
        self.relaxed_plan.fill(false);
        let mut stack = self.goal_facts.clone();
        while let Some(fact) = stack.pop() {
            if self.facts[fact].visited {
                continue;
            }
            self.facts[fact].visited = true;
            if let Some(op) = self.facts[fact].reached_by {
                let owner = self.graph.op_owner[op].expect("relaxation ops have owners");
                self.relaxed_plan[owner] = true;
                stack.extend_from_slice(&self.graph.op_pre[op]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn engine(task: &Task, kind: RelaxationKind) -> RelaxationEngine {
        RelaxationEngine::new(task, kind, CostTransform::default())
    }

    #[test]
    fn single_operator_round_trip() {
        let task = single_switch_task();
        assert_eq!(engine(&task, RelaxationKind::Max).evaluate(&task.initial_state), 3);
        assert_eq!(engine(&task, RelaxationKind::Add).evaluate(&task.initial_state), 3);
        assert_eq!(engine(&task, RelaxationKind::Ff).evaluate(&task.initial_state), 3);
    }

    #[test]
    fn independent_goals_split_the_kinds() {
        let task = two_switches_task();
        assert_eq!(engine(&task, RelaxationKind::Max).evaluate(&task.initial_state), 5);
        assert_eq!(engine(&task, RelaxationKind::Add).evaluate(&task.initial_state), 7);
        assert_eq!(engine(&task, RelaxationKind::Ff).evaluate(&task.initial_state), 7);
    }

    #[test]
    fn chained_preconditions_accumulate() {
        let task = chain_task();
        assert_eq!(engine(&task, RelaxationKind::Max).evaluate(&task.initial_state), 5);
        assert_eq!(engine(&task, RelaxationKind::Add).evaluate(&task.initial_state), 5);
        assert_eq!(engine(&task, RelaxationKind::Ff).evaluate(&task.initial_state), 5);
    }

    #[test]
    fn unreachable_goal_is_a_dead_end() {
        let task = no_ops_task();
        for kind in [RelaxationKind::Add, RelaxationKind::Max, RelaxationKind::Ff] {
            assert_eq!(engine(&task, kind).evaluate(&task.initial_state), DEAD_END);
        }
    }

    #[test]
    fn satisfied_goal_costs_nothing() {
        let task = single_switch_task();
        let goal_state = State::new(vec![1]);
        assert_eq!(engine(&task, RelaxationKind::Max).evaluate(&goal_state), 0);
        assert_eq!(engine(&task, RelaxationKind::Ff).evaluate(&goal_state), 0);
    }

    #[test]
    fn max_never_exceeds_ff_never_exceeds_add() {
        for task in [
            single_switch_task(),
            two_switches_task(),
            chain_task(),
            unlock_task(),
            delivery_task(),
        ] {
            let hmax = engine(&task, RelaxationKind::Max).evaluate(&task.initial_state);
            let hff = engine(&task, RelaxationKind::Ff).evaluate(&task.initial_state);
            let hadd = engine(&task, RelaxationKind::Add).evaluate(&task.initial_state);
            assert!(hmax <= hff, "hmax {hmax} > hff {hff}");
            assert!(hff <= hadd, "hff {hff} > hadd {hadd}");
        }
    }

    #[test]
    fn relaxed_plan_yields_preferred_ops() {
        let task = unlock_task();
        let mut ff = engine(&task, RelaxationKind::Ff);
        // Both operators are in the relaxed plan, but only b is applicable.
        let (value, preferred) = ff.evaluate_with_preferred(&task.initial_state, &[1]);
        assert_eq!(value, 2);
        assert_eq!(preferred, vec![1]);
        assert_eq!(ff.relaxed_plan_ops().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn arbitrary_goal_overrides_the_task_goal() {
        let task = chain_task();
        let mut hmax = engine(&task, RelaxationKind::Max);
        assert_eq!(hmax.evaluate_with_goal(&task.initial_state, &ps(&[(0, 1)])), 1);
        assert_eq!(hmax.evaluate_with_goal(&task.initial_state, &ps(&[(0, 0)])), 0);
        // The override does not stick.
        assert_eq!(hmax.evaluate(&task.initial_state), 5);
    }
}
