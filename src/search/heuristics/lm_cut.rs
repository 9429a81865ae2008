use crate::search::{
    heuristics::{
        CostTransform, CrossRefOptions, FactOpCrossRef, Heuristic, HeuristicRequest,
        HeuristicResult, Landmark, LandmarkCache, LandmarkSet,
    },
    priority_queue::AdaptivePriorityQueue,
    search_engines::SearchSpace,
    states::{State, StateId, NO_STATE},
    Cost, OpId, Task, COST_MAX, DEAD_END,
};

/// Role of a fact during cut extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CutMark {
    Undef,
    Init,
    Goal,
}

#[derive(Debug)]
enum IncrementalMode {
    None,
    /// Landmarks of the most recent parent state, replayed for its children.
    Local {
        landmarks: LandmarkSet,
        parent: StateId,
    },
    /// Landmarks cached per state id.
    Cached { cache: LandmarkCache },
}

/// The LM-Cut heuristic: repeated h^max computations over a justification
/// graph, each round extracting a disjunctive action landmark (a cut) and
/// deducting its cost until the goal becomes free.
///
/// Admissible for non-negative integer costs. The incremental variants seed
/// a child evaluation with the parent's landmarks before running the
/// ordinary rounds.
#[derive(Debug)]
pub struct LmCutHeuristic {
    graph: FactOpCrossRef,
    goal_fact: usize,
    fact_value: Vec<Cost>,
    fact_supp_count: Vec<i32>,
    op_cost: Vec<Cost>,
    op_unsat: Vec<usize>,
    op_supp: Vec<Option<usize>>,
    op_supp_cost: Vec<Cost>,
    op_cut_candidate: Vec<bool>,
    state_facts: Vec<usize>,
    cut: Vec<usize>,
    cut_marks: Vec<CutMark>,
    stack: Vec<usize>,
    queue: AdaptivePriorityQueue,
    mode: IncrementalMode,
}

impl LmCutHeuristic {
    pub fn new(task: &Task, cost: CostTransform) -> Self {
        Self::build(task, cost, IncrementalMode::None)
    }

    pub fn new_incremental_local(task: &Task, cost: CostTransform) -> Self {
        Self::build(
            task,
            cost,
            IncrementalMode::Local {
                landmarks: LandmarkSet::new(),
                parent: NO_STATE,
            },
        )
    }

    pub fn new_incremental_cached(task: &Task, cost: CostTransform, prune: bool) -> Self {
        Self::build(
            task,
            cost,
            IncrementalMode::Cached {
                cache: LandmarkCache::new(prune),
            },
        )
    }

    fn build(task: &Task, cost: CostTransform, mode: IncrementalMode) -> Self {
        let graph = FactOpCrossRef::new(
            task,
            &CrossRefOptions {
                with_goal_op: true,
                with_fact_eff: true,
                simplify: false,
                cost,
            },
        );
        let fact_count = graph.fact_count;
        let op_count = graph.num_ops();
        Self {
            goal_fact: graph.goal_fact.expect("goal fact exists"),
            fact_value: vec![COST_MAX; fact_count],
            fact_supp_count: vec![0; fact_count],
            op_cost: graph.op_cost.clone(),
            op_unsat: vec![0; op_count],
            op_supp: vec![None; op_count],
            op_supp_cost: vec![COST_MAX; op_count],
            op_cut_candidate: vec![false; op_count],
            state_facts: Vec::new(),
            cut: Vec::new(),
            cut_marks: vec![CutMark::Undef; fact_count],
            stack: Vec::new(),
            queue: AdaptivePriorityQueue::new(),
            graph,
            mode,
        }
    }

    /// One full evaluation: h^max, optional landmark replay, then cut
    /// rounds until the goal value reaches zero.
    fn evaluate_inner(
        &mut self,
        state: &State,
        initial_landmarks: Option<&LandmarkSet>,
        used_op: Option<OpId>,
        save_landmarks: bool,
    ) -> (Cost, LandmarkSet) {
        let mut landmarks = LandmarkSet::new();
        let mut value = 0;

        self.hmax_full(state);
        if self.fact_value[self.goal_fact] == COST_MAX {
            return (DEAD_END, landmarks);
        }

        if let Some(initial) = initial_landmarks {
            if !initial.is_empty() {
                value += self.apply_initial_landmarks(
                    initial,
                    used_op,
                    save_landmarks,
                    &mut landmarks,
                );
            }
        }

        while self.fact_value[self.goal_fact] > 0 {
            value += self.cut_round();
            if save_landmarks {
                self.save_cut_landmark(&mut landmarks);
            }
            let cut = std::mem::take(&mut self.cut);
            self.hmax_inc(&cut);
            self.cut = cut;
        }

        (value, landmarks)
    }

    fn fpush(&mut self, value: Cost, fact: usize) {
        self.fact_value[fact] = value;
        self.queue.decrease_key(value, fact);
    }

    fn hmax_full(&mut self, state: &State) {
        self.queue.clear();
        self.fact_value.fill(COST_MAX);
        self.fact_supp_count.fill(0);
        for op in 0..self.graph.num_ops() {
            self.op_unsat[op] = self.graph.op_pre[op].len();
            self.op_supp[op] = None;
            self.op_supp_cost[op] = COST_MAX;
            self.op_cost[op] = self.graph.op_cost[op];
            self.op_cut_candidate[op] = false;
        }

        self.state_facts.clear();
        let facts = self.graph.fact_index.state_facts(state);
        for fact in facts {
            self.fpush(0, fact);
            self.state_facts.push(fact);
        }
        self.fpush(0, self.graph.nopre_fact);
        self.state_facts.push(self.graph.nopre_fact);

        while let Some((value, fact)) = self.queue.pop() {
            if self.fact_value[fact] != value {
                continue;
            }
            for i in 0..self.graph.fact_pre[fact].len() {
                let op = self.graph.fact_pre[fact][i];
                self.op_unsat[op] -= 1;
                if self.op_unsat[op] == 0 {
                    // The last fact that enabled the operator has maximum
                    // value among its preconditions, so it is a supporter.
                    self.set_op_supp(op, fact);
                    self.enqueue_op_effects(op, value);
                }
            }
        }
    }

    fn set_op_supp(&mut self, op: usize, fact: usize) {
        if let Some(old) = self.op_supp[op] {
            self.fact_supp_count[old] -= 1;
        }
        self.op_supp[op] = Some(fact);
        self.op_supp_cost[op] = self.fact_value[fact];
        self.fact_supp_count[fact] += 1;
    }

    fn enqueue_op_effects(&mut self, op: usize, fact_value: Cost) {
        let value = self.op_cost[op] + fact_value;
        for i in 0..self.graph.op_eff[op].len() {
            let fact = self.graph.op_eff[op][i];
            if self.fact_value[fact] > value {
                self.fpush(value, fact);
            }
        }
    }

    /// Recomputes the supporter of `op` as the precondition fact with the
    /// highest current value.
    fn update_supp(&mut self, op: usize) {
        let mut supp = None;
        let mut value = -1;
        for &fact in &self.graph.op_pre[op] {
            let fact_value = self.fact_value[fact];
            if fact_value != COST_MAX && fact_value > value {
                value = fact_value;
                supp = Some(fact);
            }
        }
        let supp = supp.expect("operator with satisfied preconditions has a supporter");
        self.set_op_supp(op, supp);
    }

    fn hmax_inc_update_op(&mut self, op: usize, fact: usize, fact_value: Cost) {
        if self.op_supp[op] != Some(fact) || self.op_unsat[op] > 0 {
            return;
        }
        let old_supp_value = self.op_supp_cost[op];
        if old_supp_value <= fact_value {
            return;
        }
        self.update_supp(op);
        if self.op_supp_cost[op] != old_supp_value {
            debug_assert!(self.op_supp_cost[op] < old_supp_value);
            self.enqueue_op_effects(op, self.op_supp_cost[op]);
        }
    }

    /// Repairs fact values after the costs of `changed_ops` decreased.
    fn hmax_inc(&mut self, changed_ops: &[usize]) {
        self.op_cut_candidate.fill(false);

        for &op in changed_ops {
            // Operators unreached in this state keep their sentinel value.
            if self.op_supp[op].is_some() {
                self.enqueue_op_effects(op, self.op_supp_cost[op]);
            }
        }

        while let Some((value, fact)) = self.queue.pop() {
            if self.fact_value[fact] != value {
                continue;
            }
            for i in 0..self.graph.fact_pre[fact].len() {
                let op = self.graph.fact_pre[fact][i];
                self.hmax_inc_update_op(op, fact, value);
            }
        }
    }

    /// Marks all facts connected to the goal fact through zero-reduced-cost
    /// operators whose supporter lies in the zone. Operators with positive
    /// cost pointing into the zone become cut candidates.
    fn mark_goal_zone(&mut self) {
        self.stack.clear();
        self.stack.push(self.goal_fact);
        self.cut_marks[self.goal_fact] = CutMark::Goal;
        while let Some(fact) = self.stack.pop() {
            for i in 0..self.graph.fact_eff[fact].len() {
                let op = self.graph.fact_eff[fact][i];
                let Some(supp) = self.op_supp[op] else {
                    continue;
                };
                if self.cut_marks[supp] != CutMark::Undef {
                    continue;
                }
                if self.op_cost[op] == 0 {
                    self.cut_marks[supp] = CutMark::Goal;
                    self.stack.push(supp);
                } else {
                    self.op_cut_candidate[op] = true;
                }
            }
        }
    }

    /// Forward pass from the state facts along supporter edges; collects cut
    /// candidates crossing into the goal zone. Returns the minimum reduced
    /// cost over the cut.
    fn find_cut(&mut self) -> Cost {
        self.stack.clear();
        for i in 0..self.state_facts.len() {
            let fact = self.state_facts[i];
            if self.cut_marks[fact] == CutMark::Undef {
                self.cut_marks[fact] = CutMark::Init;
                self.stack.push(fact);
            }
        }

        self.cut.clear();
        let mut min_cost = COST_MAX;
        while let Some(fact) = self.stack.pop() {
            for i in 0..self.graph.fact_pre[fact].len() {
                let op = self.graph.fact_pre[fact][i];
                if self.op_supp[op] != Some(fact) {
                    continue;
                }
                if self.op_cut_candidate[op] {
                    self.cut.push(op);
                    min_cost = min_cost.min(self.op_cost[op]);
                    continue;
                }
                for j in 0..self.graph.op_eff[op].len() {
                    let next = self.graph.op_eff[op][j];
                    if self.cut_marks[next] == CutMark::Undef && self.fact_supp_count[next] > 0 {
                        self.cut_marks[next] = CutMark::Init;
                        self.stack.push(next);
                    }
                }
            }
        }
        self.cut.sort_unstable();
        self.cut.dedup();

        if self.cut.is_empty() {
            panic!("LM-Cut extracted an empty cut");
        }
        if min_cost <= 0 {
            panic!("LM-Cut extracted a cut of non-positive cost {min_cost}");
        }
        min_cost
    }

    /// One landmark round: goal zone, cut, cost deduction.
    fn cut_round(&mut self) -> Cost {
        self.cut_marks.fill(CutMark::Undef);
        self.mark_goal_zone();
        let cost = self.find_cut();
        for i in 0..self.cut.len() {
            let op = self.cut[i];
            self.op_cost[op] -= cost;
        }
        cost
    }

    fn save_cut_landmark(&mut self, landmarks: &mut LandmarkSet) {
        let ops: Vec<OpId> = self
            .cut
            .iter()
            .filter_map(|&op| self.graph.op_owner[op])
            .collect();
        if !ops.is_empty() {
            landmarks.push(Landmark::new(ops));
        }
    }

    fn landmark_cost(&self, landmark: &Landmark, used_op: Option<OpId>) -> Cost {
        let mut cost = COST_MAX;
        for &op in landmark.ops() {
            // A landmark containing the operator that generated this state
            // is consumed; it contributes nothing here.
            if Some(op) == used_op {
                return 0;
            }
            cost = cost.min(self.op_cost[op]);
        }
        cost
    }

    /// Replays the parent's landmarks: deducts each landmark's cost from its
    /// operators, accumulates that cost into the initial heuristic value and
    /// repairs h^max afterwards.
    fn apply_initial_landmarks(
        &mut self,
        initial: &LandmarkSet,
        used_op: Option<OpId>,
        save_landmarks: bool,
        landmarks: &mut LandmarkSet,
    ) -> Cost {
        let mut value = 0;
        let mut changed_ops = Vec::new();

        for landmark in initial.iter() {
            let cost = self.landmark_cost(landmark, used_op);
            if cost <= 0 {
                continue;
            }
            value += cost;
            for &op in landmark.ops() {
                changed_ops.push(op);
                self.op_cost[op] -= cost;
            }
            if save_landmarks {
                landmarks.push(landmark.clone());
            }
        }

        changed_ops.sort_unstable();
        changed_ops.dedup();
        self.hmax_inc(&changed_ops);
        value
    }

    fn result(value: Cost, landmarks: LandmarkSet, request: &HeuristicRequest) -> HeuristicResult {
        HeuristicResult {
            value,
            preferred_ops: Vec::new(),
            landmarks: if request.save_landmarks {
                landmarks
            } else {
                LandmarkSet::new()
            },
        }
    }

    fn evaluate_local(
        &mut self,
        state: &State,
        parent: StateId,
        used_op: Option<OpId>,
        space: &SearchSpace,
        request: &HeuristicRequest,
    ) -> HeuristicResult {
        if parent == NO_STATE {
            if let IncrementalMode::Local { landmarks, parent } = &mut self.mode {
                landmarks.clear();
                *parent = NO_STATE;
            }
            let (value, landmarks) = self.evaluate_inner(state, None, None, request.save_landmarks);
            return Self::result(value, landmarks, request);
        }

        let cached_parent = match &self.mode {
            IncrementalMode::Local { parent, .. } => *parent,
            _ => unreachable!("local mode"),
        };
        if cached_parent != parent {
            let parent_state = space.state(parent);
            let (_, parent_landmarks) = self.evaluate_inner(&parent_state, None, None, true);
            if let IncrementalMode::Local {
                landmarks,
                parent: cached,
            } = &mut self.mode
            {
                *landmarks = parent_landmarks;
                *cached = parent;
            }
        }

        let initial = match &mut self.mode {
            IncrementalMode::Local { landmarks, .. } => std::mem::take(landmarks),
            _ => unreachable!("local mode"),
        };
        let (value, landmarks) =
            self.evaluate_inner(state, Some(&initial), used_op, request.save_landmarks);
        if let IncrementalMode::Local { landmarks, .. } = &mut self.mode {
            *landmarks = initial;
        }
        Self::result(value, landmarks, request)
    }

    fn evaluate_cached(
        &mut self,
        state: &State,
        state_id: StateId,
        parent: StateId,
        used_op: Option<OpId>,
        request: &HeuristicRequest,
    ) -> HeuristicResult {
        let initial = if parent != NO_STATE {
            match &mut self.mode {
                IncrementalMode::Cached { cache } => cache.get(parent).cloned(),
                _ => unreachable!("cached mode"),
            }
        } else {
            None
        };

        let (value, landmarks) = self.evaluate_inner(state, initial.as_ref(), used_op, true);
        if value != DEAD_END {
            if let IncrementalMode::Cached { cache } = &mut self.mode {
                cache.insert(state_id, landmarks.clone());
            }
        }
        Self::result(value, landmarks, request)
    }
}

impl Heuristic for LmCutHeuristic {
    fn evaluate(&mut self, state: &State, request: &HeuristicRequest) -> HeuristicResult {
        let (value, landmarks) = self.evaluate_inner(state, None, None, request.save_landmarks);
        Self::result(value, landmarks, request)
    }

    fn evaluate_node(
        &mut self,
        state_id: StateId,
        space: &SearchSpace,
        request: &HeuristicRequest,
    ) -> HeuristicResult {
        if matches!(self.mode, IncrementalMode::None) {
            let state = space.state(state_id);
            return self.evaluate(&state, request);
        }

        let node = space.node(state_id);
        let parent = node.get_parent_id();
        let used_op = node.get_op();
        let state = space.state(state_id);
        if matches!(self.mode, IncrementalMode::Local { .. }) {
            self.evaluate_local(&state, parent, used_op, space, request)
        } else {
            self.evaluate_cached(&state, state_id, parent, used_op, request)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use crate::search::heuristics::{HmaxHeuristic, RelaxationEngine, RelaxationKind};

    fn lm_cut(task: &Task) -> LmCutHeuristic {
        LmCutHeuristic::new(task, CostTransform::default())
    }

    fn value_and_landmarks(task: &Task) -> (Cost, Vec<Vec<OpId>>) {
        let mut heuristic = lm_cut(task);
        let request = HeuristicRequest {
            save_landmarks: true,
            ..Default::default()
        };
        let result = heuristic.evaluate(&task.initial_state, &request);
        let mut sets: Vec<Vec<OpId>> = result
            .landmarks
            .iter()
            .map(|landmark| landmark.ops().to_vec())
            .collect();
        sets.sort();
        (result.value, sets)
    }

    #[test]
    fn single_operator() {
        let task = single_switch_task();
        let (value, landmarks) = value_and_landmarks(&task);
        assert_eq!(value, 3);
        assert_eq!(landmarks, vec![vec![0]]);
    }

    #[test]
    fn independent_goals_sum_up() {
        let task = two_switches_task();
        let (value, landmarks) = value_and_landmarks(&task);
        assert_eq!(value, 7);
        assert_eq!(landmarks, vec![vec![0], vec![1]]);
    }

    #[test]
    fn chain_produces_one_landmark_per_link() {
        let task = chain_task();
        let (value, landmarks) = value_and_landmarks(&task);
        assert_eq!(value, 5);
        assert_eq!(landmarks, vec![vec![0], vec![1]]);
    }

    #[test]
    fn detour_counts_both_steps() {
        let task = unlock_task();
        let (value, landmarks) = value_and_landmarks(&task);
        assert_eq!(value, 2);
        assert_eq!(landmarks, vec![vec![0], vec![1]]);
    }

    #[test]
    fn unreachable_goal_is_a_dead_end() {
        let task = no_ops_task();
        let result = lm_cut(&task).evaluate(&task.initial_state, &HeuristicRequest::value_only());
        assert_eq!(result.value, DEAD_END);
    }

    #[test]
    fn satisfied_goal_is_free() {
        let task = single_switch_task();
        let result = lm_cut(&task).evaluate(&State::new(vec![1]), &HeuristicRequest::value_only());
        assert_eq!(result.value, 0);
    }

    #[test]
    fn dominates_hmax() {
        for task in [
            single_switch_task(),
            two_switches_task(),
            chain_task(),
            unlock_task(),
            shared_subgoal_task(),
            delivery_task(),
        ] {
            let hmax = HmaxHeuristic::new(&task, CostTransform::default())
                .evaluate(&task.initial_state, &HeuristicRequest::value_only())
                .value;
            let lm = lm_cut(&task)
                .evaluate(&task.initial_state, &HeuristicRequest::value_only())
                .value;
            assert!(lm >= hmax, "lm-cut {lm} < hmax {hmax}");
        }
    }

    #[test]
    fn admissible_on_known_optima() {
        for (task, optimum) in [
            (single_switch_task(), 3),
            (two_switches_task(), 7),
            (chain_task(), 5),
            (unlock_task(), 2),
            (shared_subgoal_task(), 5),
            (delivery_task(), 5),
        ] {
            let lm = lm_cut(&task)
                .evaluate(&task.initial_state, &HeuristicRequest::value_only())
                .value;
            assert!(lm <= optimum, "lm-cut {lm} exceeds the optimum {optimum}");
        }
    }

    #[test]
    fn never_below_the_relaxed_plan_lower_bound() {
        // On the shared-subgoal task LM-Cut finds the full relaxed cost.
        let task = shared_subgoal_task();
        let ff = RelaxationEngine::new(&task, RelaxationKind::Ff, CostTransform::default())
            .evaluate(&task.initial_state);
        let lm = lm_cut(&task)
            .evaluate(&task.initial_state, &HeuristicRequest::value_only())
            .value;
        assert_eq!(lm, ff);
        assert_eq!(lm, 5);
    }
}
