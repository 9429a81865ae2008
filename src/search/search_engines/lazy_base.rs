use crate::search::{
    search_engines::{LazyList, PreferredOpsMode, SearchContext, StepResult},
    states::{StateId, NO_STATE},
    OpId, DEAD_END,
};

/// Shared machinery of the lazy search family: a list of deferred
/// (parent, operator) expansions, materialized one entry at a time.
#[derive(Debug)]
pub(crate) struct LazyBase {
    pub list: Box<dyn LazyList>,
    preferred_mode: PreferredOpsMode,
    /// Applicable operators of the most recently processed state.
    applicable: Vec<OpId>,
    /// Preferred subset of `applicable`, empty unless preferred operators
    /// are in use.
    preferred: Vec<OpId>,
}

impl LazyBase {
    pub fn new(list: Box<dyn LazyList>, preferred_mode: PreferredOpsMode) -> Self {
        Self {
            list,
            preferred_mode,
            applicable: Vec::new(),
            preferred: Vec::new(),
        }
    }

    /// Registers and evaluates the initial state and enqueues it. The node
    /// stays open; it is closed when its entry is popped and expanded.
    pub fn init_step(&mut self, ctx: &mut SearchContext) -> StepResult {
        let init_id = ctx.space.insert_state(&ctx.task.initial_state);
        {
            let node = ctx.space.node_mut(init_id);
            node.update_path(NO_STATE, None, 0);
            node.open();
        }
        let value = ctx.evaluate_node(init_id, None).value;
        ctx.space.node_mut(init_id).set_h(value);
        self.list.push(value, init_id, None);
        StepResult::Continue
    }

    /// Pops the next entry and materializes its state. Returns the state to
    /// process, or None when the entry was consumed (duplicate, dead end) or
    /// the step ended the search.
    pub fn next(&mut self, ctx: &mut SearchContext) -> (StepResult, Option<StateId>) {
        let Some((parent_id, op)) = self.list.pop() else {
            return (StepResult::NotFound, None);
        };

        let state_id = match op {
            Some(op_id) => match self.materialize(ctx, parent_id, op_id) {
                Some(state_id) => state_id,
                None => return (StepResult::Continue, None),
            },
            None => parent_id,
        };

        // A goal state ends the search before it is expanded and is left
        // open; everything else closes here, right before its successors
        // are generated.
        if ctx.check_goal(state_id) {
            return (StepResult::Found, None);
        }
        {
            let node = ctx.space.node_mut(state_id);
            if node.is_open() {
                node.close();
                ctx.stats.increment_expanded_states();
            }
        }

        if op.is_none() {
            // The state was materialized earlier; recover its applicable
            // operators (and the preferred subset if requested).
            self.applicable = ctx.applicable_ops(state_id);
            if self.preferred_mode != PreferredOpsMode::Ignore {
                let result = ctx.evaluate_node(state_id, Some(&self.applicable));
                self.preferred = result.preferred_ops;
            } else {
                self.preferred.clear();
            }
        }

        (StepResult::Continue, Some(state_id))
    }

    /// Applies the deferred operator and evaluates the resulting state.
    fn materialize(
        &mut self,
        ctx: &mut SearchContext,
        parent_id: StateId,
        op_id: OpId,
    ) -> Option<StateId> {
        let state_id = ctx.apply_op(op_id, parent_id);
        if !ctx.space.node(state_id).is_new() {
            return None;
        }

        // Parent and operator must be in place before the evaluation so
        // that incremental heuristics can look at them.
        let parent_g = ctx.space.node(parent_id).get_g();
        let g = parent_g + ctx.task.operators[op_id].cost;
        ctx.space
            .node_mut(state_id)
            .update_path(parent_id, Some(op_id), g);

        self.applicable = ctx.applicable_ops(state_id);
        let result = if self.preferred_mode != PreferredOpsMode::Ignore {
            ctx.evaluate_node(state_id, Some(&self.applicable))
        } else {
            ctx.evaluate_node(state_id, None)
        };
        self.preferred = result.preferred_ops;
        ctx.space.node_mut(state_id).set_h(result.value);

        if result.value == DEAD_END {
            ctx.stats.increment_dead_end_states();
            return None;
        }

        ctx.space.node_mut(state_id).open();
        Some(state_id)
    }

    /// Enqueues the deferred successors of a processed state.
    pub fn expand(&mut self, ctx: &mut SearchContext, state_id: StateId) {
        let h = ctx.space.node(state_id).get_h();
        match self.preferred_mode {
            PreferredOpsMode::Ignore => {
                for &op in &self.applicable {
                    self.list.push(h, state_id, Some(op));
                    ctx.stats.increment_generated_states();
                }
            }
            PreferredOpsMode::Prioritize => {
                for &op in &self.preferred {
                    self.list.push(h, state_id, Some(op));
                    ctx.stats.increment_generated_states();
                }
                for &op in &self.applicable {
                    if !self.preferred.contains(&op) {
                        self.list.push(h, state_id, Some(op));
                        ctx.stats.increment_generated_states();
                    }
                }
            }
            PreferredOpsMode::Only => {
                for &op in &self.preferred {
                    self.list.push(h, state_id, Some(op));
                    ctx.stats.increment_generated_states();
                }
            }
        }
    }

    /// Forced re-insertion entry shared by the lazy drivers. The node is
    /// (re-)opened and closed again once its entry is popped.
    pub fn insert_node(&mut self, ctx: &mut SearchContext, state_id: StateId) {
        {
            let node = ctx.space.node_mut(state_id);
            if node.is_new() {
                node.open();
            } else if node.is_closed() {
                node.reopen();
            }
        }
        let h = ctx.space.node(state_id).get_h();
        self.list.push(h, state_id, None);
    }
}
