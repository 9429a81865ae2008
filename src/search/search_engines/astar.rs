use crate::search::{
    search_engines::{SearchContext, SearchEngine, StepResult, TieBreakingOpenList},
    states::{StateId, NO_STATE},
    OpId, DEAD_END,
};

/// A*: open list keyed by (f, h) with f = g + max(h, 0), ties broken by
/// lower h and FIFO order. Optimal for admissible heuristics; closed nodes
/// are reopened when a cheaper path to them shows up.
#[derive(Debug)]
pub(crate) struct AstarEngine {
    open: TieBreakingOpenList,
    pathmax: bool,
}

impl AstarEngine {
    pub fn new(pathmax: bool) -> Self {
        Self {
            open: TieBreakingOpenList::new(),
            pathmax,
        }
    }

    /// Updates path data of `state_id` and inserts it into the open list.
    /// New nodes get evaluated here; known nodes keep their h-value.
    fn insert_state(
        &mut self,
        ctx: &mut SearchContext,
        state_id: StateId,
        op: Option<OpId>,
        parent: Option<StateId>,
    ) {
        let (parent_g, parent_h, parent_id) = match parent {
            Some(parent_id) => {
                let node = ctx.space.node(parent_id);
                (node.get_g(), node.get_h(), parent_id)
            }
            None => (0, 0, NO_STATE),
        };
        let op_cost = op.map_or(0, |op_id| ctx.task.operators[op_id].cost);
        let g = parent_g + op_cost;

        ctx.space.node_mut(state_id).update_path(parent_id, op, g);

        let h = if ctx.space.node(state_id).is_new() {
            ctx.space.node_mut(state_id).open();
            let mut h = ctx.evaluate_node(state_id, None).value;
            if self.pathmax && op.is_some() && parent.is_some() && h != DEAD_END {
                h = h.max(parent_h - op_cost);
            }
            h
        } else {
            if ctx.space.node(state_id).is_closed() {
                ctx.space.node_mut(state_id).reopen();
                ctx.stats.increment_reopened_states();
            }
            ctx.space.node(state_id).get_h()
        };
        ctx.space.node_mut(state_id).set_h(h);

        if h == DEAD_END {
            ctx.stats.increment_dead_end_states();
            return;
        }

        let h_key = h.max(0);
        self.open.push((g + h_key, h_key), state_id);
        ctx.stats.increment_generated_states();
    }
}

impl SearchEngine for AstarEngine {
    fn init_step(&mut self, ctx: &mut SearchContext) -> StepResult {
        let init_id = ctx.space.insert_state(&ctx.task.initial_state);
        self.insert_state(ctx, init_id, None, None);
        StepResult::Continue
    }

    fn step(&mut self, ctx: &mut SearchContext) -> StepResult {
        let Some((_, state_id)) = self.open.pop() else {
            return StepResult::NotFound;
        };

        // Stale entries of nodes that were closed (or reopened with a better
        // key) in the meantime are skipped.
        if !ctx.space.node(state_id).is_open() {
            return StepResult::Continue;
        }

        // A goal state ends the search before it is expanded, so it never
        // gets closed.
        if ctx.check_goal(state_id) {
            return StepResult::Found;
        }
        ctx.space.node_mut(state_id).close();

        let applicable = ctx.applicable_ops(state_id);
        ctx.stats.increment_expanded_states();
        let g = ctx.space.node(state_id).get_g();

        for op_id in applicable {
            let next_id = ctx.apply_op(op_id, state_id);
            let next_g = g + ctx.task.operators[op_id].cost;
            let next_node = ctx.space.node(next_id);
            if next_node.is_new() || next_g < next_node.get_g() {
                self.insert_state(ctx, next_id, Some(op_id), Some(state_id));
            }
        }
        StepResult::Continue
    }

    fn insert_node(&mut self, ctx: &mut SearchContext, state_id: StateId) {
        {
            let node = ctx.space.node_mut(state_id);
            if node.is_new() {
                node.open();
            } else if node.is_closed() {
                node.reopen();
            }
        }
        let node = ctx.space.node(state_id);
        let h_key = node.get_h().max(0);
        self.open.push((node.get_g() + h_key, h_key), state_id);
    }
}
