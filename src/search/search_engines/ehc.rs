use crate::search::{
    search_engines::{
        LazyBase, LazyFifoList, PreferredOpsMode, SearchContext, SearchEngine, StepResult,
    },
    states::StateId,
    Cost, COST_MAX, DEAD_END,
};
use tracing::debug;

/// Enforced hill climbing: breadth-first search through a FIFO of deferred
/// expansions, restarted from scratch whenever a state improves on the best
/// heuristic value seen so far. Satisficing and incomplete.
#[derive(Debug)]
pub(crate) struct EhcEngine {
    base: LazyBase,
    best_h: Cost,
}

impl EhcEngine {
    pub fn new(preferred_mode: PreferredOpsMode) -> Self {
        Self {
            base: LazyBase::new(Box::new(LazyFifoList::new()), preferred_mode),
            best_h: COST_MAX,
        }
    }
}

impl SearchEngine for EhcEngine {
    fn init_step(&mut self, ctx: &mut SearchContext) -> StepResult {
        self.best_h = COST_MAX;
        self.base.init_step(ctx)
    }

    fn step(&mut self, ctx: &mut SearchContext) -> StepResult {
        let (result, state_id) = self.base.next(ctx);
        let Some(state_id) = state_id else {
            return result;
        };

        let h = ctx.space.node(state_id).get_h();
        if h != DEAD_END {
            if h < self.best_h {
                // Improvement: restart the breadth-first layer here.
                self.base.list.clear();
                self.best_h = h;
                debug!(h = self.best_h, "hill climbing improvement");
            }
            self.base.expand(ctx, state_id);
        }
        StepResult::Continue
    }

    fn insert_node(&mut self, ctx: &mut SearchContext, state_id: StateId) {
        self.base.insert_node(ctx, state_id);
    }
}
