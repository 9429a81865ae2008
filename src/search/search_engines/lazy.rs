use crate::search::{
    search_engines::{
        LazyBase, LazyHeapList, PreferredOpsMode, SearchContext, SearchEngine, StepResult,
    },
    states::StateId,
    DEAD_END,
};

/// Lazy best-first search: deferred expansions ordered by the parent's
/// heuristic value, successors evaluated only when their entry is popped.
#[derive(Debug)]
pub(crate) struct LazyEngine {
    base: LazyBase,
}

impl LazyEngine {
    pub fn new(preferred_mode: PreferredOpsMode) -> Self {
        Self {
            base: LazyBase::new(Box::new(LazyHeapList::new()), preferred_mode),
        }
    }
}

impl SearchEngine for LazyEngine {
    fn init_step(&mut self, ctx: &mut SearchContext) -> StepResult {
        self.base.init_step(ctx)
    }

    fn step(&mut self, ctx: &mut SearchContext) -> StepResult {
        let (result, state_id) = self.base.next(ctx);
        let Some(state_id) = state_id else {
            return result;
        };

        if ctx.space.node(state_id).get_h() != DEAD_END {
            self.base.expand(ctx, state_id);
        }
        StepResult::Continue
    }

    fn insert_node(&mut self, ctx: &mut SearchContext, state_id: StateId) {
        self.base.insert_node(ctx, state_id);
    }
}
