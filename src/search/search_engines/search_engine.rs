use crate::search::{
    heuristics::{Heuristic, HeuristicRequest, HeuristicResult},
    search_engines::{
        AstarEngine, EhcEngine, LazyEngine, SearchNode, SearchSpace, SearchStatistics,
    },
    states::{State, StateId},
    Cost, OpId, SuccessorGenerator, Task,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::info;

/// Final outcome of a search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    /// A plan reaching the goal was found.
    Found(crate::search::Plan),
    /// The search space is exhausted without reaching the goal.
    NotFound,
    /// The abort flag was raised or the progress callback asked to stop.
    Aborted,
}

/// Outcome of a single driver step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepResult {
    Continue,
    Found,
    NotFound,
    Abort,
}

/// The search drivers this crate ships.
#[derive(clap::ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[clap(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SearchKind {
    /// A*; optimal under an admissible heuristic.
    Astar,
    /// Enforced hill climbing; satisficing.
    Ehc,
    /// Lazy best-first search; satisficing.
    Lazy,
}

/// How the lazy drivers use preferred operators.
#[derive(clap::ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[clap(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PreferredOpsMode {
    /// Expand all applicable operators in generator order.
    #[default]
    Ignore,
    /// Expand preferred operators first, then the rest.
    Prioritize,
    /// Expand preferred operators only; incomplete.
    Only,
}

/// Verdict of a progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressAction {
    Continue,
    Abort,
}

pub type ProgressFn = Box<dyn FnMut(&SearchStatistics) -> ProgressAction>;

/// Periodic progress reporting: the callback runs synchronously every `freq`
/// driver steps and may abort the search.
pub struct Progress {
    pub freq: u64,
    pub callback: ProgressFn,
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress").field("freq", &self.freq).finish()
    }
}

#[derive(Debug, Default)]
pub struct SearchConfig {
    /// Apply the pathmax correction in A*.
    pub pathmax: bool,
    pub preferred_ops: PreferredOpsMode,
    pub progress: Option<Progress>,
}

/// Shared driver state: the task, the search space over the state pool, the
/// successor generator, the heuristic and the run statistics.
#[derive(Debug)]
pub(crate) struct SearchContext {
    pub task: Task,
    pub space: SearchSpace,
    pub succ_gen: SuccessorGenerator,
    pub heuristic: Box<dyn Heuristic>,
    pub stats: SearchStatistics,
    pub goal_state: Option<StateId>,
}

impl SearchContext {
    pub fn applicable_ops(&self, state_id: StateId) -> Vec<OpId> {
        let state = self.space.state(state_id);
        self.succ_gen.applicable_ops(&state)
    }

    pub fn apply_op(&mut self, op: OpId, state_id: StateId) -> StateId {
        self.space.apply_op(&self.task.operators[op], state_id)
    }

    pub fn evaluate_node(
        &mut self,
        state_id: StateId,
        applicable: Option<&[OpId]>,
    ) -> HeuristicResult {
        let request = HeuristicRequest {
            applicable_ops: applicable,
            save_landmarks: false,
        };
        let result = self.heuristic.evaluate_node(state_id, &self.space, &request);
        self.stats.increment_evaluated_states();
        result
    }

    /// Records the goal state when `state_id` satisfies the goal.
    pub fn check_goal(&mut self, state_id: StateId) -> bool {
        if self.space.satisfies(&self.task.goal, state_id) {
            self.goal_state = Some(state_id);
            true
        } else {
            false
        }
    }
}

/// One search driver. Engines are step machines over a [`SearchContext`];
/// the run loop lives in [`Search`].
pub(crate) trait SearchEngine: fmt::Debug {
    fn init_step(&mut self, ctx: &mut SearchContext) -> StepResult;
    fn step(&mut self, ctx: &mut SearchContext) -> StepResult;
    /// Forces (re-)insertion of a node, reopening it when closed. Used by
    /// callers that reset g-values from the outside.
    fn insert_node(&mut self, ctx: &mut SearchContext, state_id: StateId);
}

/// Thread-safe cancellation for a running search.
#[derive(Debug, Clone)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// A configured search: driver, heuristic and task. `run` is a blocking
/// loop; the only cross-thread interaction is the abort flag.
#[derive(Debug)]
pub struct Search {
    engine: Box<dyn SearchEngine>,
    ctx: SearchContext,
    abort: Arc<AtomicBool>,
    progress: Option<Progress>,
}

impl Search {
    pub fn new(
        kind: SearchKind,
        task: Task,
        heuristic: Box<dyn Heuristic>,
        config: SearchConfig,
    ) -> Self {
        let space = SearchSpace::new(&task);
        let succ_gen = SuccessorGenerator::new(&task);
        let engine: Box<dyn SearchEngine> = match kind {
            SearchKind::Astar => Box::new(AstarEngine::new(config.pathmax)),
            SearchKind::Ehc => Box::new(EhcEngine::new(config.preferred_ops)),
            SearchKind::Lazy => Box::new(LazyEngine::new(config.preferred_ops)),
        };
        Self {
            engine,
            ctx: SearchContext {
                task,
                space,
                succ_gen,
                heuristic,
                stats: SearchStatistics::new(),
                goal_state: None,
            },
            abort: Arc::new(AtomicBool::new(false)),
            progress: config.progress,
        }
    }

    /// Runs the search to completion. Blocking; check-points the abort flag
    /// once per step and invokes the progress callback every `freq` steps.
    pub fn run(&mut self) -> SearchResult {
        info!(
            operators = self.ctx.task.operators.len(),
            variables = self.ctx.task.num_variables(),
            "search started"
        );

        let mut result = self.engine.init_step(&mut self.ctx);
        let mut steps_since_progress = 0u64;
        while result == StepResult::Continue {
            if self.abort.load(Ordering::Relaxed) {
                result = StepResult::Abort;
                break;
            }
            result = self.engine.step(&mut self.ctx);
            self.ctx.stats.increment_steps();
            steps_since_progress += 1;

            if result == StepResult::Continue {
                if let Some(progress) = &mut self.progress {
                    if steps_since_progress >= progress.freq {
                        steps_since_progress = 0;
                        self.ctx.stats.update_elapsed();
                        if (progress.callback)(&self.ctx.stats) == ProgressAction::Abort {
                            result = StepResult::Abort;
                        }
                    }
                }
            }
        }
        self.ctx.stats.update_elapsed();

        // One final progress report unless the callback itself aborted.
        if result != StepResult::Abort && steps_since_progress > 0 {
            if let Some(progress) = &mut self.progress {
                (progress.callback)(&self.ctx.stats);
            }
        }
        self.ctx.stats.log();

        match result {
            StepResult::Found => {
                let goal_state = self.ctx.goal_state.expect("goal state recorded");
                let plan = self.ctx.space.extract_plan(goal_state);
                info!(
                    plan_length = plan.len(),
                    plan_cost = plan.cost(&self.ctx.task),
                    "plan found"
                );
                SearchResult::Found(plan)
            }
            StepResult::NotFound => {
                info!("search space exhausted");
                SearchResult::NotFound
            }
            StepResult::Abort => SearchResult::Aborted,
            StepResult::Continue => unreachable!("loop exits on a terminal result"),
        }
    }

    /// Handle for aborting the run from another thread.
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle(self.abort.clone())
    }

    pub fn statistics(&self) -> &SearchStatistics {
        &self.ctx.stats
    }

    pub fn task(&self) -> &Task {
        &self.ctx.task
    }

    /// The h-value stored for a discovered state.
    pub fn state_heuristic(&self, state_id: StateId) -> Cost {
        self.ctx.space.node(state_id).get_h()
    }

    pub fn load_state(&self, state_id: StateId) -> State {
        self.ctx.space.state(state_id)
    }

    pub fn load_node(&self, state_id: StateId) -> &SearchNode {
        self.ctx.space.node(state_id)
    }

    /// Forces (re-)insertion of a discovered state into the driver's list.
    pub fn insert_node(&mut self, state_id: StateId) {
        self.engine.insert_node(&mut self.ctx, state_id);
    }

    /// Number of states discovered so far.
    pub fn num_states(&self) -> usize {
        self.ctx.space.num_states()
    }
}
