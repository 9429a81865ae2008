use crate::search::{
    heuristics::{
        CostTransform, FfHeuristic, HaddHeuristic, Hmax2Heuristic, HmaxHeuristic, LandmarkSet,
        LmCutHeuristic,
    },
    search_engines::SearchSpace,
    states::{State, StateId},
    Cost, OpId, Task, DEAD_END,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the caller wants out of an evaluation besides the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicRequest<'a> {
    /// Operators applicable in the evaluated state. When given, heuristics
    /// that extract a relaxed plan report the preferred subset.
    pub applicable_ops: Option<&'a [OpId]>,
    /// Ask heuristics that produce landmarks to return them.
    pub save_landmarks: bool,
}

impl<'a> HeuristicRequest<'a> {
    pub fn value_only() -> Self {
        Self::default()
    }

    pub fn with_applicable_ops(ops: &'a [OpId]) -> Self {
        Self {
            applicable_ops: Some(ops),
            save_landmarks: false,
        }
    }
}

/// Result of one evaluation. `preferred_ops` and `landmarks` stay empty for
/// heuristics that cannot produce them.
#[derive(Debug, Clone)]
pub struct HeuristicResult {
    pub value: Cost,
    pub preferred_ops: Vec<OpId>,
    pub landmarks: LandmarkSet,
}

impl HeuristicResult {
    pub fn from_value(value: Cost) -> Self {
        Self {
            value,
            preferred_ops: Vec::new(),
            landmarks: LandmarkSet::new(),
        }
    }

    pub fn is_dead_end(&self) -> bool {
        self.value == DEAD_END
    }
}

/// A state evaluator. Heuristics are stateful objects that reuse their
/// working buffers across calls.
pub trait Heuristic: std::fmt::Debug {
    /// Evaluates a state with respect to the task goal.
    fn evaluate(&mut self, state: &State, request: &HeuristicRequest) -> HeuristicResult;

    /// Evaluates a registered state. Incremental heuristics override this to
    /// look at the node's parent; the default just loads the state.
    fn evaluate_node(
        &mut self,
        state_id: StateId,
        space: &SearchSpace,
        request: &HeuristicRequest,
    ) -> HeuristicResult {
        let state = space.state(state_id);
        self.evaluate(&state, request)
    }
}

/// The heuristics this crate ships.
#[derive(clap::ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[clap(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum HeuristicKind {
    Add,
    Max,
    Ff,
    LmCut,
    LmCutIncLocal,
    LmCutIncCache,
}

/// Modifiers accepted by the heuristic factory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeuristicFlags {
    pub unit_cost: bool,
    pub cost_plus_one: bool,
    /// Evaluate over the pair-fact extension of the fact space.
    pub h2: bool,
    /// Let the cache-incremental LM-Cut prune parent entries.
    pub cache_prune: bool,
}

impl HeuristicFlags {
    fn cost(&self) -> CostTransform {
        CostTransform {
            unit_cost: self.unit_cost,
            cost_plus_one: self.cost_plus_one,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeuristicSetupError {
    #[error("the pair-fact extension does not support conditional effects")]
    H2WithConditionalEffects,
    #[error("the pair-fact extension is only available for the max heuristic")]
    H2Unsupported,
}

impl HeuristicKind {
    pub fn create(
        &self,
        task: &Task,
        flags: HeuristicFlags,
    ) -> Result<Box<dyn Heuristic>, HeuristicSetupError> {
        let cost = flags.cost();
        if flags.h2 {
            return match self {
                HeuristicKind::Max => Ok(Box::new(Hmax2Heuristic::new(task, cost)?)),
                _ => Err(HeuristicSetupError::H2Unsupported),
            };
        }
        Ok(match self {
            HeuristicKind::Add => Box::new(HaddHeuristic::new(task, cost)),
            HeuristicKind::Max => Box::new(HmaxHeuristic::new(task, cost)),
            HeuristicKind::Ff => Box::new(FfHeuristic::new(task, cost)),
            HeuristicKind::LmCut => Box::new(LmCutHeuristic::new(task, cost)),
            HeuristicKind::LmCutIncLocal => {
                Box::new(LmCutHeuristic::new_incremental_local(task, cost))
            }
            HeuristicKind::LmCutIncCache => Box::new(LmCutHeuristic::new_incremental_cached(
                task,
                cost,
                flags.cache_prune,
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn factory_builds_every_kind() {
        let task = chain_task();
        for kind in [
            HeuristicKind::Add,
            HeuristicKind::Max,
            HeuristicKind::Ff,
            HeuristicKind::LmCut,
            HeuristicKind::LmCutIncLocal,
            HeuristicKind::LmCutIncCache,
        ] {
            let mut heuristic = kind.create(&task, HeuristicFlags::default()).unwrap();
            let result = heuristic.evaluate(&task.initial_state, &HeuristicRequest::value_only());
            assert_eq!(result.value, 5, "{kind:?}");
        }
    }

    #[test]
    fn unit_cost_flag_changes_values() {
        let task = chain_task();
        let flags = HeuristicFlags {
            unit_cost: true,
            ..Default::default()
        };
        let mut hmax = HeuristicKind::Max.create(&task, flags).unwrap();
        let result = hmax.evaluate(&task.initial_state, &HeuristicRequest::value_only());
        assert_eq!(result.value, 2);
    }

    #[test]
    fn h2_is_rejected_outside_the_max_family() {
        let task = chain_task();
        let flags = HeuristicFlags {
            h2: true,
            ..Default::default()
        };
        assert_eq!(
            HeuristicKind::LmCut.create(&task, flags).unwrap_err(),
            HeuristicSetupError::H2Unsupported
        );
        assert!(HeuristicKind::Max.create(&task, flags).is_ok());
    }
}
