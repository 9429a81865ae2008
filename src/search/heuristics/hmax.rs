use crate::search::{
    heuristics::{
        CostTransform, Heuristic, HeuristicRequest, HeuristicResult, RelaxationEngine,
        RelaxationKind,
    },
    states::State,
    PartialState, Task,
};

/// The admissible h^max heuristic: the relaxed cost of the most expensive
/// goal fact.
#[derive(Debug)]
pub struct HmaxHeuristic {
    engine: RelaxationEngine,
}

impl HmaxHeuristic {
    pub fn new(task: &Task, cost: CostTransform) -> Self {
        Self {
            engine: RelaxationEngine::new(task, RelaxationKind::Max, cost),
        }
    }

    /// h^max of `state` against an arbitrary goal.
    pub fn evaluate_with_goal(&mut self, state: &State, goal: &PartialState) -> HeuristicResult {
        HeuristicResult::from_value(self.engine.evaluate_with_goal(state, goal))
    }
}

impl Heuristic for HmaxHeuristic {
    fn evaluate(&mut self, state: &State, request: &HeuristicRequest) -> HeuristicResult {
        match request.applicable_ops {
            Some(applicable) => {
                let (value, preferred) = self.engine.evaluate_with_preferred(state, applicable);
                HeuristicResult {
                    value,
                    preferred_ops: preferred,
                    ..HeuristicResult::from_value(value)
                }
            }
            None => HeuristicResult::from_value(self.engine.evaluate(state)),
        }
    }
}
