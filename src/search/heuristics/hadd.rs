use crate::search::{
    heuristics::{
        CostTransform, Heuristic, HeuristicRequest, HeuristicResult, RelaxationEngine,
        RelaxationKind,
    },
    states::State,
    Task,
};

/// The additive heuristic: relaxed goal costs summed over preconditions.
/// Cheap and informative, but it counts shared subgoals twice and is
/// therefore inadmissible.
#[derive(Debug)]
pub struct HaddHeuristic {
    engine: RelaxationEngine,
}

impl HaddHeuristic {
    pub fn new(task: &Task, cost: CostTransform) -> Self {
        Self {
            engine: RelaxationEngine::new(task, RelaxationKind::Add, cost),
        }
    }
}

impl Heuristic for HaddHeuristic {
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
