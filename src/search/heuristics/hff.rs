use crate::search::{
    heuristics::{
        CostTransform, Heuristic, HeuristicRequest, HeuristicResult, RelaxationEngine,
        RelaxationKind,
    },
    states::State,
    Task,
};

/// The FF heuristic: cost of a relaxed plan extracted from the additive
/// exploration. Also the source of preferred operators.
#[derive(Debug)]
pub struct FfHeuristic {
    engine: RelaxationEngine,
}

impl FfHeuristic {
    pub fn new(task: &Task, cost: CostTransform) -> Self {
        Self {
            engine: RelaxationEngine::new(task, RelaxationKind::Ff, cost),
        }
    }
}

impl Heuristic for FfHeuristic {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::DEAD_END;
    use crate::test_utils::*;

    fn hff(task: &Task) -> FfHeuristic {
        FfHeuristic::new(task, CostTransform::default())
    }

    #[test]
    fn initial_state_values() {
        for (task, expected) in [
            (single_switch_task(), 3),
            (two_switches_task(), 7),
            (chain_task(), 5),
            (unlock_task(), 2),
        ] {
            let value = hff(&task)
                .evaluate(&task.initial_state, &HeuristicRequest::value_only())
                .value;
            assert_eq!(value, expected);
        }
    }

    #[test]
    fn counts_shared_work_once() {
        // Unlike h^add, the relaxed plan pays the shared achiever once.
        let task = shared_subgoal_task();
        let value = hff(&task)
            .evaluate(&task.initial_state, &HeuristicRequest::value_only())
            .value;
        assert_eq!(value, 5);
    }

    #[test]
    fn preferred_ops_are_applicable_relaxed_plan_ops() {
        let task = unlock_task();
        let applicable = vec![1];
        let result = hff(&task).evaluate(
            &task.initial_state,
            &HeuristicRequest::with_applicable_ops(&applicable),
        );
        assert_eq!(result.value, 2);
        assert_eq!(result.preferred_ops, vec![1]);
        for op in &result.preferred_ops {
            assert!(applicable.contains(op));
        }
    }

    #[test]
    fn dead_end_reports_no_preferred_ops() {
        let task = no_ops_task();
        let result = hff(&task).evaluate(
            &task.initial_state,
            &HeuristicRequest::with_applicable_ops(&[]),
        );
        assert_eq!(result.value, DEAD_END);
        assert!(result.preferred_ops.is_empty());
    }
}
