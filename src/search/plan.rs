//! The result of a successful search: the operator sequence leading from the
//! initial state into a goal state, together with the traversed state ids.

use crate::search::{states::StateId, Cost, OpId, Task};
use std::ops::Deref;

/// One plan step: the applied operator and the state ids it connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanStep {
    pub op: OpId,
    pub from: StateId,
    pub to: StateId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plan {
    steps: Vec<PlanStep>,
}

impl Plan {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total cost of the plan under the task's operator costs.
    pub fn cost(&self, task: &Task) -> Cost {
        self.steps
            .iter()
            .map(|step| task.operators[step.op].cost)
            .sum()
    }

    /// Renders the plan as one operator name per line.
    pub fn to_string(&self, task: &Task) -> String {
        self.steps
            .iter()
            .map(|step| task.operators[step.op].name.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Deref for Plan {
    type Target = [PlanStep];

    fn deref(&self) -> &Self::Target {
        &self.steps
    }
}

impl IntoIterator for Plan {
    type Item = PlanStep;
    type IntoIter = std::vec::IntoIter<PlanStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}
