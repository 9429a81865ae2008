use crate::search::{states::State, Operator, PartialState, Variable};
use thiserror::Error;
use tracing::info;

/// Structural violations of the task model, detected when the task is built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidTaskError {
    #[error("variable {0} has an empty range")]
    EmptyVariableRange(usize),
    #[error("initial state assigns {actual} variables, task has {expected}")]
    InitialStateSize { expected: usize, actual: usize },
    #[error("value {val} of variable {var} is outside its range")]
    ValueOutOfRange { var: usize, val: usize },
    #[error("variable {0} is referenced but does not exist")]
    UnknownVariable(usize),
    #[error("operator {0} has a negative cost")]
    NegativeCost(String),
    #[error("operator {op} assigns two values to variable {var}")]
    ConflictingEffect { op: String, var: usize },
    #[error("partial state assigns two values to variable {0}")]
    ConflictingAssignment(usize),
    #[error("variable order is not a permutation of the task variables")]
    InvalidVariableOrder,
}

/// An immutable SAS+ planning task: finite-domain variables, a total initial
/// state, a partial goal and grounded operators. Operator order defines the
/// global operator ids.
#[derive(Debug, Clone)]
pub struct Task {
    pub variables: Vec<Variable>,
    pub initial_state: State,
    pub goal: PartialState,
    pub operators: Vec<Operator>,
    /// Variable order used by the successor generator. Defaults to the
    /// task's variable order; front ends that run causal-graph analysis
    /// supply a better one.
    pub variable_order: Option<Vec<usize>>,
}

impl Task {
    pub fn new(
        variables: Vec<Variable>,
        initial_state: State,
        goal: PartialState,
        mut operators: Vec<Operator>,
    ) -> Result<Self, InvalidTaskError> {
        for (id, op) in operators.iter_mut().enumerate() {
            op.assign_id(id);
        }
        let task = Self {
            variables,
            initial_state,
            goal,
            operators,
            variable_order: None,
        };
        task.validate()?;
        info!(
            variables = task.variables.len(),
            operators = task.operators.len(),
            goal_size = task.goal.len(),
            "task constructed"
        );
        Ok(task)
    }

    pub fn with_variable_order(mut self, order: Vec<usize>) -> Result<Self, InvalidTaskError> {
        let mut seen = vec![false; self.variables.len()];
        if order.len() != self.variables.len() {
            return Err(InvalidTaskError::InvalidVariableOrder);
        }
        for &var in &order {
            if var >= seen.len() || seen[var] {
                return Err(InvalidTaskError::InvalidVariableOrder);
            }
            seen[var] = true;
        }
        self.variable_order = Some(order);
        Ok(self)
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn goal_satisfied(&self, state: &State) -> bool {
        self.goal.is_subset_of_state(state)
    }

    fn validate(&self) -> Result<(), InvalidTaskError> {
        for (var, variable) in self.variables.iter().enumerate() {
            if variable.range == 0 {
                return Err(InvalidTaskError::EmptyVariableRange(var));
            }
        }

        if self.initial_state.len() != self.variables.len() {
            return Err(InvalidTaskError::InitialStateSize {
                expected: self.variables.len(),
                actual: self.initial_state.len(),
            });
        }
        for (var, &val) in self.initial_state.values().iter().enumerate() {
            self.check_value(var, val)?;
        }
        self.check_partial(&self.goal)?;

        for op in &self.operators {
            if op.cost < 0 {
                return Err(InvalidTaskError::NegativeCost(op.name.clone()));
            }
            self.check_partial(&op.pre)?;
            self.check_partial(&op.eff)?;
            for cond_eff in &op.cond_effects {
                self.check_partial(&cond_eff.condition)?;
                self.check_partial(&cond_eff.effect)?;
            }
            self.check_effect_conflicts(op)?;
        }
        Ok(())
    }

    fn check_value(&self, var: usize, val: usize) -> Result<(), InvalidTaskError> {
        let variable = self
            .variables
            .get(var)
            .ok_or(InvalidTaskError::UnknownVariable(var))?;
        if val >= variable.range {
            return Err(InvalidTaskError::ValueOutOfRange { var, val });
        }
        Ok(())
    }

    fn check_partial(&self, partial: &PartialState) -> Result<(), InvalidTaskError> {
        for (var, val) in partial.iter() {
            self.check_value(var, val)?;
        }
        Ok(())
    }

    /// Two effects of one operator must never disagree on a variable: the
    /// unconditional effect against every conditional effect, and every pair
    /// of conditional effects against each other.
    fn check_effect_conflicts(&self, op: &Operator) -> Result<(), InvalidTaskError> {
        let conflict = |a: &PartialState, b: &PartialState| -> Option<usize> {
            a.iter().find_map(|(var, val)| match b.get(var) {
                Some(other) if other != val => Some(var),
                _ => None,
            })
        };

        for cond_eff in &op.cond_effects {
            if let Some(var) = conflict(&op.eff, &cond_eff.effect) {
                return Err(InvalidTaskError::ConflictingEffect {
                    op: op.name.clone(),
                    var,
                });
            }
        }
        for (i, a) in op.cond_effects.iter().enumerate() {
            for b in &op.cond_effects[i + 1..] {
                if let Some(var) = conflict(&a.effect, &b.effect) {
                    return Err(InvalidTaskError::ConflictingEffect {
                        op: op.name.clone(),
                        var,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn operators_get_positional_ids() {
        let task = chain_task();
        for (i, op) in task.operators.iter().enumerate() {
            assert_eq!(op.id(), i);
        }
    }

    #[test]
    fn rejects_out_of_range_initial_value() {
        let err = Task::new(
            vec![Variable::new("v", 2)],
            State::new(vec![2]),
            PartialState::empty(),
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, InvalidTaskError::ValueOutOfRange { var: 0, val: 2 });
    }

    #[test]
    fn rejects_negative_cost() {
        let err = Task::new(
            vec![Variable::new("v", 2)],
            State::new(vec![0]),
            PartialState::empty(),
            vec![Operator::new(
                "bad",
                -1,
                PartialState::empty(),
                ps(&[(0, 1)]),
            )],
        )
        .unwrap_err();
        assert_eq!(err, InvalidTaskError::NegativeCost("bad".to_string()));
    }

    #[test]
    fn rejects_conflicting_conditional_effect() {
        let op = Operator::new("clash", 1, PartialState::empty(), ps(&[(0, 1)]))
            .with_cond_effect(ps(&[(1, 1)]), ps(&[(0, 0)]));
        let err = Task::new(
            vec![Variable::new("a", 2), Variable::new("b", 2)],
            State::new(vec![0, 0]),
            PartialState::empty(),
            vec![op],
        )
        .unwrap_err();
        assert_eq!(
            err,
            InvalidTaskError::ConflictingEffect {
                op: "clash".to_string(),
                var: 0
            }
        );
    }

    #[test]
    fn variable_order_must_be_permutation() {
        let task = chain_task();
        assert!(task.clone().with_variable_order(vec![0]).is_ok());
        let two = two_switches_task();
        assert!(two.clone().with_variable_order(vec![1, 0]).is_ok());
        assert_eq!(
            two.clone().with_variable_order(vec![0, 0]).unwrap_err(),
            InvalidTaskError::InvalidVariableOrder
        );
        assert_eq!(
            two.with_variable_order(vec![0]).unwrap_err(),
            InvalidTaskError::InvalidVariableOrder
        );
    }
}
