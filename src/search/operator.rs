use crate::search::{states::State, Cost, PartialState};

/// Index of an operator in its task. Operator order in the task defines the
/// ids.
pub type OpId = usize;

/// An effect that fires only when its own condition holds in the state the
/// operator is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalEffect {
    pub condition: PartialState,
    pub effect: PartialState,
}

/// A grounded operator: precondition and effect partial states, an optional
/// list of conditional effects and a non-negative cost.
#[derive(Debug, Clone)]
pub struct Operator {
    pub name: String,
    pub cost: Cost,
    pub pre: PartialState,
    pub eff: PartialState,
    pub cond_effects: Vec<ConditionalEffect>,
    id: OpId,
}

impl Operator {
    pub fn new(name: impl Into<String>, cost: Cost, pre: PartialState, eff: PartialState) -> Self {
        Self {
            name: name.into(),
            cost,
            pre,
            eff,
            cond_effects: Vec::new(),
            id: usize::MAX,
        }
    }

    pub fn with_cond_effect(mut self, condition: PartialState, effect: PartialState) -> Self {
        self.cond_effects.push(ConditionalEffect { condition, effect });
        self
    }

    pub fn id(&self) -> OpId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: OpId) {
        self.id = id;
    }

    pub fn is_applicable(&self, state: &State) -> bool {
        self.pre.is_subset_of_state(state)
    }

    /// Applies the operator to `state`. The unconditional effect always
    /// fires; each conditional effect fires iff its condition holds in the
    /// state *before* application.
    pub fn apply(&self, state: &State) -> State {
        debug_assert!(self.is_applicable(state));
        let mut next = state.clone();
        self.eff.apply_to(&mut next);
        for cond_eff in &self.cond_effects {
            if cond_eff.condition.is_subset_of_state(state) {
                cond_eff.effect.apply_to(&mut next);
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ps(pairs: &[(usize, usize)]) -> PartialState {
        PartialState::new(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn applicability_follows_precondition() {
        let op = Operator::new("flip", 1, ps(&[(0, 0)]), ps(&[(0, 1)]));
        assert!(op.is_applicable(&State::new(vec![0])));
        assert!(!op.is_applicable(&State::new(vec![1])));
    }

    #[test]
    fn conditional_effect_triggers_on_pre_application_state() {
        let op = Operator::new("set", 1, PartialState::empty(), ps(&[(0, 1)]))
            .with_cond_effect(ps(&[(1, 1)]), ps(&[(2, 1)]));

        // Condition holds before application, so both effects fire.
        let fired = op.apply(&State::new(vec![0, 1, 0]));
        assert_eq!(fired.values(), &[1, 1, 1]);

        // Condition does not hold, only the unconditional effect fires.
        let skipped = op.apply(&State::new(vec![0, 0, 0]));
        assert_eq!(skipped.values(), &[1, 0, 0]);
    }

    #[test]
    fn conditional_effect_reads_old_value_of_changed_variable() {
        // The unconditional effect overwrites the variable the condition
        // reads. Triggering must still see the old value.
        let op = Operator::new("swap", 1, PartialState::empty(), ps(&[(0, 1)]))
            .with_cond_effect(ps(&[(0, 0)]), ps(&[(1, 1)]));
        let next = op.apply(&State::new(vec![0, 0]));
        assert_eq!(next.values(), &[1, 1]);
    }
}
