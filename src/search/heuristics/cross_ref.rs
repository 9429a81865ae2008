use crate::search::{
    heuristics::FactIndex, Cost, OpId, PartialState, SuccessorGenerator, Task,
};
use itertools::Itertools;

/// Cost transforms shared by all heuristic families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostTransform {
    /// Treat every operator as if it cost 1.
    pub unit_cost: bool,
    /// Add 1 to every operator cost.
    pub cost_plus_one: bool,
}

impl CostTransform {
    pub fn apply(&self, cost: Cost) -> Cost {
        let cost = if self.unit_cost { 1 } else { cost };
        if self.cost_plus_one {
            cost + 1
        } else {
            cost
        }
    }
}

/// Build options for [`FactOpCrossRef`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossRefOptions {
    /// Add the artificial goal fact and the zero-cost goal operator.
    pub with_goal_op: bool,
    /// Also build the fact -> achieving-operators table.
    pub with_fact_eff: bool,
    /// Drop effects that a cheaper co-applicable operator also achieves.
    pub simplify: bool,
    pub cost: CostTransform,
}

/// The propositional bipartite view of a task: operators (including one
/// virtual operator per conditional effect and, optionally, the artificial
/// goal operator) cross-referenced with facts.
///
/// Layout invariants: entries `0..base_op_count` are the task operators in id
/// order, virtual conditional-effect operators follow, the goal operator is
/// last. Facts `0..num_unary_facts` are the unary facts, then the goal fact
/// (if built), then the empty-precondition fact. All id lists are sorted and
/// duplicate-free.
#[derive(Debug)]
pub struct FactOpCrossRef {
    pub fact_index: FactIndex,
    pub fact_count: usize,
    pub goal_fact: Option<usize>,
    pub nopre_fact: usize,
    pub op_pre: Vec<Vec<usize>>,
    pub op_eff: Vec<Vec<usize>>,
    pub fact_pre: Vec<Vec<usize>>,
    pub fact_eff: Vec<Vec<usize>>,
    pub op_cost: Vec<Cost>,
    /// The task operator each entry stands for; None for the goal operator.
    pub op_owner: Vec<Option<OpId>>,
    pub goal_op: Option<usize>,
    pub goal_facts: Vec<usize>,
    pub base_op_count: usize,
}

impl FactOpCrossRef {
    pub fn new(task: &Task, options: &CrossRefOptions) -> Self {
        let fact_index = FactIndex::new(&task.variables);
        let unary = fact_index.num_unary_facts();

        let goal_fact = options.with_goal_op.then_some(unary);
        let nopre_fact = if options.with_goal_op { unary + 1 } else { unary };
        let fact_count = nopre_fact + 1;

        let goal_facts = fact_index.partial_state_facts(&task.goal);

        let mut op_pre = Vec::new();
        let mut op_eff = Vec::new();
        let mut op_cost = Vec::new();
        let mut op_owner = Vec::new();

        let mut push_op = |pre: Vec<usize>, eff: Vec<usize>, cost: Cost, owner: Option<OpId>| {
            op_pre.push(pre);
            op_eff.push(eff);
            op_cost.push(cost);
            op_owner.push(owner);
        };

        let facts_of = |ps: &PartialState| -> Vec<usize> {
            fact_index
                .partial_state_facts(ps)
                .into_iter()
                .sorted_unstable()
                .dedup()
                .collect()
        };

        for op in &task.operators {
            let mut pre = facts_of(&op.pre);
            if pre.is_empty() {
                pre.push(nopre_fact);
            }
            push_op(pre, facts_of(&op.eff), options.cost.apply(op.cost), Some(op.id()));
        }
        let base_op_count = task.operators.len();

        for op in &task.operators {
            for cond_eff in &op.cond_effects {
                let mut pre: Vec<usize> = facts_of(&op.pre)
                    .into_iter()
                    .chain(facts_of(&cond_eff.condition))
                    .sorted_unstable()
                    .dedup()
                    .collect();
                if pre.is_empty() {
                    pre.push(nopre_fact);
                }
                push_op(
                    pre,
                    facts_of(&cond_eff.effect),
                    options.cost.apply(op.cost),
                    Some(op.id()),
                );
            }
        }

        let goal_op = if options.with_goal_op {
            let goal_fact = goal_fact.expect("goal fact exists in goal-op mode");
            push_op(goal_facts.clone(), vec![goal_fact], 0, None);
            Some(op_pre.len() - 1)
        } else {
            None
        };

        let mut cross_ref = Self {
            fact_index,
            fact_count,
            goal_fact,
            nopre_fact,
            op_pre,
            op_eff,
            fact_pre: Vec::new(),
            fact_eff: Vec::new(),
            op_cost,
            op_owner,
            goal_op,
            goal_facts,
            base_op_count,
        };

        if options.simplify {
            cross_ref.simplify(task);
        }

        // fact_pre skips operators whose effects were simplified away; such
        // operators can never contribute to a relaxed exploration.
        cross_ref.fact_pre = invert(
            &cross_ref.op_pre,
            cross_ref.fact_count,
            Some(&cross_ref.op_eff),
        );
        if options.with_fact_eff {
            cross_ref.fact_eff = invert(&cross_ref.op_eff, cross_ref.fact_count, None);
        }
        cross_ref
    }

    pub fn num_ops(&self) -> usize {
        self.op_pre.len()
    }

    /// Removes duplicate achievements: whenever operator `b` is applicable
    /// in `a`'s precondition and both achieve a fact, the fact stays only on
    /// the cheaper operator. Reference operators are visited in ascending id
    /// order and an equal-cost duplicate is dropped from the current
    /// reference, which makes the tie-break deterministic by id order.
    fn simplify(&mut self, task: &Task) {
        let generator = SuccessorGenerator::new(task);

        for ref_idx in 0..self.num_ops() {
            let Some(ref_owner) = self.op_owner[ref_idx] else {
                continue;
            };
            if self.op_eff[ref_idx].is_empty() {
                continue;
            }

            let ref_cost = self.op_cost[ref_idx];
            for other in generator.ops_applicable_in(&task.operators[ref_owner].pre) {
                if other == ref_owner {
                    continue;
                }
                // The counterpart is the base entry of the found operator.
                let other_cost = self.op_cost[other];
                let (drop_from, keep) = if other_cost <= ref_cost {
                    (ref_idx, other)
                } else {
                    (other, ref_idx)
                };
                let kept = std::mem::take(&mut self.op_eff[keep]);
                self.op_eff[drop_from].retain(|fact| kept.binary_search(fact).is_err());
                self.op_eff[keep] = kept;
            }
        }
    }
}

/// Inverts an op -> facts table into fact -> ops. Entries are generated in
/// ascending op order and therefore sorted. With `skip_if_empty`, operators
/// whose entry in that table is empty are left out.
fn invert(
    table: &[Vec<usize>],
    fact_count: usize,
    skip_if_empty: Option<&[Vec<usize>]>,
) -> Vec<Vec<usize>> {
    let mut inverted = vec![Vec::new(); fact_count];
    for (op, facts) in table.iter().enumerate() {
        if let Some(test) = skip_if_empty {
            if test[op].is_empty() {
                continue;
            }
        }
        for &fact in facts {
            inverted[fact].push(op);
        }
    }
    inverted
}
