use crate::search::{
    heuristics::{
        CostTransform, FactIndex, Heuristic, HeuristicRequest, HeuristicResult,
        HeuristicSetupError,
    },
    priority_queue::AdaptivePriorityQueue,
    states::State,
    Cost, Task, COST_MAX, DEAD_END,
};

#[derive(Debug, Clone)]
struct Max2Op {
    /// Effect fact ids, sorted ascending; unary facts come first.
    eff: Vec<usize>,
    cost: Cost,
    pre_count: usize,
    /// Per extension fact: size of the extended precondition, -1 when the
    /// unary fact is no extension of this operator.
    pre2_count: Vec<i32>,
    unsat: i32,
    unsat2: Vec<i32>,
}

#[derive(Debug, Clone, Default)]
struct Max2Fact {
    /// Operators with this fact in their precondition.
    pre_op: Vec<usize>,
    /// (operator, extension fact) pairs this fact helps to satisfy.
    pre2_op: Vec<(usize, usize)>,
}

/// h^max over the pair-fact extension of the task. Each operator is
/// implicitly extended by every unary fact it neither requires nor touches,
/// which makes the estimate mutex-aware and strictly stronger than plain
/// h^max. Conditional effects are not supported.
#[derive(Debug)]
pub struct Hmax2Heuristic {
    index: FactIndex,
    facts: Vec<Max2Fact>,
    fact_value: Vec<Cost>,
    goal_fact: usize,
    nopre_fact: usize,
    ops: Vec<Max2Op>,
    queue: AdaptivePriorityQueue,
}

impl Hmax2Heuristic {
    pub fn new(task: &Task, cost: CostTransform) -> Result<Self, HeuristicSetupError> {
        if task.operators.iter().any(|op| !op.cond_effects.is_empty()) {
            return Err(HeuristicSetupError::H2WithConditionalEffects);
        }

        let index = FactIndex::with_pairs(&task.variables);
        let unary = index.num_unary_facts();
        let fact_count = index.num_facts() + 2;
        let goal_fact = fact_count - 2;
        let nopre_fact = fact_count - 1;

        let mut facts = vec![Max2Fact::default(); fact_count];
        let mut ops = Vec::with_capacity(task.operators.len() + 1);

        for op in &task.operators {
            let op_id = ops.len();
            let mut record = Max2Op {
                eff: index.partial_state_facts(&op.eff),
                cost: cost.apply(op.cost),
                pre_count: 0,
                pre2_count: vec![-1; unary],
                unsat: 0,
                unsat2: vec![-1; unary],
            };
            record.eff.sort_unstable();

            for fact in index.partial_state_facts(&op.pre) {
                facts[fact].pre_op.push(op_id);
                record.pre_count += 1;
            }
            if op.pre.is_empty() {
                facts[nopre_fact].pre_op.push(op_id);
                record.pre_count = 1;
            }

            extend_op(&index, task, op_id, op, &mut record, &mut facts);
            ops.push(record);
        }

        // Artificial goal operator.
        let goal_op = ops.len();
        let mut goal_record = Max2Op {
            eff: vec![goal_fact],
            cost: 0,
            pre_count: 0,
            pre2_count: Vec::new(),
            unsat: 0,
            unsat2: Vec::new(),
        };
        for fact in index.partial_state_facts(&task.goal) {
            facts[fact].pre_op.push(goal_op);
            goal_record.pre_count += 1;
        }
        ops.push(goal_record);

        Ok(Self {
            fact_value: vec![COST_MAX; fact_count],
            facts,
            goal_fact,
            nopre_fact,
            ops,
            queue: AdaptivePriorityQueue::new(),
            index,
        })
    }

    fn fpush(&mut self, value: Cost, fact: usize) {
        self.fact_value[fact] = value;
        self.queue.decrease_key(value, fact);
    }

    fn enqueue_op_effects(&mut self, op: usize, fact_value: Cost) {
        let value = self.ops[op].cost + fact_value;
        for i in 0..self.ops[op].eff.len() {
            let fact = self.ops[op].eff[i];
            if self.fact_value[fact] > value {
                self.fpush(value, fact);
            }
        }
        // Extensions that are already fully satisfied fire along with the
        // operator itself.
        for ext in 0..self.ops[op].unsat2.len() {
            if self.ops[op].unsat2[ext] == 0 {
                self.enqueue_ext_effects(op, ext, fact_value);
            }
        }
    }

    /// Combines the extension fact with every unary effect of the operator.
    fn enqueue_ext_effects(&mut self, op: usize, ext: usize, fact_value: Cost) {
        let value = self.ops[op].cost + fact_value;
        let unary = self.index.num_unary_facts();
        for i in 0..self.ops[op].eff.len() {
            let eff_fact = self.ops[op].eff[i];
            if eff_fact >= unary {
                break;
            }
            let pair = self.index.pair(ext, eff_fact);
            if self.fact_value[pair] > value {
                self.fpush(value, pair);
            }
        }
    }
}

fn extend_op(
    index: &FactIndex,
    task: &Task,
    op_id: usize,
    op: &crate::search::Operator,
    record: &mut Max2Op,
    facts: &mut [Max2Fact],
) {
    for (var, variable) in task.variables.iter().enumerate() {
        if variable.is_private || op.eff.get(var).is_some() {
            continue;
        }
        if let Some(val) = op.pre.get(var) {
            // A precondition the operator does not change prevails, so its
            // fact pairs with every unary effect.
            if let Some(prevail) = index.fact(var, val) {
                let unary_effs: Vec<usize> = record
                    .eff
                    .iter()
                    .copied()
                    .take_while(|&fact| fact < index.num_unary_facts())
                    .collect();
                for eff_fact in unary_effs {
                    record.eff.push(index.pair(eff_fact, prevail));
                }
                record.eff.sort_unstable();
                record.eff.dedup();
            }
            continue;
        }
        // Untouched variables extend the operator: each of their facts may
        // ride along if it holds together with the precondition.
        for val in 0..variable.range {
            let Some(ext) = index.fact(var, val) else {
                continue;
            };
            facts[ext].pre2_op.push((op_id, ext));
            for (pre_var, pre_val) in op.pre.iter() {
                let Some(pre_fact) = index.fact(pre_var, pre_val) else {
                    continue;
                };
                let pair = index.pair(ext, pre_fact);
                facts[pair].pre2_op.push((op_id, ext));
            }
            record.pre2_count[ext] = op.pre.len() as i32 + 1;
        }
    }
}

impl Heuristic for Hmax2Heuristic {
    fn evaluate(&mut self, state: &State, _request: &HeuristicRequest) -> HeuristicResult {
        self.queue.clear();
        self.fact_value.fill(COST_MAX);
        for op in &mut self.ops {
            op.unsat = op.pre_count as i32;
            op.unsat2.copy_from_slice(&op.pre2_count);
        }

        let initial_facts = self.index.state_facts(state);
        for fact in initial_facts {
            self.fpush(0, fact);
        }
        self.fpush(0, self.nopre_fact);

        while let Some((value, fact)) = self.queue.pop() {
            if self.fact_value[fact] != value {
                continue;
            }
            if fact == self.goal_fact {
                break;
            }

            for i in 0..self.facts[fact].pre_op.len() {
                let op = self.facts[fact].pre_op[i];
                self.ops[op].unsat -= 1;
                if self.ops[op].unsat == 0 {
                    self.enqueue_op_effects(op, value);
                }
            }

            for i in 0..self.facts[fact].pre2_op.len() {
                let (op, ext) = self.facts[fact].pre2_op[i];
                self.ops[op].unsat2[ext] -= 1;
                if self.ops[op].unsat2[ext] == 0 && self.ops[op].unsat == 0 {
                    self.enqueue_ext_effects(op, ext, value);
                }
            }
        }

        let value = self.fact_value[self.goal_fact];
        HeuristicResult::from_value(if value == COST_MAX { DEAD_END } else { value })
    }
}
