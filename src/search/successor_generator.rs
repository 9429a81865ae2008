use crate::search::{states::State, OpId, PartialState, Task};

/// Decision-tree index over operator preconditions. Each inner node tests one
/// variable of the task's variable order; operators that do not constrain
/// that variable live in the pass-through branch.
#[derive(Debug)]
enum Node {
    Leaf(Vec<OpId>),
    Branch {
        var: usize,
        pass: Box<Node>,
        children: Vec<Node>,
    },
}

/// Indexed enumeration of applicable operators.
#[derive(Debug)]
pub struct SuccessorGenerator {
    root: Node,
    num_operators: usize,
}

impl SuccessorGenerator {
    pub fn new(task: &Task) -> Self {
        let order: Vec<usize> = match &task.variable_order {
            Some(order) => order.clone(),
            None => (0..task.num_variables()).collect(),
        };
        let ops: Vec<OpId> = (0..task.operators.len()).collect();
        Self {
            root: build(task, &order, 0, ops),
            num_operators: task.operators.len(),
        }
    }

    pub fn num_operators(&self) -> usize {
        self.num_operators
    }

    /// All operators applicable in the total state, in ascending id order.
    pub fn applicable_ops(&self, state: &State) -> Vec<OpId> {
        let mut ops = Vec::new();
        collect_state(&self.root, state, &mut ops);
        ops.sort_unstable();
        ops
    }

    /// All operators whose precondition is a subset of `partial`, in
    /// ascending id order. Used by operator simplification.
    pub fn ops_applicable_in(&self, partial: &PartialState) -> Vec<OpId> {
        let mut ops = Vec::new();
        collect_partial(&self.root, partial, &mut ops);
        ops.sort_unstable();
        ops
    }
}

fn build(task: &Task, order: &[usize], depth: usize, ops: Vec<OpId>) -> Node {
    if ops.is_empty() {
        return Node::Leaf(ops);
    }

    // Skip order positions no remaining operator constrains.
    let mut depth = depth;
    while depth < order.len() {
        let var = order[depth];
        if ops
            .iter()
            .any(|&op| task.operators[op].pre.get(var).is_some())
        {
            break;
        }
        depth += 1;
    }
    if depth == order.len() {
        return Node::Leaf(ops);
    }

    let var = order[depth];
    let range = task.variables[var].range;
    let mut pass = Vec::new();
    let mut by_value: Vec<Vec<OpId>> = vec![Vec::new(); range];
    for op in ops {
        match task.operators[op].pre.get(var) {
            Some(val) => by_value[val].push(op),
            None => pass.push(op),
        }
    }

    Node::Branch {
        var,
        pass: Box::new(build(task, order, depth + 1, pass)),
        children: by_value
            .into_iter()
            .map(|group| build(task, order, depth + 1, group))
            .collect(),
    }
}

fn collect_state(node: &Node, state: &State, out: &mut Vec<OpId>) {
    match node {
        Node::Leaf(ops) => out.extend_from_slice(ops),
        Node::Branch {
            var,
            pass,
            children,
        } => {
            collect_state(pass, state, out);
            collect_state(&children[state.value(*var)], state, out);
        }
    }
}

fn collect_partial(node: &Node, partial: &PartialState, out: &mut Vec<OpId>) {
    match node {
        Node::Leaf(ops) => out.extend_from_slice(ops),
        Node::Branch {
            var,
            pass,
            children,
        } => {
            collect_partial(pass, partial, out);
            if let Some(val) = partial.get(*var) {
                collect_partial(&children[val], partial, out);
            }
        }
    }
}
