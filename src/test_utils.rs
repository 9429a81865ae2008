//! Shared fixture tasks for the test suites. All fixtures are tiny SAS+
//! instances with hand-checkable heuristic values and plan costs.

use crate::search::{Operator, PartialState, Plan, State, Task, Variable};

pub fn ps(pairs: &[(usize, usize)]) -> PartialState {
    PartialState::new(pairs.iter().copied()).expect("well-formed partial state")
}

/// One binary variable, one operator flipping it for cost 3.
/// Optimal plan: [flip], cost 3.
pub fn single_switch_task() -> Task {
    Task::new(
        vec![Variable::new("v0", 2)],
        State::new(vec![0]),
        ps(&[(0, 1)]),
        vec![Operator::new(
            "flip",
            3,
            PartialState::empty(),
            ps(&[(0, 1)]),
        )],
    )
    .expect("valid task")
}

/// Two independent binary goals with different costs.
/// Optimal plan cost 7; hmax 5, hadd 7.
pub fn two_switches_task() -> Task {
    Task::new(
        vec![Variable::new("v0", 2), Variable::new("v1", 2)],
        State::new(vec![0, 0]),
        ps(&[(0, 1), (1, 1)]),
        vec![
            Operator::new("set-first", 2, PartialState::empty(), ps(&[(0, 1)])),
            Operator::new("set-second", 5, PartialState::empty(), ps(&[(1, 1)])),
        ],
    )
    .expect("valid task")
}

/// A two-step precondition chain over one ternary variable.
/// Optimal plan: [advance, finish], cost 5.
pub fn chain_task() -> Task {
    Task::new(
        vec![Variable::new("v", 3)],
        State::new(vec![0]),
        ps(&[(0, 2)]),
        vec![
            Operator::new("advance", 1, ps(&[(0, 0)]), ps(&[(0, 1)])),
            Operator::new("finish", 4, ps(&[(0, 1)]), ps(&[(0, 2)])),
        ],
    )
    .expect("valid task")
}

/// An unreachable goal: no operators at all.
pub fn no_ops_task() -> Task {
    Task::new(
        vec![Variable::new("v", 2)],
        State::new(vec![0]),
        ps(&[(0, 1)]),
        vec![],
    )
    .expect("valid task")
}

/// The goal operator is locked behind an enabler.
/// Optimal plan: [enable, finish] = ops [1, 0], cost 2.
pub fn unlock_task() -> Task {
    Task::new(
        vec![Variable::new("v0", 2), Variable::new("v1", 2)],
        State::new(vec![0, 0]),
        ps(&[(0, 1)]),
        vec![
            Operator::new("finish", 1, ps(&[(1, 1)]), ps(&[(0, 1)])),
            Operator::new("enable", 1, PartialState::empty(), ps(&[(1, 1)])),
        ],
    )
    .expect("valid task")
}

/// One operator with a conditional side effect. From the fixture's initial
/// state the condition holds, so a single application reaches the goal.
pub fn conditional_task() -> Task {
    Task::new(
        vec![
            Variable::new("v0", 2),
            Variable::new("v1", 2),
            Variable::new("v2", 2),
        ],
        State::new(vec![0, 1, 0]),
        ps(&[(0, 1), (2, 1)]),
        vec![
            Operator::new("set", 1, PartialState::empty(), ps(&[(0, 1)]))
                .with_cond_effect(ps(&[(1, 1)]), ps(&[(2, 1)])),
        ],
    )
    .expect("valid task")
}

/// Two goals sharing one enabling operator. Optimal cost 5 (prime once,
/// then both cheap operators); hadd double-counts the shared work.
pub fn shared_subgoal_task() -> Task {
    Task::new(
        vec![
            Variable::new("v0", 2),
            Variable::new("v1", 2),
            Variable::new("v2", 2),
        ],
        State::new(vec![0, 0, 0]),
        ps(&[(0, 1), (1, 1)]),
        vec![
            Operator::new("left", 1, ps(&[(2, 1)]), ps(&[(0, 1)])),
            Operator::new("right", 1, ps(&[(2, 1)]), ps(&[(1, 1)])),
            Operator::new("prime", 3, PartialState::empty(), ps(&[(2, 1)])),
        ],
    )
    .expect("valid task")
}

/// A small logistics-style task: one truck over three locations, one
/// package (at a location or in the truck). The package starts at location
/// 1 and must go to location 2, the truck starts at location 0.
/// Optimal plan: drive 0-1, load, drive 1-2, unload; cost 4.
pub fn delivery_task() -> Task {
    let truck = 0;
    let package = 1;
    let in_truck = 3;

    let mut operators = Vec::new();
    for from in 0..3 {
        for to in 0..3 {
            if from == to {
                continue;
            }
            operators.push(Operator::new(
                format!("drive-{from}-{to}"),
                1,
                ps(&[(truck, from)]),
                ps(&[(truck, to)]),
            ));
        }
    }
    for loc in 0..3 {
        operators.push(Operator::new(
            format!("load-{loc}"),
            1,
            ps(&[(truck, loc), (package, loc)]),
            ps(&[(package, in_truck)]),
        ));
    }
    for loc in 0..3 {
        operators.push(Operator::new(
            format!("unload-{loc}"),
            1,
            ps(&[(truck, loc), (package, in_truck)]),
            ps(&[(package, loc)]),
        ));
    }

    Task::new(
        vec![Variable::new("truck", 3), Variable::new("package", 4)],
        State::new(vec![0, 1]),
        ps(&[(package, 2)]),
        operators,
    )
    .expect("valid task")
}

/// Applies the plan from the initial state and checks applicability of each
/// step and goal satisfaction at the end.
pub fn validate_plan(task: &Task, plan: &Plan) -> bool {
    let mut state = task.initial_state.clone();
    for step in plan.steps() {
        let op = &task.operators[step.op];
        if !op.is_applicable(&state) {
            return false;
        }
        state = op.apply(&state);
    }
    task.goal_satisfied(&state)
}
