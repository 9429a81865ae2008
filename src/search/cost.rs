/// Operator costs and heuristic values. All costs in a task are non-negative
/// integers; heuristic values live in the same domain.
pub type Cost = i32;

/// Upper bound of the cost domain. Chosen as half of the type's maximum so
/// that `COST_MAX + op.cost` never overflows for any validated operator cost.
pub const COST_MAX: Cost = i32::MAX / 2;

/// In-band sentinel for states from which the goal is unreachable. Heuristics
/// return this instead of an error; search drivers prune such states.
pub const DEAD_END: Cost = COST_MAX;
