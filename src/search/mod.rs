mod cost;
mod operator;
mod partial_state;
mod plan;
mod priority_queue;
mod successor_generator;
mod task;
mod variable;

pub mod heuristics;
pub mod search_engines;
pub mod states;

pub use cost::{Cost, COST_MAX, DEAD_END};
pub use heuristics::{Heuristic, HeuristicFlags, HeuristicKind};
pub use operator::{ConditionalEffect, OpId, Operator};
pub use partial_state::PartialState;
pub use plan::{Plan, PlanStep};
pub use priority_queue::AdaptivePriorityQueue;
pub use search_engines::{
    AbortHandle, Search, SearchConfig, SearchKind, SearchResult, SearchStatistics,
};
pub use states::State;
pub use successor_generator::SuccessorGenerator;
pub use task::{InvalidTaskError, Task};
pub use variable::Variable;
