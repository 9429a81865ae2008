mod astar;
mod ehc;
mod lazy;
mod lazy_base;
mod lazy_list;
mod open_list;
mod search_engine;
mod search_node;
mod search_space;
mod search_statistics;

pub(crate) use astar::AstarEngine;
pub(crate) use ehc::EhcEngine;
pub(crate) use lazy::LazyEngine;
pub(crate) use lazy_base::LazyBase;
pub(crate) use search_engine::{SearchContext, SearchEngine, StepResult};

pub use lazy_list::{LazyEntry, LazyFifoList, LazyHeapList, LazyList};
pub use open_list::{OpenListKey, TieBreakingOpenList};
pub use search_engine::{
    AbortHandle, PreferredOpsMode, Progress, ProgressAction, ProgressFn, Search, SearchConfig,
    SearchKind, SearchResult,
};
pub use search_node::{SearchNode, SearchNodeStatus};
pub use search_space::SearchSpace;
pub use search_statistics::SearchStatistics;
