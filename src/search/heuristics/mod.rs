mod cross_ref;
mod fact_index;
mod hadd;
mod heuristic;
mod hff;
mod hmax;
mod hmax2;
mod landmarks;
mod lm_cut;
mod relaxation;

pub use cross_ref::{CostTransform, CrossRefOptions, FactOpCrossRef};
pub use fact_index::FactIndex;
pub use hadd::HaddHeuristic;
pub use heuristic::{
    Heuristic, HeuristicFlags, HeuristicKind, HeuristicRequest, HeuristicResult,
    HeuristicSetupError,
};
pub use hff::FfHeuristic;
pub use hmax::HmaxHeuristic;
pub use hmax2::Hmax2Heuristic;
pub use landmarks::{Landmark, LandmarkCache, LandmarkSet};
pub use lm_cut::LmCutHeuristic;
pub use relaxation::{RelaxationEngine, RelaxationKind};
