mod packed_state;
mod state;
mod state_pool;

pub use packed_state::{PackedState, StatePacker};
pub use state::State;
pub use state_pool::{StateId, StatePool, NO_STATE};
