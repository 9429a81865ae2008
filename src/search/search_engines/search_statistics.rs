use std::time::{Duration, Instant};
use tracing::info;

/// Counters of one search run. Counter names are not stabilized across
/// versions.
#[derive(Debug, Clone)]
pub struct SearchStatistics {
    /// Number of expanded states.
    pub expanded_states: u64,
    /// Number of heuristic evaluations.
    pub evaluated_states: u64,
    /// Number of states pushed into an open or lazy list.
    pub generated_states: u64,
    /// Number of closed states re-admitted on a cheaper path.
    pub reopened_states: u64,
    /// Number of states recognized as dead ends.
    pub dead_end_states: u64,
    /// Number of driver steps.
    pub steps: u64,
    /// Wall-clock time since the run started; refreshed before each
    /// progress callback and at the end of the run.
    pub elapsed: Duration,
    start: Instant,
}

impl SearchStatistics {
    pub fn new() -> Self {
        Self {
            expanded_states: 0,
            evaluated_states: 0,
            generated_states: 0,
            reopened_states: 0,
            dead_end_states: 0,
            steps: 0,
            elapsed: Duration::ZERO,
            start: Instant::now(),
        }
    }

    pub fn increment_expanded_states(&mut self) {
        self.expanded_states += 1;
    }

    pub fn increment_evaluated_states(&mut self) {
        self.evaluated_states += 1;
    }

    pub fn increment_generated_states(&mut self) {
        self.generated_states += 1;
    }

    pub fn increment_reopened_states(&mut self) {
        self.reopened_states += 1;
    }

    pub fn increment_dead_end_states(&mut self) {
        self.dead_end_states += 1;
    }

    pub fn increment_steps(&mut self) {
        self.steps += 1;
    }

    pub fn update_elapsed(&mut self) {
        self.elapsed = self.start.elapsed();
    }

    pub fn log(&self) {
        info!(
            steps = self.steps,
            expanded = self.expanded_states,
            evaluated = self.evaluated_states,
            generated = self.generated_states,
            reopened = self.reopened_states,
            dead_ends = self.dead_end_states,
            elapsed_s = self.elapsed.as_secs_f64(),
        );
    }
}

impl Default for SearchStatistics {
    fn default() -> Self {
        Self::new()
    }
}
