use std::time::Duration;

/// Counters a worker reports when it finishes.
#[derive(Debug, Default, Clone)]
pub struct WorkerMetrics {
    pub push_time: Duration,
    pub pull_time: Duration,

    pub steps: u64,
    pub episodes: u64,
    pub updates: u64,
    pub achieved: u64,
}

impl WorkerMetrics {
    #[inline]
    pub fn bump_step(&mut self) {
        self.steps += 1;
    }

    #[inline]
    pub fn bump_episode(&mut self, achieved: bool) {
        self.episodes += 1;
        self.achieved += achieved as u64;
    }

    #[inline]
    pub fn add_update(&mut self, push_time: Duration, pull_time: Duration) {
        self.updates += 1;
        self.push_time += push_time;
        self.pull_time += pull_time;
    }
}
