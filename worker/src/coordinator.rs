use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// The episode counter and stop flag shared by every worker.
#[derive(Debug)]
pub struct Coordinator {
    episodes: AtomicUsize,
    stop: AtomicBool,
    max_episodes: usize,
}

impl Coordinator {
    /// Creates a new `Coordinator`.
    ///
    /// # Arguments
    /// * `max_episodes` - The amount of episodes, across all workers, to train for.
    pub fn new(max_episodes: usize) -> Self {
        Self {
            episodes: AtomicUsize::new(0),
            stop: AtomicBool::new(false),
            max_episodes,
        }
    }

    /// Whether workers should start another episode.
    pub fn should_continue(&self) -> bool {
        !self.is_stopped() && self.episodes() < self.max_episodes
    }

    /// Counts a finished episode.
    ///
    /// # Returns
    /// The index of the episode that just finished.
    pub fn finish_episode(&self) -> usize {
        self.episodes.fetch_add(1, Ordering::AcqRel)
    }

    /// Asks every worker to stop before their next episode.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    pub fn episodes(&self) -> usize {
        self.episodes.load(Ordering::Acquire)
    }
}
