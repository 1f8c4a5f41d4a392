use std::num::NonZeroUsize;

const DEFAULT_UPDATE_GLOBAL_ITER: NonZeroUsize = NonZeroUsize::new(10).unwrap();
const DEFAULT_MEMORY_CAPACITY: NonZeroUsize = NonZeroUsize::new(500).unwrap();

/// The hyperparameters every worker shares.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// The discount factor of the bootstrapped returns.
    pub gamma: f32,
    /// Steps between pushes to the global network, also the size of a sampled batch.
    pub update_global_iter: NonZeroUsize,
    /// Rows kept in each worker's memory.
    pub memory_capacity: NonZeroUsize,
    /// The reward the environment gives on a fall.
    pub reward_sentinel: f32,
    /// What a fall reward is replaced with.
    pub reward_replacement: f32,
    /// The first worker renders every this many steps, `None` disables rendering.
    pub render_every: Option<NonZeroUsize>,
    /// The final position an episode has to reach to count as achieved.
    pub achieve_position: f32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            update_global_iter: DEFAULT_UPDATE_GLOBAL_ITER,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            reward_sentinel: -100.,
            reward_replacement: -2.,
            render_every: NonZeroUsize::new(30),
            achieve_position: 88.,
        }
    }
}

impl WorkerConfig {
    /// Replaces the fall penalty, every other reward passes through untouched.
    pub fn remap_reward(&self, reward: f32) -> f32 {
        if reward == self.reward_sentinel {
            self.reward_replacement
        } else {
            reward
        }
    }

    /// Whether `total_step` lands on a synchronization boundary.
    pub fn is_sync_step(&self, total_step: usize) -> bool {
        total_step % self.update_global_iter.get() == 0
    }

    /// Whether the first worker should render at `total_step`.
    pub fn is_render_step(&self, total_step: usize) -> bool {
        self.render_every
            .is_some_and(|every| total_step % every.get() == 0)
    }
}
