mod walker;

pub use walker::Walker1D;

use crate::{Result, WorkerErr};

/// Extra information about a step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepInfo {
    /// The horizontal position of the walker's hull.
    pub position: f32,
}

/// The outcome of advancing an environment by one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: Vec<f32>,
    pub reward: f32,
    pub done: bool,
    pub info: StepInfo,
}

/// A continuous control task.
pub trait Environment: Send {
    fn observation_dim(&self) -> usize;

    fn action_dim(&self) -> usize;

    /// The `(low, high)` bounds of every action dimension.
    fn action_bounds(&self) -> (Vec<f32>, Vec<f32>);

    /// Starts a new episode and returns its first state.
    fn reset(&mut self) -> Vec<f32>;

    /// Applies an action, `action` must have `action_dim` entries.
    fn step(&mut self, action: &[f32]) -> Step;

    fn render(&self) {}
}

impl<E: Environment + ?Sized> Environment for Box<E> {
    fn observation_dim(&self) -> usize {
        (**self).observation_dim()
    }

    fn action_dim(&self) -> usize {
        (**self).action_dim()
    }

    fn action_bounds(&self) -> (Vec<f32>, Vec<f32>) {
        (**self).action_bounds()
    }

    fn reset(&mut self) -> Vec<f32> {
        (**self).reset()
    }

    fn step(&mut self, action: &[f32]) -> Step {
        (**self).step(action)
    }

    fn render(&self) {
        (**self).render()
    }
}

/// Creates a registered environment by its id.
///
/// # Arguments
/// * `game` - The environment id, e.g. `Walker1D-v0`.
/// * `seed` - Seeds the environment's randomness, `None` seeds it from the os.
///
/// # Returns
/// The environment or `WorkerErr::UnknownEnv`.
pub fn make(game: &str, seed: Option<u64>) -> Result<Box<dyn Environment>> {
    match game {
        Walker1D::ID => Ok(Box::new(Walker1D::new(seed))),
        other => Err(WorkerErr::UnknownEnv(other.to_string())),
    }
}
