use ndarray::{Array2, ArrayView2, Axis, concatenate};

use crate::{Result, WorkerErr};

/// Computes the bootstrapped discounted return of every step of a rollout.
///
/// `G_t = r_t + gamma * G_{t+1}`, seeded with `G_{T+1} = bootstrap`.
pub fn discounted_returns(rewards: &[f32], gamma: f32, bootstrap: f32) -> Vec<f32> {
    let mut returns = vec![0.; rewards.len()];
    let mut g = bootstrap;

    for (ret, &r) in returns.iter_mut().zip(rewards).rev() {
        g = r + gamma * g;
        *ret = g;
    }

    returns
}

/// The transitions gathered since the last synchronization.
#[derive(Debug, Clone)]
pub struct Rollout {
    observation_dim: usize,
    action_dim: usize,
    states: Vec<f32>,
    actions: Vec<f32>,
    rewards: Vec<f32>,
}

impl Rollout {
    pub fn new(observation_dim: usize, action_dim: usize) -> Self {
        Self {
            observation_dim,
            action_dim,
            states: Vec::new(),
            actions: Vec::new(),
            rewards: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// The width of a `[state | action | return]` row.
    pub fn row_width(&self) -> usize {
        self.observation_dim + self.action_dim + 1
    }

    /// Records one step.
    pub fn push(&mut self, state: &[f32], action: &[f32], reward: f32) -> Result<()> {
        if state.len() != self.observation_dim {
            return Err(WorkerErr::ObservationDimMismatch {
                got: state.len(),
                expected: self.observation_dim,
            });
        }

        if action.len() != self.action_dim {
            return Err(WorkerErr::ActionDimMismatch {
                got: action.len(),
                expected: self.action_dim,
            });
        }

        self.states.extend_from_slice(state);
        self.actions.extend_from_slice(action);
        self.rewards.push(reward);
        Ok(())
    }

    /// Turns the recorded steps into `[state | action | return]` rows and clears the rollout.
    ///
    /// # Arguments
    /// * `gamma` - The discount factor.
    /// * `bootstrap` - The value of the state following the last recorded step.
    pub fn drain(&mut self, gamma: f32, bootstrap: f32) -> Result<Array2<f32>> {
        let n = self.len();
        let returns = discounted_returns(&self.rewards, gamma, bootstrap);

        let states = ArrayView2::from_shape((n, self.observation_dim), &self.states)?;
        let actions = ArrayView2::from_shape((n, self.action_dim), &self.actions)?;
        let returns = ArrayView2::from_shape((n, 1), &returns)?;
        let rows = concatenate(Axis(1), &[states, actions, returns])?;

        self.states.clear();
        self.actions.clear();
        self.rewards.clear();
        Ok(rows)
    }
}
