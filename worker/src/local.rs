use std::num::NonZeroUsize;

use log::debug;
use machine_learning::{ActorCritic, Batch};
use ndarray::{Array2, ArrayView2, s};
use parameter_server::{GlobalClient, Optimizer};
use rand::rngs::StdRng;

use crate::{Result, WorkerErr, memory::Memory};

/// The outcome of one push to the global network.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStats {
    pub actor_loss: f32,
    pub critic_loss: f32,
    /// The action spread of the first sampled row.
    pub sigma: Vec<f32>,
    /// The version of the global network right after the push.
    pub version: u64,
}

/// A worker's private copy of the actor and critic, together with its replay memory.
pub struct LocalNet<O: Optimizer> {
    net: ActorCritic,
    client: GlobalClient<O>,
    memory: Memory,
    rng: StdRng,

    actor_params: Vec<f32>,
    critic_params: Vec<f32>,
    actor_grad: Vec<f32>,
    critic_grad: Vec<f32>,
}

impl<O: Optimizer + Send> LocalNet<O> {
    /// Creates a new `LocalNet` holding a copy of the current global parameters.
    ///
    /// # Arguments
    /// * `net` - The local actor and critic.
    /// * `client` - The connection to the global network.
    /// * `memory_capacity` - The amount of transition rows kept.
    /// * `rng` - Drives action and memory sampling.
    ///
    /// # Returns
    /// The local network or a size mismatch if `net` doesn't match the global network.
    pub fn new(
        net: ActorCritic,
        client: GlobalClient<O>,
        memory_capacity: NonZeroUsize,
        rng: StdRng,
    ) -> Result<Self> {
        let width = net.observation_dim() + net.action_dim() + 1;
        let (actor_size, critic_size) = (net.actor_size(), net.critic_size());

        let mut local = Self {
            net,
            client,
            memory: Memory::new(memory_capacity, width),
            rng,
            actor_params: vec![0.; actor_size],
            critic_params: vec![0.; critic_size],
            actor_grad: vec![0.; actor_size],
            critic_grad: vec![0.; critic_size],
        };

        local.pull_global()?;
        Ok(local)
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Samples a bounded action from the local policy.
    pub fn choose_action(&mut self, state: &[f32]) -> Result<Vec<f32>> {
        self.check_state(state)?;
        let action = self
            .net
            .choose_action(&self.actor_params, state, &mut self.rng)?;
        Ok(action)
    }

    /// The local critic's estimate of a state's value.
    pub fn value(&mut self, state: &[f32]) -> Result<f32> {
        self.check_state(state)?;
        Ok(self.net.value(&self.critic_params, state)?)
    }

    /// Stores `[state | action | return]` rows in the replay memory.
    pub fn store_batch(&mut self, rows: ArrayView2<f32>) -> Result<()> {
        self.memory.store_batch(rows)
    }

    /// Samples `n` rows, with replacement, from the replay memory.
    pub fn sample(&mut self, n: usize) -> Result<Array2<f32>> {
        self.memory.sample(n, &mut self.rng)
    }

    /// Computes both losses over a batch and pushes their gradients to the global network.
    ///
    /// Blocks until the aggregator has applied the push.
    ///
    /// # Arguments
    /// * `batch` - `[state | action | return]` rows.
    pub fn update_global(&mut self, batch: ArrayView2<f32>) -> Result<UpdateStats> {
        let n_s = self.net.observation_dim();
        let n_a = self.net.action_dim();

        if batch.ncols() != self.memory.width() {
            return Err(WorkerErr::RowWidthMismatch {
                got: batch.ncols(),
                expected: self.memory.width(),
            });
        }

        let batch = Batch {
            states: batch.slice(s![.., ..n_s]),
            actions: batch.slice(s![.., n_s..n_s + n_a]),
            v_targets: batch.slice(s![.., n_s + n_a..]),
        };

        let losses = self.net.backprop(
            &self.actor_params,
            &self.critic_params,
            batch,
            &mut self.actor_grad,
            &mut self.critic_grad,
        )?;

        let version = self.client.push(&self.actor_grad, &self.critic_grad)?;
        debug!(
            version = version;
            "pushed gradients, actor loss {} critic loss {}",
            losses.actor, losses.critic
        );

        Ok(UpdateStats {
            actor_loss: losses.actor,
            critic_loss: losses.critic,
            sigma: losses.sigma,
            version,
        })
    }

    /// Overwrites the local parameters with a snapshot of the global ones.
    pub fn pull_global(&mut self) -> Result<()> {
        self.client
            .pull(&mut self.actor_params, &mut self.critic_params)?;
        Ok(())
    }

    fn check_state(&self, state: &[f32]) -> Result<()> {
        if state.len() != self.net.observation_dim() {
            return Err(WorkerErr::ObservationDimMismatch {
                got: state.len(),
                expected: self.net.observation_dim(),
            });
        }

        Ok(())
    }
}
