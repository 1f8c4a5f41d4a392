use std::sync::Arc;

use machine_learning::ActorCritic;
use parameter_server::{GlobalClient, Optimizer};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    Result, Worker, WorkerErr,
    config::WorkerConfig,
    coordinator::Coordinator,
    env::Environment,
    local::LocalNet,
    telemetry::SummaryWriter,
};

/// Builds every worker of a training run from the same shared pieces.
pub struct WorkerBuilder<O: Optimizer> {
    config: WorkerConfig,
    net: ActorCritic,
    client: GlobalClient<O>,
    coordinator: Arc<Coordinator>,
    summary: Option<Arc<SummaryWriter>>,
    seed: Option<u64>,
}

impl<O: Optimizer + Send> WorkerBuilder<O> {
    /// Creates a new `WorkerBuilder`.
    ///
    /// # Arguments
    /// * `config` - The hyperparameters of every worker.
    /// * `net` - The actor and critic every local network is cloned from.
    /// * `client` - The connection to the global network, cloned once per worker.
    /// * `coordinator` - The episode counter and stop flag.
    pub fn new(
        config: WorkerConfig,
        net: ActorCritic,
        client: GlobalClient<O>,
        coordinator: Arc<Coordinator>,
    ) -> Self {
        Self {
            config,
            net,
            client,
            coordinator,
            summary: None,
            seed: None,
        }
    }

    pub fn summary(mut self, summary: Arc<SummaryWriter>) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Seeds every worker, each one with `seed + id`.
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Builds a `Worker`.
    ///
    /// # Arguments
    /// * `id` - The worker's id, worker 0 renders its environment.
    /// * `env` - The worker's own environment.
    ///
    /// # Returns
    /// A worker holding the current global parameters, or an error if the environment
    /// doesn't fit the networks.
    pub fn build(&self, id: usize, env: Box<dyn Environment>) -> Result<Worker<O>> {
        if env.observation_dim() != self.net.observation_dim() {
            return Err(WorkerErr::ObservationDimMismatch {
                got: env.observation_dim(),
                expected: self.net.observation_dim(),
            });
        }

        if env.action_dim() != self.net.action_dim() {
            return Err(WorkerErr::ActionDimMismatch {
                got: env.action_dim(),
                expected: self.net.action_dim(),
            });
        }

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => StdRng::from_os_rng(),
        };

        let local = LocalNet::new(
            self.net.clone(),
            self.client.clone(),
            self.config.memory_capacity,
            rng,
        )?;

        Ok(Worker::new(
            id,
            env,
            local,
            Arc::clone(&self.coordinator),
            self.config.clone(),
            self.summary.clone(),
        ))
    }
}
