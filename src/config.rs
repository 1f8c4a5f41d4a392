use std::{env, fs, num::NonZeroUsize, path::PathBuf, thread};

use anyhow::{Context, Result};
use machine_learning::{ActorCritic, ActorCriticBuilder, DEFAULT_ENTROPY_BETA};
use parameter_server::{GlobalSpec, InitSpec, NetworkSpec, OptimizerSpec};
use serde::{Deserialize, Serialize};
use worker::{WorkerConfig, env::Environment};

/// Names a JSON file with a `TrainingConfig`.
pub const CONFIG_VAR: &str = "A3C_CONFIG";
/// Overrides the amount of workers.
pub const WORKERS_VAR: &str = "A3C_WORKERS";

const DEFAULT_SHARD_SIZE: NonZeroUsize = NonZeroUsize::new(4096).unwrap();

/// Every knob of a training run, missing fields take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub game: String,
    pub output_graph: bool,
    pub log_dir: PathBuf,
    /// Defaults to the available parallelism.
    pub workers: Option<NonZeroUsize>,
    pub max_global_ep: usize,
    pub memory_capacity: NonZeroUsize,
    pub update_global_iter: NonZeroUsize,
    pub gamma: f32,
    pub entropy_beta: f32,
    pub lr_a: f32,
    pub lr_c: f32,
    pub optimizer: OptimizerSpec,
    pub init: InitSpec,
    pub actor_hidden: usize,
    pub critic_hidden: usize,
    pub reward_sentinel: f32,
    pub reward_replacement: f32,
    pub render_every: Option<NonZeroUsize>,
    pub achieve_position: f32,
    pub seed: Option<u64>,
    pub shard_size: NonZeroUsize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let worker = WorkerConfig::default();

        Self {
            game: "Walker1D-v0".to_string(),
            output_graph: false,
            log_dir: PathBuf::from("./log"),
            workers: None,
            max_global_ep: 5000,
            memory_capacity: worker.memory_capacity,
            update_global_iter: worker.update_global_iter,
            gamma: worker.gamma,
            entropy_beta: DEFAULT_ENTROPY_BETA,
            lr_a: 0.001,
            lr_c: 0.001,
            optimizer: OptimizerSpec::default(),
            init: InitSpec::default(),
            actor_hidden: 400,
            critic_hidden: 300,
            reward_sentinel: worker.reward_sentinel,
            reward_replacement: worker.reward_replacement,
            render_every: worker.render_every,
            achieve_position: worker.achieve_position,
            seed: None,
            shard_size: DEFAULT_SHARD_SIZE,
        }
    }
}

impl TrainingConfig {
    /// Loads the configuration named by `A3C_CONFIG`, if any, then applies `A3C_WORKERS`.
    pub fn from_env() -> Result<Self> {
        Self::from_sources(env::var(CONFIG_VAR).ok(), env::var(WORKERS_VAR).ok())
    }

    fn from_sources(path: Option<String>, workers: Option<String>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {path}"))?;
                Self::from_json(&raw).with_context(|| format!("invalid config file {path}"))?
            }
            None => Self::default(),
        };

        if let Some(workers) = workers {
            let workers = workers
                .parse()
                .with_context(|| format!("{WORKERS_VAR} must be a positive integer, got {workers:?}"))?;
            config.workers = Some(workers);
        }

        Ok(config)
    }

    fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn workers(&self) -> usize {
        self.workers
            .or_else(|| thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            gamma: self.gamma,
            update_global_iter: self.update_global_iter,
            memory_capacity: self.memory_capacity,
            reward_sentinel: self.reward_sentinel,
            reward_replacement: self.reward_replacement,
            render_every: self.render_every,
            achieve_position: self.achieve_position,
        }
    }

    /// Builds the actor and critic for an environment's spaces.
    pub fn actor_critic(&self, env: &dyn Environment) -> Result<ActorCritic> {
        let (low, high) = env.action_bounds();

        ActorCriticBuilder::new(env.observation_dim(), low, high)
            .actor_hidden(self.actor_hidden)
            .critic_hidden(self.critic_hidden)
            .entropy_beta(self.entropy_beta)
            .build()
            .with_context(|| format!("invalid action space for {}", self.game))
    }

    /// Describes the global network matching `net`.
    pub fn global_spec(&self, net: &ActorCritic) -> GlobalSpec {
        GlobalSpec {
            actor: NetworkSpec::from_dims(net.actor_layers(), self.lr_a),
            critic: NetworkSpec::from_dims(net.critic_layers(), self.lr_c),
            init: self.init,
            optimizer: self.optimizer,
            shard_size: self.shard_size,
            seed: self.seed,
        }
    }
}
