use std::{sync::Arc, time::Instant};

use log::{debug, info, warn};
use parameter_server::Optimizer;

use crate::{
    Result,
    config::WorkerConfig,
    coordinator::Coordinator,
    env::Environment,
    local::LocalNet,
    metrics::WorkerMetrics,
    rollout::Rollout,
    telemetry::{EpisodeReport, SummaryWriter},
};

/// Pairs an environment with a local network and trains the global network with it.
pub struct Worker<O: Optimizer> {
    id: usize,
    name: String,
    env: Box<dyn Environment>,
    local: LocalNet<O>,
    coordinator: Arc<Coordinator>,
    config: WorkerConfig,
    summary: Option<Arc<SummaryWriter>>,
}

impl<O: Optimizer + Send> Worker<O> {
    /// Creates a new `Worker`, use a `WorkerBuilder` to check it against its environment.
    pub(crate) fn new(
        id: usize,
        env: Box<dyn Environment>,
        local: LocalNet<O>,
        coordinator: Arc<Coordinator>,
        config: WorkerConfig,
        summary: Option<Arc<SummaryWriter>>,
    ) -> Self {
        Self {
            id,
            name: format!("W_{id}"),
            env,
            local,
            coordinator,
            config,
            summary,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local(&self) -> &LocalNet<O> {
        &self.local
    }

    /// Runs episodes until the coordinator says otherwise.
    ///
    /// Blocks the calling thread for the whole training, every push waits for the
    /// aggregator.
    ///
    /// # Returns
    /// The worker's counters, or the first error that stopped it.
    pub fn run(&mut self) -> Result<WorkerMetrics> {
        let iter = self.config.update_global_iter.get();
        let capacity = self.config.memory_capacity.get();

        let mut metrics = WorkerMetrics::default();
        let mut rollout = Rollout::new(self.env.observation_dim(), self.env.action_dim());
        let mut sigma = Vec::new();
        let mut total_step = 1;

        info!(worker = self.name.as_str(); "worker started");

        while self.coordinator.should_continue() {
            let mut s = self.env.reset();
            let mut ep_r = 0.;

            loop {
                if self.id == 0 && self.config.is_render_step(total_step) {
                    self.env.render();
                }

                let a = self.local.choose_action(&s)?;
                let step = self.env.step(&a);
                let r = self.config.remap_reward(step.reward);

                ep_r += r;
                rollout.push(&s, &a, r)?;

                let sync = self.config.is_sync_step(total_step);
                if sync || step.done {
                    let bootstrap = if step.done {
                        0.
                    } else {
                        self.local.value(&step.state)?
                    };

                    let rows = rollout.drain(self.config.gamma, bootstrap)?;
                    self.local.store_batch(rows.view())?;
                }

                if total_step > capacity && sync {
                    let batch = self.local.sample(iter)?;

                    let start = Instant::now();
                    let stats = self.local.update_global(batch.view())?;
                    let push_time = start.elapsed();

                    let start = Instant::now();
                    self.local.pull_global()?;
                    metrics.add_update(push_time, start.elapsed());

                    sigma = stats.sigma;
                }

                s = step.state;
                total_step += 1;
                metrics.bump_step();

                if step.done {
                    let report = EpisodeReport {
                        worker: self.name.clone(),
                        episode: self.coordinator.finish_episode(),
                        achieved: step.info.position >= self.config.achieve_position,
                        position: step.info.position,
                        reward: ep_r,
                        sigma: sigma.clone(),
                    };

                    metrics.bump_episode(report.achieved);
                    self.report(&report);
                    break;
                }
            }
        }

        info!(
            worker = self.name.as_str();
            "worker finished after {} episodes, {} steps and {} updates",
            metrics.episodes, metrics.steps, metrics.updates
        );
        Ok(metrics)
    }

    fn report(&self, report: &EpisodeReport) {
        info!("{report}");

        let Some(summary) = &self.summary else {
            return;
        };

        if let Err(e) = summary.record(report) {
            warn!(worker = self.name.as_str(); "failed to record episode: {e}");
        } else {
            debug!(worker = self.name.as_str(); "recorded episode {}", report.episode);
        }
    }
}
