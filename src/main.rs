use std::sync::Arc;

use anyhow::Context;
use log::{error, info, warn};
use parameter_server::{Aggregator, GlobalNetBuilder};
use tokio::{signal, task::JoinSet};
use worker::{Coordinator, GraphSummary, SummaryWriter, WorkerBuilder, env};

mod config;

use config::TrainingConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = TrainingConfig::from_env()?;
    let nworkers = config.workers();
    info!(
        "training on {} with {nworkers} workers for {} episodes",
        config.game, config.max_global_ep
    );

    let probe = env::make(&config.game, config.seed)?;
    let net = config.actor_critic(probe.as_ref())?;
    drop(probe);

    let global = GlobalNetBuilder::new()
        .build(&config.global_spec(&net))
        .context("failed to build the global network")?;
    info!(
        "global network holds {} actor and {} critic parameters",
        global.actor_len(),
        global.critic_len()
    );

    let (aggregator, client) = Aggregator::new(global, nworkers);
    let server = tokio::spawn(aggregator.run());

    let coordinator = Arc::new(Coordinator::new(config.max_global_ep));
    let mut builder = WorkerBuilder::new(
        config.worker_config(),
        net.clone(),
        client,
        Arc::clone(&coordinator),
    )
    .seed(config.seed);

    if config.output_graph {
        let summary = SummaryWriter::create(&config.log_dir)
            .with_context(|| format!("failed to create {}", config.log_dir.display()))?;
        summary.write_graph(&GraphSummary::new(&net))?;
        info!("writing summaries to {}", summary.dir().display());

        builder = builder.summary(Arc::new(summary));
    }

    let mut workers = JoinSet::new();
    for id in 0..nworkers {
        let seed = config.seed.map(|seed| seed.wrapping_add(id as u64));
        let mut worker = builder.build(id, env::make(&config.game, seed)?)?;

        workers.spawn_blocking(move || {
            let name = worker.name().to_string();
            (name, worker.run())
        });
    }

    // The aggregator stops once the last worker drops its client.
    drop(builder);

    let stop = Arc::clone(&coordinator);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("interrupted, workers stop after their current episode");
            stop.request_stop();
        }
    });

    while let Some(res) = workers.join_next().await {
        match res {
            Ok((name, Ok(metrics))) => info!(
                worker = name.as_str();
                "{} episodes ({} achieved), {} updates, {:?} pushing, {:?} pulling",
                metrics.episodes, metrics.achieved, metrics.updates, metrics.push_time, metrics.pull_time
            ),
            Ok((name, Err(e))) => error!(worker = name.as_str(); "worker failed: {e}"),
            Err(e) => error!("worker thread panicked: {e}"),
        }
    }

    let stats = server.await.context("the aggregator task failed")?;
    info!(
        "trained for {} episodes, {} pushes applied and {} rejected",
        coordinator.episodes(),
        stats.pushes,
        stats.rejected
    );

    Ok(())
}
