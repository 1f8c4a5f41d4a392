use std::{num::NonZeroUsize, sync::Arc};

use machine_learning::{ActorCritic, ActorCriticBuilder};
use parameter_server::{
    Aggregator, GlobalNetBuilder, GlobalSpec, InitSpec, NetworkSpec, OptimizerSpec,
};
use tokio::task::JoinSet;

use worker::{
    Coordinator, WorkerBuilder, WorkerConfig, WorkerErr,
    env::{Environment, Step, StepInfo},
};

const EPISODE_LEN: usize = 7;

/// Walks one unit per step and falls on the last one.
struct Scripted {
    t: usize,
}

impl Environment for Scripted {
    fn observation_dim(&self) -> usize {
        2
    }

    fn action_dim(&self) -> usize {
        1
    }

    fn action_bounds(&self) -> (Vec<f32>, Vec<f32>) {
        (vec![-1.], vec![1.])
    }

    fn reset(&mut self) -> Vec<f32> {
        self.t = 0;
        vec![0., 1.]
    }

    fn step(&mut self, action: &[f32]) -> Step {
        assert_eq!(action.len(), 1);
        assert!((-1.0..=1.0).contains(&action[0]));

        self.t += 1;
        let done = self.t == EPISODE_LEN;

        Step {
            state: vec![self.t as f32 / EPISODE_LEN as f32, 1.],
            reward: if done { -100. } else { 1. },
            done,
            info: StepInfo {
                position: self.t as f32,
            },
        }
    }
}

fn create_test_net() -> ActorCritic {
    ActorCriticBuilder::new(2, vec![-1.], vec![1.])
        .actor_hidden(8)
        .critic_hidden(8)
        .build()
        .unwrap()
}

fn global_spec(net: &ActorCritic) -> GlobalSpec {
    GlobalSpec {
        actor: NetworkSpec::from_dims(net.actor_layers(), 0.001),
        critic: NetworkSpec::from_dims(net.critic_layers(), 0.001),
        init: InitSpec::default(),
        optimizer: OptimizerSpec::default(),
        shard_size: NonZeroUsize::new(16).unwrap(),
        seed: Some(0),
    }
}

fn config() -> WorkerConfig {
    WorkerConfig {
        update_global_iter: NonZeroUsize::new(5).unwrap(),
        memory_capacity: NonZeroUsize::new(20).unwrap(),
        render_every: None,
        achieve_position: 5.,
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn workers_train_until_the_episode_cap() {
    const WORKERS: usize = 2;
    const MAX_EPISODES: usize = 12;

    let net = create_test_net();
    let global = GlobalNetBuilder::new().build(&global_spec(&net)).unwrap();
    let (aggregator, client) = Aggregator::new(global, WORKERS);
    let server = tokio::spawn(aggregator.run());

    let coordinator = Arc::new(Coordinator::new(MAX_EPISODES));
    let builder = WorkerBuilder::new(config(), net, client.clone(), Arc::clone(&coordinator))
        .seed(Some(7));

    let mut join_set = JoinSet::new();
    for id in 0..WORKERS {
        let mut worker = builder.build(id, Box::new(Scripted { t: 0 })).unwrap();
        join_set.spawn_blocking(move || worker.run());
    }
    drop(builder);

    let mut updates = 0;
    let mut episodes = 0;
    while let Some(res) = join_set.join_next().await {
        let metrics = res.unwrap().unwrap();

        assert_eq!(metrics.steps, metrics.episodes * EPISODE_LEN as u64);
        assert_eq!(metrics.achieved, metrics.episodes);
        updates += metrics.updates;
        episodes += metrics.episodes;
    }

    // a worker already inside an episode still finishes it past the cap
    let counted = coordinator.episodes();
    assert_eq!(counted as u64, episodes);
    assert!((MAX_EPISODES..MAX_EPISODES + WORKERS).contains(&counted));

    assert!(updates > 0);
    assert_eq!(client.version(), updates);
    drop(client);

    let stats = server.await.unwrap();
    assert_eq!(stats.pushes, updates);
    assert_eq!(stats.rejected, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn memory_holds_remapped_bootstrapped_returns() {
    const RETURN: usize = 3;

    let net = create_test_net();
    let global = GlobalNetBuilder::new().build(&global_spec(&net)).unwrap();
    let (aggregator, client) = Aggregator::new(global, 1);
    let server = tokio::spawn(aggregator.run());

    let config = WorkerConfig {
        memory_capacity: NonZeroUsize::new(100).unwrap(),
        ..config()
    };
    let gamma = config.gamma;
    let iter = config.update_global_iter.get();

    let mut worker = WorkerBuilder::new(config, net, client, Arc::new(Coordinator::new(1)))
        .seed(Some(3))
        .build(0, Box::new(Scripted { t: 0 }))
        .unwrap();

    let (worker, metrics) = tokio::task::spawn_blocking(move || {
        let metrics = worker.run();
        (worker, metrics)
    })
    .await
    .unwrap();
    assert_eq!(metrics.unwrap().episodes, 1);

    let rows = worker.local().memory().rows();
    assert_eq!(rows.nrows(), EPISODE_LEN);
    for (t, row) in rows.outer_iter().enumerate() {
        assert_eq!(row[0], t as f32 / EPISODE_LEN as f32);
        assert!((-1.0..=1.0).contains(&row[2]));
    }

    // the fall is stored as the replacement reward and is never bootstrapped
    let returns = rows.column(RETURN).to_vec();
    assert_eq!(returns[EPISODE_LEN - 1], -2.);

    // the row closing the first sync segment is bootstrapped from the critic instead
    for t in (0..EPISODE_LEN - 1).filter(|&t| t != iter - 1) {
        let expected = 1. + gamma * returns[t + 1];
        assert!(
            (returns[t] - expected).abs() < 1e-5,
            "step {t}: {} != {expected}",
            returns[t]
        );
    }

    drop(worker);
    assert_eq!(server.await.unwrap().pushes, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stop_request_ends_training_early() {
    let net = create_test_net();
    let global = GlobalNetBuilder::new().build(&global_spec(&net)).unwrap();
    let (aggregator, client) = Aggregator::new(global, 1);
    let server = tokio::spawn(aggregator.run());

    let coordinator = Arc::new(Coordinator::new(usize::MAX));
    coordinator.request_stop();

    let mut worker = WorkerBuilder::new(config(), net, client, Arc::clone(&coordinator))
        .build(0, Box::new(Scripted { t: 0 }))
        .unwrap();

    let metrics = tokio::task::spawn_blocking(move || worker.run())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(metrics.episodes, 0);
    assert_eq!(coordinator.episodes(), 0);
    assert_eq!(server.await.unwrap().pushes, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn environment_must_fit_the_networks() {
    let net = ActorCriticBuilder::new(3, vec![-1.], vec![1.])
        .actor_hidden(4)
        .critic_hidden(4)
        .build()
        .unwrap();
    let global = GlobalNetBuilder::new().build(&global_spec(&net)).unwrap();
    let (_aggregator, client) = Aggregator::new(global, 1);

    let builder = WorkerBuilder::new(config(), net, client, Arc::new(Coordinator::new(1)));
    let res = builder.build(0, Box::new(Scripted { t: 0 }));

    assert!(matches!(
        res,
        Err(WorkerErr::ObservationDimMismatch {
            got: 2,
            expected: 3
        })
    ));
}
