use log::{debug, info, warn};
use tokio::{
    sync::{mpsc, oneshot},
    task,
};

use super::{GlobalClient, Result};
use crate::{global::GlobalNet, optimization::Optimizer};

/// A gradient push travelling from a worker to the aggregator.
pub(crate) struct Push {
    pub actor_grad: Vec<f32>,
    pub critic_grad: Vec<f32>,
    pub ack: oneshot::Sender<Result<u64>>,
}

/// Counters reported when the aggregator shuts down.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorStats {
    pub pushes: u64,
    pub rejected: u64,
}

/// The single owner of the global network's write side.
///
/// Pushes are applied one at a time in arrival order, which order that is between
/// workers is not specified.
pub struct Aggregator<O: Optimizer> {
    global: GlobalNet<O>,
    rx: mpsc::Receiver<Push>,
}

impl<O: Optimizer + Send> Aggregator<O> {
    /// Creates a new `Aggregator` and the first client bound to it.
    ///
    /// # Arguments
    /// * `global` - The global network this aggregator takes ownership of.
    /// * `capacity` - How many pushes may be queued before workers block on sending.
    ///
    /// # Returns
    /// The aggregator and a client, clone the client once per worker.
    pub fn new(global: GlobalNet<O>, capacity: usize) -> (Self, GlobalClient<O>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let client = GlobalClient::new(tx, global.handle());
        (Self { global, rx }, client)
    }

    /// Applies incoming pushes until every client has been dropped.
    ///
    /// Must run on a multi-threaded runtime, applying a gradient blocks in place.
    pub async fn run(mut self) -> AggregatorStats {
        let mut stats = AggregatorStats::default();

        while let Some(push) = self.rx.recv().await {
            let global = &self.global;
            let res = task::block_in_place(|| global.apply(&push.actor_grad, &push.critic_grad));

            match &res {
                Ok(version) => {
                    stats.pushes += 1;
                    debug!(version = *version; "applied gradient push");
                }
                Err(e) => {
                    stats.rejected += 1;
                    warn!("rejected gradient push: {e}");
                }
            }

            // The worker may have given up waiting, nothing to do about it.
            let _ = push.ack.send(res);
        }

        info!(
            "aggregator stopped after {} pushes ({} rejected)",
            stats.pushes, stats.rejected
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroUsize, thread};

    use super::*;
    use crate::{
        initialization::ConstParamGen, optimization::GradientDescent, service::PsErr,
        storage::ParameterStore,
    };

    fn create_test_net() -> GlobalNet<GradientDescent> {
        let shard_size = NonZeroUsize::new(4).unwrap();
        let actor = ParameterStore::new(shard_size, ConstParamGen::new(0., 6), |_| {
            GradientDescent::new(1.)
        });
        let critic = ParameterStore::new(shard_size, ConstParamGen::new(0., 3), |_| {
            GradientDescent::new(1.)
        });

        GlobalNet::new(actor, critic)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn applies_pushes_from_many_threads() {
        const THREADS: usize = 4;
        const PUSHES: usize = 25;

        let (aggregator, client) = Aggregator::new(create_test_net(), 8);
        let server = tokio::spawn(aggregator.run());

        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                let client = client.clone();
                thread::spawn(move || {
                    for _ in 0..PUSHES {
                        client.push(&[-1.; 6], &[1.; 3]).unwrap();
                    }
                })
            })
            .collect();

        for w in workers {
            w.join().unwrap();
        }

        let mut actor = [0.; 6];
        let mut critic = [0.; 3];
        client.pull(&mut actor, &mut critic).unwrap();
        drop(client);

        let total = (THREADS * PUSHES) as f32;
        assert_eq!(actor, [total; 6]);
        assert_eq!(critic, [-total; 3]);

        let stats = server.await.unwrap();
        assert_eq!(stats.pushes, (THREADS * PUSHES) as u64);
        assert_eq!(stats.rejected, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reports_rejected_pushes() {
        let (aggregator, client) = Aggregator::new(create_test_net(), 1);
        let server = tokio::spawn(aggregator.run());

        let res = task::spawn_blocking(move || client.push(&[0.; 2], &[0.; 3]))
            .await
            .unwrap();
        assert!(matches!(res, Err(PsErr::SizeMismatch { network: "actor", .. })));

        let stats = server.await.unwrap();
        assert_eq!(stats.rejected, 1);
    }
}
