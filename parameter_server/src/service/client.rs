use tokio::sync::{mpsc, oneshot};

use super::{PsErr, Result, aggregator::Push};
use crate::{global::GlobalHandle, optimization::Optimizer};

/// A worker's connection to the global network.
///
/// Every method blocks the calling thread, they are meant to be called from the
/// worker threads and never from inside an async context.
pub struct GlobalClient<O: Optimizer> {
    tx: mpsc::Sender<Push>,
    handle: GlobalHandle<O>,
}

impl<O: Optimizer> Clone for GlobalClient<O> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            handle: self.handle.clone(),
        }
    }
}

impl<O: Optimizer> GlobalClient<O> {
    pub(super) fn new(tx: mpsc::Sender<Push>, handle: GlobalHandle<O>) -> Self {
        Self { tx, handle }
    }

    pub fn version(&self) -> u64 {
        self.handle.version()
    }
}

impl<O: Optimizer + Send> GlobalClient<O> {
    /// Sends both gradients to the aggregator and waits until they're applied.
    ///
    /// # Arguments
    /// * `actor_grad` - The gradient of the actor loss w.r.t. the local actor parameters.
    /// * `critic_grad` - The gradient of the critic loss w.r.t. the local critic parameters.
    ///
    /// # Returns
    /// The version of the global network right after this push.
    pub fn push(&self, actor_grad: &[f32], critic_grad: &[f32]) -> Result<u64> {
        let (ack, ack_rx) = oneshot::channel();
        let push = Push {
            actor_grad: actor_grad.to_vec(),
            critic_grad: critic_grad.to_vec(),
            ack,
        };

        self.tx
            .blocking_send(push)
            .map_err(|_| PsErr::Disconnected)?;

        ack_rx.blocking_recv().map_err(|_| PsErr::Disconnected)?
    }

    /// Copies a snapshot of the global parameters into local buffers.
    pub fn pull(&self, actor_out: &mut [f32], critic_out: &mut [f32]) -> Result<()> {
        self.handle.pull(actor_out, critic_out)
    }
}
