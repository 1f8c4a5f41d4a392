use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    optimization::Optimizer,
    service::{PsErr, Result},
    storage::{ParameterStore, SizeMismatchErr},
};

/// The canonical actor and critic parameters shared by every worker.
///
/// Only the aggregator applies gradients to it; everyone else reads through a
/// `GlobalHandle`. A push holds `gate` for writing across both stores and a pull
/// holds it for reading, so readers only see whole versions.
#[derive(Debug)]
pub struct GlobalNet<O: Optimizer> {
    actor: ParameterStore<O>,
    critic: ParameterStore<O>,
    gate: Arc<RwLock<()>>,
}

impl<O: Optimizer> GlobalNet<O> {
    /// Creates a new `GlobalNet`.
    ///
    /// # Arguments
    /// * `actor` - The store of the policy parameters.
    /// * `critic` - The store of the value function parameters.
    pub fn new(actor: ParameterStore<O>, critic: ParameterStore<O>) -> Self {
        Self {
            actor,
            critic,
            gate: Arc::new(RwLock::new(())),
        }
    }

    pub fn actor_len(&self) -> usize {
        self.actor.len()
    }

    pub fn critic_len(&self) -> usize {
        self.critic.len()
    }

    /// Returns the amount of pushes applied so far.
    pub fn version(&self) -> u64 {
        self.actor.version()
    }

    /// Creates a read-only view over the parameters.
    pub fn handle(&self) -> GlobalHandle<O> {
        GlobalHandle {
            actor: self.actor.clone(),
            critic: self.critic.clone(),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<O: Optimizer + Send> GlobalNet<O> {
    /// Applies one actor gradient and one critic gradient.
    ///
    /// Both lengths are checked before touching any parameter, a rejected push leaves
    /// both networks as they were.
    ///
    /// # Arguments
    /// * `actor_grad` - The gradient of the actor loss.
    /// * `critic_grad` - The gradient of the critic loss.
    ///
    /// # Returns
    /// The new version of the global network.
    pub fn apply(&self, actor_grad: &[f32], critic_grad: &[f32]) -> Result<u64> {
        check_len(&self.actor, actor_grad.len()).map_err(PsErr::actor)?;
        check_len(&self.critic, critic_grad.len()).map_err(PsErr::critic)?;

        let _write = self.gate.write();
        let version = self.actor.apply(actor_grad).map_err(PsErr::actor)?;
        self.critic.apply(critic_grad).map_err(PsErr::critic)?;
        Ok(version)
    }
}

fn check_len<O: Optimizer>(
    store: &ParameterStore<O>,
    len: usize,
) -> std::result::Result<(), SizeMismatchErr> {
    if store.len() != len {
        return Err(SizeMismatchErr {
            got: len,
            expected: store.len(),
        });
    }

    Ok(())
}

/// A snapshot reader of the global network.
#[derive(Debug)]
pub struct GlobalHandle<O: Optimizer> {
    actor: ParameterStore<O>,
    critic: ParameterStore<O>,
    gate: Arc<RwLock<()>>,
}

impl<O: Optimizer> Clone for GlobalHandle<O> {
    fn clone(&self) -> Self {
        Self {
            actor: self.actor.clone(),
            critic: self.critic.clone(),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<O: Optimizer> GlobalHandle<O> {
    pub fn version(&self) -> u64 {
        self.actor.version()
    }
}

impl<O: Optimizer + Send> GlobalHandle<O> {
    /// Copies the current global parameters into local buffers.
    ///
    /// # Arguments
    /// * `actor_out` - Where the actor parameters are written.
    /// * `critic_out` - Where the critic parameters are written.
    pub fn pull(&self, actor_out: &mut [f32], critic_out: &mut [f32]) -> Result<()> {
        let _read = self.gate.read();
        self.actor.pull_params(actor_out).map_err(PsErr::actor)?;
        self.critic.pull_params(critic_out).map_err(PsErr::critic)
    }
}
