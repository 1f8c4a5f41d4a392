use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rand::Rng;

use super::{
    GaussianActor, Sequential,
    activations::ActFn,
    layers::Dense,
    loss::{LossFn, PolicyLoss, SumSquared},
};
use crate::{MlErr, Result};

const DEFAULT_ACTOR_HIDDEN: usize = 400;
const DEFAULT_CRITIC_HIDDEN: usize = 300;
/// The entropy bonus weight used when none is given.
pub const DEFAULT_ENTROPY_BETA: f32 = 0.01;

/// Builds an `ActorCritic` for a given observation and action space.
#[derive(Debug, Clone)]
pub struct ActorCriticBuilder {
    observation_dim: usize,
    low: Vec<f32>,
    high: Vec<f32>,
    actor_hidden: usize,
    critic_hidden: usize,
    entropy_beta: f32,
}

impl ActorCriticBuilder {
    /// Creates a new `ActorCriticBuilder`.
    ///
    /// # Arguments
    /// * `observation_dim` - The width of a state.
    /// * `low` - The lower bound of each action dimension.
    /// * `high` - The upper bound of each action dimension.
    pub fn new(observation_dim: usize, low: Vec<f32>, high: Vec<f32>) -> Self {
        Self {
            observation_dim,
            low,
            high,
            actor_hidden: DEFAULT_ACTOR_HIDDEN,
            critic_hidden: DEFAULT_CRITIC_HIDDEN,
            entropy_beta: DEFAULT_ENTROPY_BETA,
        }
    }

    pub fn actor_hidden(mut self, units: usize) -> Self {
        self.actor_hidden = units;
        self
    }

    pub fn critic_hidden(mut self, units: usize) -> Self {
        self.critic_hidden = units;
        self
    }

    pub fn entropy_beta(mut self, entropy_beta: f32) -> Self {
        self.entropy_beta = entropy_beta;
        self
    }

    /// Builds the actor and critic networks.
    ///
    /// # Returns
    /// A new `ActorCritic` or an error if the action bounds are inconsistent.
    pub fn build(self) -> Result<ActorCritic> {
        MlErr::check("action bounds", self.high.len(), self.low.len())?;

        if let Some((&low, &high)) = self
            .low
            .iter()
            .zip(&self.high)
            .find(|(low, high)| low > high)
        {
            return Err(MlErr::InvalidBounds { low, high });
        }

        let high = Array1::from(self.high);
        let actor = GaussianActor::new(self.observation_dim, self.actor_hidden, high.clone());
        let critic = Sequential::new([
            Dense::new((self.observation_dim, self.critic_hidden), Some(ActFn::relu())),
            Dense::new((self.critic_hidden, 1), None),
        ]);

        Ok(ActorCritic {
            observation_dim: self.observation_dim,
            actor,
            critic,
            low: Array1::from(self.low),
            high,
            policy_loss: PolicyLoss::new(self.entropy_beta),
            value_loss: SumSquared::new(),
        })
    }
}

fn activation_name(layer: &Dense) -> &'static str {
    layer.act_fn().map_or("linear", |act_fn| act_fn.name())
}

/// A sampled mini-batch, one row per transition.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    pub states: ArrayView2<'a, f32>,
    pub actions: ArrayView2<'a, f32>,
    pub v_targets: ArrayView2<'a, f32>,
}

/// The losses of one backprop pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Losses {
    pub actor: f32,
    pub critic: f32,
    /// The spread of the first row's action distribution.
    pub sigma: Vec<f32>,
}

/// A gaussian policy network and a state value network sharing the same input.
///
/// Holds no parameters, every operation reads them from the flat slices it is given.
#[derive(Debug, Clone)]
pub struct ActorCritic {
    observation_dim: usize,
    actor: GaussianActor,
    critic: Sequential,
    low: Array1<f32>,
    high: Array1<f32>,
    policy_loss: PolicyLoss,
    value_loss: SumSquared,
}

impl ActorCritic {
    pub fn observation_dim(&self) -> usize {
        self.observation_dim
    }

    pub fn action_dim(&self) -> usize {
        self.high.len()
    }

    pub fn action_bounds(&self) -> (ArrayView1<'_, f32>, ArrayView1<'_, f32>) {
        (self.low.view(), self.high.view())
    }

    pub fn actor_size(&self) -> usize {
        self.actor.size()
    }

    pub fn critic_size(&self) -> usize {
        self.critic.size()
    }

    /// The `(fan_in, fan_out)` of every actor layer, in parameter order.
    pub fn actor_layers(&self) -> Vec<(usize, usize)> {
        self.actor.layers().iter().map(|layer| layer.dim()).collect()
    }

    /// The `(fan_in, fan_out)` of every critic layer, in parameter order.
    pub fn critic_layers(&self) -> Vec<(usize, usize)> {
        self.critic.layers().iter().map(Dense::dim).collect()
    }

    /// The activation name of every actor layer, in parameter order.
    pub fn actor_activations(&self) -> Vec<&'static str> {
        self.actor.layers().iter().map(|layer| activation_name(layer)).collect()
    }

    /// The activation name of every critic layer, in parameter order.
    pub fn critic_activations(&self) -> Vec<&'static str> {
        self.critic.layers().iter().map(activation_name).collect()
    }

    /// Samples a clipped action for a single state.
    pub fn choose_action<R: Rng + ?Sized>(
        &mut self,
        actor_params: &[f32],
        state: &[f32],
        rng: &mut R,
    ) -> Result<Vec<f32>> {
        let states = ArrayView2::from_shape((1, state.len()), state)?;
        let dist = self.actor.forward(actor_params, states)?;
        let actions = dist.sample(rng, self.low.view(), self.high.view())?;

        Ok(actions.into_iter().collect())
    }

    /// Estimates the value of a single state.
    pub fn value(&mut self, critic_params: &[f32], state: &[f32]) -> Result<f32> {
        let states = ArrayView2::from_shape((1, state.len()), state)?;
        let v = self.critic.forward(critic_params, states)?;
        Ok(v[(0, 0)])
    }

    /// Computes both losses of a batch and their gradients.
    ///
    /// # Arguments
    /// * `actor_params` - The actor parameters.
    /// * `critic_params` - The critic parameters.
    /// * `batch` - The sampled transitions.
    /// * `actor_grad` - Where the actor gradient is written.
    /// * `critic_grad` - Where the critic gradient is written.
    ///
    /// # Returns
    /// The losses of the batch, or an error if any shape doesn't match the networks.
    pub fn backprop(
        &mut self,
        actor_params: &[f32],
        critic_params: &[f32],
        batch: Batch<'_>,
        actor_grad: &mut [f32],
        critic_grad: &mut [f32],
    ) -> Result<Losses> {
        let Batch {
            states,
            actions,
            v_targets,
        } = batch;
        MlErr::check("batch targets", v_targets.ncols(), 1)?;

        let v = self.critic.forward(critic_params, states)?;
        MlErr::check("batch targets", v_targets.nrows(), v.nrows())?;
        let td = &v_targets - &v;

        let critic = self.value_loss.loss(v.view(), v_targets);
        let d_v = self.value_loss.loss_prime(v.view(), v_targets);
        self.critic.backward(critic_params, critic_grad, d_v)?;

        let dist = self.actor.forward(actor_params, states)?;
        let actor = self.policy_loss.loss(&dist, actions, td.view())?;
        let (d_mu, d_sigma) = self.policy_loss.loss_prime(&dist, actions, td.view())?;
        self.actor.backward(actor_params, actor_grad, d_mu, d_sigma)?;

        let sigma = dist
            .sigma
            .axis_iter(Axis(0))
            .next()
            .map(|row| row.to_vec())
            .unwrap_or_default();

        Ok(Losses {
            actor,
            critic,
            sigma,
        })
    }
}
