use ndarray::{Array1, Array2, ArrayView2};

use super::{activations::ActFn, layers::Dense};
use crate::{MlErr, Result, policy::Gaussian};

/// Keeps every spread strictly positive.
const SIGMA_OFFSET: f32 = 1e-6;

/// A shared hidden layer feeding two heads: the bounded mean and the positive spread of a
/// gaussian policy.
///
/// Parameters are laid out as `hidden | mu | sigma`.
#[derive(Debug, Clone)]
pub struct GaussianActor {
    hidden: Dense,
    mu: Dense,
    sigma: Dense,
    bound: Array1<f32>,
}

impl GaussianActor {
    /// Creates a new `GaussianActor`.
    ///
    /// # Arguments
    /// * `observation_dim` - The width of a state.
    /// * `hidden` - The width of the hidden layer.
    /// * `bound` - The factor each mean is scaled by, one per action dimension.
    pub fn new(observation_dim: usize, hidden: usize, bound: Array1<f32>) -> Self {
        let action_dim = bound.len();

        Self {
            hidden: Dense::new((observation_dim, hidden), Some(ActFn::relu())),
            mu: Dense::new((hidden, action_dim), Some(ActFn::tanh())),
            sigma: Dense::new((hidden, action_dim), Some(ActFn::softplus())),
            bound,
        }
    }

    pub fn layers(&self) -> [&Dense; 3] {
        [&self.hidden, &self.mu, &self.sigma]
    }

    pub fn size(&self) -> usize {
        self.layers().iter().map(|layer| layer.size()).sum()
    }

    /// Computes the action distribution of a batch of states.
    pub fn forward(&mut self, params: &[f32], states: ArrayView2<f32>) -> Result<Gaussian> {
        let (hidden_params, mu_params, sigma_params) = self.split(params)?;

        let h = self.hidden.forward(hidden_params, states)?;
        let mu = self.mu.forward(mu_params, h.view())? * &self.bound;
        let sigma = self.sigma.forward(sigma_params, h.view())? + SIGMA_OFFSET;

        Gaussian::new(mu, sigma)
    }

    /// Back-propagates the loss derivatives w.r.t. the distribution of the last `forward`.
    ///
    /// # Arguments
    /// * `params` - The actor parameters.
    /// * `grad` - The actor gradient, overwritten.
    /// * `d_mu` - The derivative w.r.t. the scaled means.
    /// * `d_sigma` - The derivative w.r.t. the offset spreads.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        d_mu: Array2<f32>,
        d_sigma: Array2<f32>,
    ) -> Result<()> {
        let (hidden_params, mu_params, sigma_params) = self.split(params)?;
        MlErr::check("actor gradient", grad.len(), self.size())?;

        let (hidden_grad, rest) = grad.split_at_mut(self.hidden.size());
        let (mu_grad, sigma_grad) = rest.split_at_mut(self.mu.size());

        let d_h = self.mu.backward(mu_params, mu_grad, d_mu * &self.bound)?
            + self.sigma.backward(sigma_params, sigma_grad, d_sigma)?;

        self.hidden.backward(hidden_params, hidden_grad, d_h)?;
        Ok(())
    }

    fn split<'a>(&self, params: &'a [f32]) -> Result<(&'a [f32], &'a [f32], &'a [f32])> {
        MlErr::check("actor parameters", params.len(), self.size())?;

        let (hidden, rest) = params.split_at(self.hidden.size());
        let (mu, sigma) = rest.split_at(self.mu.size());
        Ok((hidden, mu, sigma))
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{arr1, array};

    use super::*;

    fn create_test_actor() -> (GaussianActor, Vec<f32>) {
        let actor = GaussianActor::new(3, 5, arr1(&[2., 1.]));
        let mut params: Vec<f32> = (0..actor.size())
            .map(|i| ((i * 37 % 11) as f32 - 5.) * 0.05)
            .collect();

        // keeps every hidden unit away from the relu kink
        params[15..20].fill(1.);
        (actor, params)
    }

    #[test]
    fn means_are_bounded_and_spreads_positive() {
        let (mut actor, params) = create_test_actor();
        let states = array![[10., -10., 3.], [0., 0., 0.]];

        let dist = actor.forward(&params, states.view()).unwrap();
        assert_eq!(dist.mu.dim(), (2, 2));
        assert!(dist.mu.column(0).iter().all(|mu| mu.abs() <= 2.));
        assert!(dist.mu.column(1).iter().all(|mu| mu.abs() <= 1.));
        assert!(dist.sigma.iter().all(|&sigma| sigma > 0.));
    }

    #[test]
    fn backward_matches_finite_differences() {
        let (mut actor, params) = create_test_actor();
        let states = array![[0.5, -1., 0.25], [1., 0.3, -0.7]];

        // loss = sum(mu) + 2 * sum(sigma)
        let loss = |actor: &mut GaussianActor, params: &[f32]| {
            let dist = actor.forward(params, states.view()).unwrap();
            dist.mu.sum() + 2. * dist.sigma.sum()
        };

        actor.forward(&params, states.view()).unwrap();
        let mut grad = vec![0.; actor.size()];
        actor
            .backward(
                &params,
                &mut grad,
                Array2::ones((2, 2)),
                Array2::from_elem((2, 2), 2.),
            )
            .unwrap();

        const EPS: f32 = 1e-2;
        for i in 0..params.len() {
            let mut plus = params.clone();
            let mut minus = params.clone();
            plus[i] += EPS;
            minus[i] -= EPS;

            let numeric = (loss(&mut actor, &plus) - loss(&mut actor, &minus)) / (2. * EPS);
            assert!(
                (numeric - grad[i]).abs() < 1e-2,
                "param {i}: numeric {numeric} analytic {}",
                grad[i]
            );
        }
    }
}
