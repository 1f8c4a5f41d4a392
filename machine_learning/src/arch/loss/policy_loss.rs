use ndarray::{Array2, ArrayView2, Zip};

use crate::{MlErr, Result, policy::Gaussian};

/// The entropy-regularized policy gradient loss of a gaussian actor.
///
/// `loss = -Σ (β·H(π) + log π(a|s) · td)`, where the temporal-difference errors are
/// constants from the actor's point of view.
#[derive(Debug, Clone, Copy)]
pub struct PolicyLoss {
    entropy_beta: f32,
}

impl PolicyLoss {
    /// Creates a new `PolicyLoss`.
    ///
    /// # Arguments
    /// * `entropy_beta` - The weight of the exploration bonus.
    pub fn new(entropy_beta: f32) -> Self {
        Self { entropy_beta }
    }

    /// Computes the loss of a batch.
    ///
    /// # Arguments
    /// * `dist` - The action distribution of each sampled state.
    /// * `actions` - The actions that were taken.
    /// * `td` - One temporal-difference error per row.
    pub fn loss(&self, dist: &Gaussian, actions: ArrayView2<f32>, td: ArrayView2<f32>) -> Result<f32> {
        MlErr::check("temporal-difference errors", td.nrows(), actions.nrows())?;

        let log_prob = dist.log_prob(actions)?;
        let exp_v = (&dist.entropy() * self.entropy_beta + &log_prob * &td).sum();
        Ok(-exp_v)
    }

    /// Computes the derivatives of the loss w.r.t. the distribution's means and spreads.
    ///
    /// # Returns
    /// The pair `(d_mu, d_sigma)`, both shaped like `actions`.
    pub fn loss_prime(
        &self,
        dist: &Gaussian,
        actions: ArrayView2<f32>,
        td: ArrayView2<f32>,
    ) -> Result<(Array2<f32>, Array2<f32>)> {
        MlErr::check("action rows", actions.nrows(), dist.mu.nrows())?;
        MlErr::check("action columns", actions.ncols(), dist.mu.ncols())?;
        MlErr::check("temporal-difference errors", td.nrows(), actions.nrows())?;

        let td = td.column(0);
        let beta = self.entropy_beta;

        let mut d_mu = Array2::zeros(actions.raw_dim());
        let mut d_sigma = Array2::zeros(actions.raw_dim());

        for (i, &td) in td.iter().enumerate() {
            Zip::from(d_mu.row_mut(i))
                .and(d_sigma.row_mut(i))
                .and(actions.row(i))
                .and(dist.mu.row(i))
                .and(dist.sigma.row(i))
                .for_each(|d_mu, d_sigma, &a, &mu, &sigma| {
                    let diff = a - mu;
                    *d_mu = -td * diff / sigma.powi(2);
                    *d_sigma = -(td * (diff.powi(2) / sigma.powi(3) - 1. / sigma) + beta / sigma);
                });
        }

        Ok((d_mu, d_sigma))
    }
}
