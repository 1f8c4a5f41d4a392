use std::f32::consts::PI;

use ndarray::{Array2, ArrayView1, ArrayView2, Zip};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::{MlErr, Result};

/// A batch of independent normal distributions, one per action dimension.
#[derive(Debug, Clone)]
pub struct Gaussian {
    pub mu: Array2<f32>,
    pub sigma: Array2<f32>,
}

impl Gaussian {
    /// Creates a new `Gaussian`.
    ///
    /// # Arguments
    /// * `mu` - The means, one row per sample.
    /// * `sigma` - The standard deviations, same shape as `mu`.
    pub fn new(mu: Array2<f32>, sigma: Array2<f32>) -> Result<Self> {
        MlErr::check("gaussian rows", sigma.nrows(), mu.nrows())?;
        MlErr::check("gaussian columns", sigma.ncols(), mu.ncols())?;
        Ok(Self { mu, sigma })
    }

    /// The log density of `actions` under each dimension's distribution.
    pub fn log_prob(&self, actions: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_actions(actions)?;

        let half_ln_2pi = 0.5 * (2. * PI).ln();
        let log_prob = Zip::from(&actions)
            .and(&self.mu)
            .and(&self.sigma)
            .map_collect(|&a, &mu, &sigma| {
                -(a - mu).powi(2) / (2. * sigma.powi(2)) - sigma.ln() - half_ln_2pi
            });

        Ok(log_prob)
    }

    /// The entropy of each dimension's distribution.
    pub fn entropy(&self) -> Array2<f32> {
        let half_ln_2pi = 0.5 * (2. * PI).ln();
        self.sigma.mapv(|sigma| 0.5 + half_ln_2pi + sigma.ln())
    }

    /// Draws one action per row and clips every dimension to its bounds.
    ///
    /// # Arguments
    /// * `rng` - The random number generator to sample with.
    /// * `low` - The lower bound of each action dimension.
    /// * `high` - The upper bound of each action dimension.
    ///
    /// # Returns
    /// The clipped actions or `MlErr::InvalidDistribution` if a spread isn't finite.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        low: ArrayView1<f32>,
        high: ArrayView1<f32>,
    ) -> Result<Array2<f32>> {
        MlErr::check("action low bounds", low.len(), self.mu.ncols())?;
        MlErr::check("action high bounds", high.len(), self.mu.ncols())?;

        let mut actions = Array2::zeros(self.mu.raw_dim());
        for ((i, j), a) in actions.indexed_iter_mut() {
            let normal = Normal::new(self.mu[(i, j)], self.sigma[(i, j)])
                .map_err(|e| MlErr::InvalidDistribution(e.to_string()))?;

            *a = normal.sample(rng).clamp(low[j], high[j]);
        }

        Ok(actions)
    }

    fn check_actions(&self, actions: ArrayView2<f32>) -> Result<()> {
        MlErr::check("action rows", actions.nrows(), self.mu.nrows())?;
        MlErr::check("action columns", actions.ncols(), self.mu.ncols())
    }
}
