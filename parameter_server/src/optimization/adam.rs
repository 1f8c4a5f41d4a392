use super::{Optimizer, optimizer::check_len};
use crate::storage::Result;

/// Adam, with bias corrected first and second moment estimates.
#[derive(Debug)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    steps: i32,
    first_moment: Box<[f32]>,
    second_moment: Box<[f32]>,
}

impl Adam {
    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold state for.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `beta1` - Discount of the running mean of gradients.
    /// * `beta2` - Discount of the running mean of squared gradients.
    /// * `epsilon` - Added to the root of the second moment.
    pub fn new(len: usize, learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            steps: 0,
            first_moment: vec![0.; len].into_boxed_slice(),
            second_moment: vec![0.; len].into_boxed_slice(),
        }
    }
}

impl Optimizer for Adam {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        check_len(grad.len(), self.first_moment.len())?;
        check_len(params.len(), self.first_moment.len())?;

        self.steps = self.steps.saturating_add(1);
        let (b1, b2, eps) = (self.beta1, self.beta2, self.epsilon);
        let correction1 = 1. - b1.powi(self.steps);
        let correction2 = 1. - b2.powi(self.steps);
        let step_size = self.learning_rate * correction2.sqrt() / correction1;

        let moments = self.first_moment.iter_mut().zip(self.second_moment.iter_mut());
        for ((p, &g), (m, v)) in params.iter_mut().zip(grad).zip(moments) {
            *m = b1 * *m + (1. - b1) * g;
            *v = b2 * *v + (1. - b2) * g * g;
            *p -= step_size * *m / (v.sqrt() + eps);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_by_learning_rate() {
        let mut opt = Adam::new(2, 0.01, 0.9, 0.999, 0.);
        let mut params = [0.0, 0.0];

        opt.update_params(&[3.0, -0.5], &mut params).unwrap();

        assert!((params[0] + 0.01).abs() < 1e-5);
        assert!((params[1] - 0.01).abs() < 1e-5);
    }

    #[test]
    fn constant_gradient_keeps_a_constant_step() {
        let mut opt = Adam::new(1, 0.1, 0.9, 0.999, 0.);
        let mut params = [0.0];

        for step in 1..=3 {
            opt.update_params(&[0.2], &mut params).unwrap();
            assert!((params[0] + 0.1 * step as f32).abs() < 1e-4);
        }
    }

    #[test]
    fn rejects_foreign_lengths() {
        let mut opt = Adam::new(2, 0.1, 0.9, 0.999, 1e-8);
        assert!(opt.update_params(&[0.0; 2], &mut [0.0; 3]).is_err());
    }
}
