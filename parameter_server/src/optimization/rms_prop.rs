use super::{Optimizer, optimizer::check_len};
use crate::storage::Result;

/// RMSProp with the mean-square slot starting at one, so the first steps are no
/// larger than plain gradient descent.
#[derive(Debug)]
pub struct RmsProp {
    learning_rate: f32,
    decay: f32,
    epsilon: f32,
    mean_square: Box<[f32]>,
}

impl RmsProp {
    pub const DEFAULT_DECAY: f32 = 0.95;
    pub const DEFAULT_EPSILON: f32 = 1e-10;

    /// Creates a new `RmsProp` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold state for.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `decay` - Discount of the running mean of squared gradients.
    /// * `epsilon` - Added to the mean square before taking its root.
    ///
    /// # Returns
    /// A new `RmsProp` instance.
    pub fn new(len: usize, learning_rate: f32, decay: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            decay,
            epsilon,
            mean_square: vec![1.; len].into_boxed_slice(),
        }
    }
}

impl Optimizer for RmsProp {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        check_len(grad.len(), self.mean_square.len())?;
        check_len(params.len(), self.mean_square.len())?;

        let Self {
            learning_rate: lr,
            decay,
            epsilon: eps,
            ..
        } = *self;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.mean_square.iter_mut())
            .for_each(|((p, g), ms)| {
                *ms = decay * *ms + (1. - decay) * g * g;
                *p -= lr * g / (*ms + eps).sqrt();
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_step_matches_hand_computation() {
        let mut opt = RmsProp::new(2, 0.1, 0.95, 0.);
        let mut params = [1.0, 1.0];

        opt.update_params(&[2.0, 0.0], &mut params).unwrap();

        let ms: f32 = 0.95 + 0.05 * 4.0;
        let expected = 1.0 - 0.1 * 2.0 / ms.sqrt();
        assert!((params[0] - expected).abs() < 1e-6);
        assert_eq!(params[1], 1.0);
    }

    #[test]
    fn repeated_gradients_grow_the_step() {
        let mut opt = RmsProp::new(1, 0.1, 0.5, 0.);
        let mut params = [0.0];

        opt.update_params(&[0.1], &mut params).unwrap();
        let first = -params[0];
        opt.update_params(&[0.1], &mut params).unwrap();
        let second = -params[0] - first;

        assert!(second > first);
    }

    #[test]
    fn rejects_foreign_lengths() {
        let mut opt = RmsProp::new(2, 0.1, 0.95, 1e-10);
        let mut params = [0.0; 3];
        assert!(opt.update_params(&[0.0; 3], &mut params).is_err());
    }
}
