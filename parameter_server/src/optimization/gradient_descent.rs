use super::{Optimizer, optimizer::check_len};
use crate::storage::Result;

/// Plain stochastic gradient descent, holds no state besides its learning rate.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for GradientDescent {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        check_len(grad.len(), params.len())?;

        for (p, g) in params.iter_mut().zip(grad) {
            *p -= self.learning_rate * g;
        }

        Ok(())
    }
}
