use crate::storage::{Result, SizeMismatchErr};

/// Defines the strategy for updating parameters given a gradient.
pub trait Optimizer {
    /// Updates the provided slice of parameters using `grad`.
    ///
    /// # Arguments
    /// * `grad` - The gradient of the loss with respect to `params`.
    /// * `params` - The parameters to update.
    ///
    /// # Returns
    /// An error if there's a mismatch in the sizes of `grad` and `params`.
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()>;
}

/// An optimizer chosen at runtime.
pub type DynOptimizer = Box<dyn Optimizer + Send>;

impl<O: Optimizer + ?Sized> Optimizer for Box<O> {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        (**self).update_params(grad, params)
    }
}

/// Checks that a gradient slice matches the parameters or the optimizer state it targets.
pub(super) fn check_len(got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(SizeMismatchErr { got, expected });
    }

    Ok(())
}
