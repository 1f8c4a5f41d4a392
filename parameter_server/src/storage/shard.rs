use parking_lot::{Mutex, RwLock};

use crate::{
    optimization::Optimizer,
    storage::{Result, SizeMismatchErr},
};

/// A contiguous slice of a network's parameters together with the optimizer state
/// that belongs to it.
///
/// Writers take the parameter write lock for the whole optimizer step, so a reader
/// never observes a half-applied gradient.
#[derive(Debug)]
pub struct ParameterShard<O: Optimizer> {
    nparams: usize,
    params: RwLock<Box<[f32]>>,
    optimizer: Mutex<O>,
}

impl<O: Optimizer> ParameterShard<O> {
    /// Creates a new `ParameterShard`.
    ///
    /// # Arguments
    /// * `params` - The initial state of the parameters.
    /// * `optimizer` - The optimizer owning this shard's slot state.
    ///
    /// # Returns
    /// A new `ParameterShard` instance.
    pub fn new(params: Vec<f32>, optimizer: O) -> Self {
        Self {
            nparams: params.len(),
            params: RwLock::new(params.into_boxed_slice()),
            optimizer: Mutex::new(optimizer),
        }
    }

    /// Runs one optimizer step over this shard.
    ///
    /// # Arguments
    /// * `grad` - The gradient slice matching this shard.
    ///
    /// # Returns
    /// A `SizeMismatchErr` if `grad` isn't the same size as this shard.
    pub fn apply(&self, grad: &[f32]) -> Result<()> {
        if self.nparams != grad.len() {
            return Err(SizeMismatchErr {
                got: grad.len(),
                expected: self.nparams,
            });
        }

        let mut params = self.params.write();
        self.optimizer.lock().update_params(grad, &mut params)
    }

    /// Copies the shard's parameters into the provided destination buffer.
    ///
    /// # Arguments
    /// * `out` - A mutable slice where the parameters will be copied.
    ///
    /// # Returns
    /// A `SizeMismatchErr` if `out` isn't the same size as this shard.
    pub fn pull_params(&self, out: &mut [f32]) -> Result<()> {
        if self.nparams != out.len() {
            return Err(SizeMismatchErr {
                got: out.len(),
                expected: self.nparams,
            });
        }

        out.copy_from_slice(&self.params.read());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AddOptimizer;

    impl Optimizer for AddOptimizer {
        fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
            params.iter_mut().zip(grad).for_each(|(p, g)| *p += g);
            Ok(())
        }
    }

    #[test]
    fn apply_then_pull() {
        let shard = ParameterShard::new(vec![0.; 3], AddOptimizer);

        shard.apply(&[1.0, 2.0, 3.0]).unwrap();
        shard.apply(&[1.0, 1.0, 1.0]).unwrap();

        let mut out = [0.; 3];
        shard.pull_params(&mut out).unwrap();
        assert_eq!(out, [2., 3., 4.]);
    }

    #[test]
    fn rejects_wrong_lengths() {
        let shard = ParameterShard::new(vec![0.; 2], AddOptimizer);

        let err = shard.apply(&[1.0]).unwrap_err();
        assert_eq!(err, SizeMismatchErr { got: 1, expected: 2 });

        let mut out = [0.; 3];
        assert!(shard.pull_params(&mut out).is_err());
    }
}
