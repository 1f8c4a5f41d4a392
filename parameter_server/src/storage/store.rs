use std::{
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use rayon::prelude::*;

use super::ParameterShard;
use crate::{
    initialization::ParamGen,
    optimization::Optimizer,
    storage::{Result, SizeMismatchErr},
};

/// Partitions one network's parameters in shards and applies gradients to them in
/// parallel.
///
/// Cloning a `ParameterStore` is cheap, every clone points to the same shards.
#[derive(Debug)]
pub struct ParameterStore<O: Optimizer> {
    nparams: usize,
    version: Arc<AtomicU64>,
    shards: Arc<[ParameterShard<O>]>,
    shard_size: NonZeroUsize,
}

impl<O: Optimizer> Clone for ParameterStore<O> {
    fn clone(&self) -> Self {
        Self {
            nparams: self.nparams,
            version: Arc::clone(&self.version),
            shards: Arc::clone(&self.shards),
            shard_size: self.shard_size,
        }
    }
}

impl<O: Optimizer> ParameterStore<O> {
    /// Creates a new `ParameterStore`.
    ///
    /// # Arguments
    /// * `shard_size` - The maximum amount of parameters per shard.
    /// * `param_gen` - The generator of the initial parameters, the store takes as many
    ///   parameters as it yields.
    /// * `optimizer_factory` - Builds the optimizer of a shard given the shard's length.
    ///
    /// # Returns
    /// A new `ParameterStore` instance.
    pub fn new<PG, OF>(shard_size: NonZeroUsize, mut param_gen: PG, mut optimizer_factory: OF) -> Self
    where
        PG: ParamGen,
        OF: FnMut(usize) -> O,
    {
        let mut nparams = 0;
        let mut shards = Vec::new();

        while let Some(params) = param_gen.sample(shard_size.get()) {
            nparams += params.len();
            let optimizer = optimizer_factory(params.len());
            shards.push(ParameterShard::new(params, optimizer));
        }

        Self {
            nparams,
            version: Arc::new(AtomicU64::new(0)),
            shards: Arc::from(shards),
            shard_size,
        }
    }

    /// Returns the amount of parameters in the store.
    pub fn len(&self) -> usize {
        self.nparams
    }

    /// Returns whether the store holds no parameters at all.
    pub fn is_empty(&self) -> bool {
        self.nparams == 0
    }

    /// Returns how many gradients have been applied to this store.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if self.nparams != len {
            return Err(SizeMismatchErr {
                got: len,
                expected: self.nparams,
            });
        }

        Ok(())
    }
}

impl<O: Optimizer + Send> ParameterStore<O> {
    /// Applies a full gradient to the parameters through each shard's optimizer.
    ///
    /// # Arguments
    /// * `grad` - A flat gradient with one entry per parameter.
    ///
    /// # Returns
    /// The new version of the store, or a `SizeMismatchErr` if `grad` has the wrong length.
    pub fn apply(&self, grad: &[f32]) -> Result<u64> {
        self.check_len(grad.len())?;

        self.shards
            .par_iter()
            .zip(grad.par_chunks(self.shard_size.get()))
            .try_for_each(|(shard, grad_slice)| shard.apply(grad_slice))?;

        Ok(self.version.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Copies every shard into a local buffer.
    ///
    /// # Arguments
    /// * `out` - A mutable slice where the parameters will be copied.
    ///
    /// # Returns
    /// A `SizeMismatchErr` if `out` doesn't have the length of the store.
    pub fn pull_params(&self, out: &mut [f32]) -> Result<()> {
        self.check_len(out.len())?;

        self.shards
            .par_iter()
            .zip(out.par_chunks_mut(self.shard_size.get()))
            .try_for_each(|(shard, out_slice)| shard.pull_params(out_slice))
    }

    /// Returns an owned copy of the current parameters.
    pub fn snapshot(&self) -> Result<Vec<f32>> {
        let mut out = vec![0.; self.nparams];
        self.pull_params(&mut out)?;
        Ok(out)
    }
}
