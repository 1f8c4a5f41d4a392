//! The global side of asynchronous actor-critic training.
//!
//! The actor and critic parameters live in sharded `ParameterStore`s grouped in a
//! `GlobalNet`. A single `Aggregator` task owns the write side and applies the
//! gradients workers push through their `GlobalClient`s, workers read the
//! parameters back with snapshot pulls.

pub mod global;
pub mod initialization;
pub mod optimization;
pub mod service;
pub mod storage;

pub use global::{GlobalHandle, GlobalNet};
pub use optimization::{DynOptimizer, Optimizer};
pub use service::{
    Aggregator, AggregatorStats, GlobalClient, GlobalNetBuilder, GlobalSpec, InitSpec, LayerShape,
    NetworkSpec, OptimizerSpec, PsErr,
};
