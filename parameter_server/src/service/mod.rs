mod aggregator;
mod builder;
mod client;
mod error;
mod specs;

pub use aggregator::{Aggregator, AggregatorStats};
pub use builder::GlobalNetBuilder;
pub use client::GlobalClient;
pub use error::{PsErr, Result};
pub use specs::{GlobalSpec, InitSpec, LayerShape, NetworkSpec, OptimizerSpec};
