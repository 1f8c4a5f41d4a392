//! The worker side of asynchronous actor-critic training.
//!
//! Every `Worker` runs its own environment on its own thread, keeps a local copy of
//! the actor and critic in a `LocalNet`, and trains the global network by pushing
//! gradients through a `GlobalClient`.

pub mod builder;
pub mod config;
pub mod coordinator;
pub mod env;
pub mod error;
pub mod local;
pub mod memory;
pub mod metrics;
pub mod rollout;
pub mod telemetry;
pub mod worker;

pub use builder::WorkerBuilder;
pub use config::WorkerConfig;
pub use coordinator::Coordinator;
pub use error::{Result, WorkerErr};
pub use local::{LocalNet, UpdateStats};
pub use memory::Memory;
pub use metrics::WorkerMetrics;
pub use telemetry::{EpisodeReport, GraphSummary, SummaryWriter};
pub use worker::Worker;
