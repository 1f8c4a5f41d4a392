mod error;
mod shard;
mod store;

pub use error::{Result, SizeMismatchErr};
use shard::ParameterShard;
pub use store::ParameterStore;
