pub mod arch;
pub mod error;
pub mod policy;

pub use arch::{ActorCritic, ActorCriticBuilder, Batch, DEFAULT_ENTROPY_BETA, Losses};
pub use error::{MlErr, Result};
pub use policy::Gaussian;
