pub mod activations;
pub mod layers;
pub mod loss;
mod actor;
mod builder;
mod sequential;

pub use actor::GaussianActor;
pub use builder::{ActorCritic, ActorCriticBuilder, Batch, DEFAULT_ENTROPY_BETA, Losses};
pub use sequential::Sequential;
