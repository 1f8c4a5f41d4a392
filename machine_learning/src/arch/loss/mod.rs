mod loss_fn;
mod policy_loss;
mod sum_squared;

pub use loss_fn::LossFn;
pub use policy_loss::PolicyLoss;
pub use sum_squared::SumSquared;
