mod act_fn;
mod relu;
mod softplus;
mod tanh;

pub use act_fn::ActFn;
pub use relu::Relu;
pub use softplus::Softplus;
pub use tanh::Tanh;
