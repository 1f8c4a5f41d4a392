use super::{Relu, Softplus, Tanh};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActFn {
    Relu(Relu),
    Tanh(Tanh),
    Softplus(Softplus),
}

impl ActFn {
    pub fn relu() -> Self {
        Self::Relu(Relu)
    }

    pub fn tanh() -> Self {
        Self::Tanh(Tanh)
    }

    pub fn softplus() -> Self {
        Self::Softplus(Softplus)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Relu(_) => "relu",
            Self::Tanh(_) => "tanh",
            Self::Softplus(_) => "softplus",
        }
    }

    pub fn f(&self, z: f32) -> f32 {
        match self {
            Self::Relu(a) => a.f(z),
            Self::Tanh(a) => a.f(z),
            Self::Softplus(a) => a.f(z),
        }
    }

    pub fn df(&self, z: f32) -> f32 {
        match self {
            Self::Relu(a) => a.df(z),
            Self::Tanh(a) => a.df(z),
            Self::Softplus(a) => a.df(z),
        }
    }
}
