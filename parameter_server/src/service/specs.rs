use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::optimization::RmsProp;

/// The dimensions of a dense layer, its parameters are `fan_in * fan_out` weights
/// followed by `fan_out` biases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerShape {
    pub fan_in: usize,
    pub fan_out: usize,
}

impl LayerShape {
    pub fn new(fan_in: usize, fan_out: usize) -> Self {
        Self { fan_in, fan_out }
    }

    /// The amount of parameters of a layer with this shape.
    pub fn size(&self) -> usize {
        (self.fan_in + 1) * self.fan_out
    }
}

/// How the weights of every layer are drawn, biases always start at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitSpec {
    Normal { std_dev: f32 },
    XavierUniform,
    Kaiming,
}

impl Default for InitSpec {
    fn default() -> Self {
        Self::Normal { std_dev: 0.01 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerSpec {
    RmsProp { decay: f32, epsilon: f32 },
    Adam { beta1: f32, beta2: f32, epsilon: f32 },
    GradientDescent,
}

impl Default for OptimizerSpec {
    fn default() -> Self {
        Self::RmsProp {
            decay: RmsProp::DEFAULT_DECAY,
            epsilon: RmsProp::DEFAULT_EPSILON,
        }
    }
}

/// One of the two global networks.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSpec {
    pub layers: Vec<LayerShape>,
    pub learning_rate: f32,
}

impl NetworkSpec {
    /// Creates a `NetworkSpec` from the `(fan_in, fan_out)` of every layer, in order.
    pub fn from_dims<I>(dims: I, learning_rate: f32) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        Self {
            layers: dims
                .into_iter()
                .map(|(fan_in, fan_out)| LayerShape::new(fan_in, fan_out))
                .collect(),
            learning_rate,
        }
    }

    pub fn size(&self) -> usize {
        self.layers.iter().map(LayerShape::size).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalSpec {
    pub actor: NetworkSpec,
    pub critic: NetworkSpec,
    pub init: InitSpec,
    pub optimizer: OptimizerSpec,
    pub shard_size: NonZeroUsize,
    pub seed: Option<u64>,
}
