use std::{cell::RefCell, rc::Rc};

use rand::{SeedableRng, rngs::StdRng};

use super::{GlobalSpec, InitSpec, LayerShape, NetworkSpec, OptimizerSpec, Result};
use crate::{
    global::GlobalNet,
    initialization::{ChainedParamGen, ConstParamGen, ParamGen, RandParamGen, WeightInit},
    optimization::{Adam, DynOptimizer, GradientDescent, RmsProp},
    storage::ParameterStore,
};

/// Builds the `GlobalNet` described by a `GlobalSpec`.
#[derive(Debug, Default)]
pub struct GlobalNetBuilder;

impl GlobalNetBuilder {
    /// Creates a new `GlobalNetBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `GlobalNet` following a spec.
    ///
    /// # Arguments
    /// * `spec` - The layer shapes, initialization and optimizer of both global networks.
    ///
    /// # Returns
    /// A new `GlobalNet` or a `PsErr::Init` if the initialization spec is invalid.
    pub fn build(&self, spec: &GlobalSpec) -> Result<GlobalNet<DynOptimizer>> {
        let rng = self.generate_rng(spec.seed);

        let actor = self.resolve_store(spec, &spec.actor, &rng)?;
        let critic = self.resolve_store(spec, &spec.critic, &rng)?;
        Ok(GlobalNet::new(actor, critic))
    }

    fn resolve_store(
        &self,
        spec: &GlobalSpec,
        network: &NetworkSpec,
        rng: &Rc<RefCell<StdRng>>,
    ) -> Result<ParameterStore<DynOptimizer>> {
        let param_gen = self.resolve_param_gen(rng, &network.layers, spec.init)?;
        let optimizer = spec.optimizer;
        let lr = network.learning_rate;

        let store = ParameterStore::new(spec.shard_size, param_gen, |len| {
            self.resolve_optimizer(optimizer, lr, len)
        });

        Ok(store)
    }

    /// Chains a weight generator and a zero bias generator per layer.
    fn resolve_param_gen(
        &self,
        rng: &Rc<RefCell<StdRng>>,
        layers: &[LayerShape],
        init: InitSpec,
    ) -> Result<ChainedParamGen> {
        let mut param_gens: Vec<Box<dyn ParamGen>> = Vec::with_capacity(layers.len() * 2);

        for &LayerShape { fan_in, fan_out } in layers {
            let weight_init = match init {
                InitSpec::Normal { std_dev } => WeightInit::Normal { std_dev },
                InitSpec::XavierUniform => WeightInit::XavierUniform,
                InitSpec::Kaiming => WeightInit::Kaiming,
            };

            let weights = RandParamGen::new(Rc::clone(rng), weight_init, fan_in, fan_out)?;
            param_gens.push(Box::new(weights));
            param_gens.push(Box::new(ConstParamGen::new(0., fan_out)));
        }

        Ok(ChainedParamGen::new(param_gens))
    }

    fn resolve_optimizer(&self, spec: OptimizerSpec, lr: f32, len: usize) -> DynOptimizer {
        match spec {
            OptimizerSpec::RmsProp { decay, epsilon } => {
                Box::new(RmsProp::new(len, lr, decay, epsilon))
            }
            OptimizerSpec::Adam {
                beta1,
                beta2,
                epsilon,
            } => Box::new(Adam::new(len, lr, beta1, beta2, epsilon)),
            OptimizerSpec::GradientDescent => Box::new(GradientDescent::new(lr)),
        }
    }

    fn generate_rng(&self, seed: Option<u64>) -> Rc<RefCell<StdRng>> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Rc::new(RefCell::new(rng))
    }
}
