use std::{cell::RefCell, rc::Rc};

use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use super::{ParamGen, RandErr, Result};

/// How the weights of one dense layer are drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightInit {
    /// `N(0, std_dev)`.
    Normal { std_dev: f32 },
    /// `U(-r, r)` with `r = sqrt(6 / (fan_in + fan_out))`.
    XavierUniform,
    /// `N(0, sqrt(2 / fan_in))`.
    Kaiming,
}

#[derive(Debug)]
enum WeightDist {
    Normal(Normal<f32>),
    Uniform(Uniform<f32>),
}

impl WeightDist {
    fn resolve(init: WeightInit, fan_in: usize, fan_out: usize) -> Result<Self> {
        let dist = match init {
            WeightInit::Normal { std_dev } => Self::normal(std_dev)?,
            WeightInit::Kaiming => Self::normal((2. / fan_in as f32).sqrt())?,
            WeightInit::XavierUniform => {
                let r = (6. / (fan_in + fan_out) as f32).sqrt();
                Self::Uniform(Uniform::new(-r, r)?)
            }
        };

        Ok(dist)
    }

    fn normal(std_dev: f32) -> Result<Self> {
        if !std_dev.is_finite() || std_dev < 0. {
            return Err(RandErr::Deviation(std_dev));
        }

        Ok(Self::Normal(Normal::new(0., std_dev)?))
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        match self {
            Self::Normal(normal) => normal.sample(rng),
            Self::Uniform(uniform) => uniform.sample(rng),
        }
    }
}

/// Yields the `fan_in * fan_out` weights of one layer.
///
/// Every layer of a network shares the same seeded rng so a whole initialization is
/// reproducible from a single seed.
pub struct RandParamGen<R: Rng> {
    rng: Rc<RefCell<R>>,
    dist: WeightDist,
    remaining: usize,
}

impl<R: Rng> RandParamGen<R> {
    /// Creates the weight generator of a `(fan_in, fan_out)` layer.
    ///
    /// # Returns
    /// A `RandErr` if `init` doesn't describe a valid distribution.
    pub fn new(rng: Rc<RefCell<R>>, init: WeightInit, fan_in: usize, fan_out: usize) -> Result<Self> {
        Ok(Self {
            rng,
            dist: WeightDist::resolve(init, fan_in, fan_out)?,
            remaining: fan_in * fan_out,
        })
    }
}

impl<R: Rng> ParamGen for RandParamGen<R> {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        let take = n.min(self.remaining);
        if take == 0 {
            return None;
        }

        self.remaining -= take;
        let mut rng = self.rng.borrow_mut();
        Some((0..take).map(|_| self.dist.draw(&mut *rng)).collect())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn seeded_rng() -> Rc<RefCell<StdRng>> {
        Rc::new(RefCell::new(StdRng::seed_from_u64(42)))
    }

    #[test]
    fn yields_one_layer_of_weights() {
        let init = WeightInit::Normal { std_dev: 1. };
        let mut param_gen = RandParamGen::new(seeded_rng(), init, 2, 5).unwrap();

        assert_eq!(param_gen.sample(7).unwrap().len(), 7);
        assert_eq!(param_gen.sample(7).unwrap().len(), 3);
        assert!(param_gen.sample(1).is_none());
    }

    #[test]
    fn xavier_stays_in_range() {
        let mut param_gen = RandParamGen::new(seeded_rng(), WeightInit::XavierUniform, 3, 3).unwrap();

        let weights = param_gen.sample(9).unwrap();
        assert!(weights.iter().all(|w| (-1.0..1.0).contains(w)));
    }

    #[test]
    fn same_seed_same_weights() {
        let draw = || {
            RandParamGen::new(seeded_rng(), WeightInit::Kaiming, 4, 2)
                .unwrap()
                .sample(8)
        };

        assert_eq!(draw(), draw());
    }

    #[test]
    fn shared_rng_advances_across_layers() {
        let rng = seeded_rng();
        let init = WeightInit::Normal { std_dev: 0.1 };

        let a = RandParamGen::new(Rc::clone(&rng), init, 2, 2).unwrap().sample(4);
        let b = RandParamGen::new(rng, init, 2, 2).unwrap().sample(4);
        assert_ne!(a, b);
    }

    #[test]
    fn invalid_deviation() {
        for std_dev in [-1., f32::NAN, f32::INFINITY] {
            let init = WeightInit::Normal { std_dev };
            let err = RandParamGen::new(seeded_rng(), init, 1, 1).err().unwrap();
            assert!(matches!(err, RandErr::Deviation(_)));
        }
    }

    #[test]
    fn kaiming_needs_inputs() {
        let res = RandParamGen::new(seeded_rng(), WeightInit::Kaiming, 0, 3);
        assert!(matches!(res, Err(RandErr::Deviation(_))));
    }
}
