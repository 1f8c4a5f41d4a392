use super::ParamGen;

/// Yields the same value a fixed amount of times, the biases of every layer start
/// from one of these.
pub struct ConstParamGen {
    value: f32,
    remaining: usize,
}

impl ConstParamGen {
    /// Creates a new `ConstParamGen`.
    ///
    /// # Arguments
    /// * `value` - The value to yield.
    /// * `limit` - How many values to yield in total.
    pub fn new(value: f32, limit: usize) -> Self {
        Self {
            value,
            remaining: limit,
        }
    }
}

impl ParamGen for ConstParamGen {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        let n = n.min(self.remaining);
        self.remaining -= n;

        (n > 0).then(|| vec![self.value; n])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted() {
        let mut param_gen = ConstParamGen::new(1., 0);
        assert!(param_gen.sample(1).is_none());
    }

    #[test]
    fn last_sample_is_short() {
        let mut param_gen = ConstParamGen::new(0., 10);

        assert_eq!(param_gen.sample(7).unwrap(), vec![0.; 7]);
        assert_eq!(param_gen.sample(7).unwrap(), vec![0.; 3]);
        assert!(param_gen.sample(1).is_none());
    }
}
