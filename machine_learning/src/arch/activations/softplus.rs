/// `ln(1 + e^z)`, always positive, used for the spread of the action distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Softplus;

impl Softplus {
    // Past this point `ln(1 + e^z)` equals `z` in f32 and `exp` starts overflowing.
    const LINEAR_FROM: f32 = 20.;

    pub fn f(&self, z: f32) -> f32 {
        if z > Self::LINEAR_FROM {
            z
        } else {
            z.exp().ln_1p()
        }
    }

    /// The logistic sigmoid.
    pub fn df(&self, z: f32) -> f32 {
        1. / (1. + (-z).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_and_smooth() {
        let s = Softplus;

        assert!((s.f(0.) - 2f32.ln()).abs() < 1e-6);
        assert!(s.f(-30.) > 0.);
        assert_eq!(s.f(50.), 50.);
        assert!((s.df(0.) - 0.5).abs() < 1e-6);
    }
}
