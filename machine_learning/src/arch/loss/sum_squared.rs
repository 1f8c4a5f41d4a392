use ndarray::{Array2, ArrayView2};

use super::LossFn;

/// Sum of squared errors, the critic's loss over a batch of temporal-difference errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct SumSquared;

impl SumSquared {
    /// Returns a new `SumSquared`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for SumSquared {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        (&y - &y_pred).mapv(|td| td.powi(2)).sum()
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        (&y_pred - &y) * 2.0
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn sums_instead_of_averaging() {
        let v = array![[1f32], [0.]];
        let target = array![[3f32], [-1.]];

        assert_eq!(SumSquared.loss(v.view(), target.view()), 5.);
        assert_eq!(
            SumSquared.loss_prime(v.view(), target.view()),
            array![[-4f32], [2.]]
        );
    }
}
