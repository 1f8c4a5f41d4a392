use ndarray::{Array2, ArrayView2};

use super::layers::Dense;
use crate::{MlErr, Result};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
///
/// The parameters of every layer live back to back in a single flat slice, in forward order.
#[derive(Debug, Clone)]
pub struct Sequential {
    layers: Vec<Dense>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Dense>,
    {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    /// Returns the amount of parameters of the whole model.
    pub fn size(&self) -> usize {
        self.layers.iter().map(Dense::size).sum()
    }

    /// Makes a forward pass through the network.
    ///
    /// # Arguments
    /// * `params` - The parameters of every layer.
    /// * `x` - The input data.
    ///
    /// # Returns
    /// The prediction for the given input or an error if occurred.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        MlErr::check("sequential parameters", params.len(), self.size())?;

        let mut offset = 0;
        let mut out = x.to_owned();

        for layer in self.layers.iter_mut() {
            let size = layer.size();
            out = layer.forward(&params[offset..offset + size], out.view())?;
            offset += size;
        }

        Ok(out)
    }

    /// Back-propagates `d` through every layer, last to first.
    ///
    /// # Arguments
    /// * `params` - The parameters of every layer.
    /// * `grad` - The gradient of every layer, overwritten.
    /// * `d` - The derivative of the loss w.r.t. the output of the last `forward`.
    ///
    /// # Returns
    /// The derivative of the loss w.r.t. the input of the last `forward`.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        mut d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        MlErr::check("sequential parameters", params.len(), self.size())?;
        MlErr::check("sequential gradient", grad.len(), self.size())?;

        let mut end = params.len();

        for layer in self.layers.iter_mut().rev() {
            let start = end - layer.size();
            d = layer.backward(&params[start..end], &mut grad[start..end], d)?;
            end = start;
        }

        Ok(d)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::arch::activations::ActFn;

    #[test]
    fn layers_read_consecutive_slices() {
        let mut model = Sequential::new([Dense::new((2, 2), None), Dense::new((2, 1), None)]);
        assert_eq!(model.size(), 6 + 3);

        // identity, zero bias, then sum plus one
        let params = [1., 0., 0., 1., 0., 0., 1., 1., 1.];
        let y = model.forward(&params, array![[2., 3.]].view()).unwrap();
        assert_eq!(y, array![[6f32]]);
    }

    #[test]
    fn backward_fills_every_layer() {
        let mut model = Sequential::new([
            Dense::new((3, 4), Some(ActFn::relu())),
            Dense::new((4, 1), None),
        ]);
        let params: Vec<f32> = (0..model.size()).map(|i| 0.05 * i as f32 - 0.3).collect();
        let x = array![[0.5, -1., 0.25], [1., 0.3, -0.7]];

        let y = model.forward(&params, x.view()).unwrap();
        let mut grad = vec![0.; model.size()];
        let dx = model
            .backward(&params, &mut grad, Array2::ones(y.raw_dim()))
            .unwrap();

        assert_eq!(dx.dim(), (2, 3));
        // output bias receives one unit per row
        assert_eq!(grad[model.size() - 1], 2.);
    }

    #[test]
    fn rejects_short_gradient() {
        let mut model = Sequential::new([Dense::new((1, 1), None)]);
        let params = [1., 0.];
        let y = model.forward(&params, array![[1.]].view()).unwrap();

        assert!(model.backward(&params, &mut [0.], y).is_err());
    }
}
