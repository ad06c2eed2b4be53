use ndarray::{ArrayView2, Zip};

use crate::{
    error::{Error, Result},
    tensor::Tensor,
};

pub trait LossCriterion: Sized {
    fn compute(output: &Tensor, target: &Tensor) -> Result<Self>;

    fn value(&self) -> f64;

    /// Gradient of the loss with respect to the output.
    fn grad(&self) -> Tensor;
}

/// Computes mean squared error over a batch and elements for each data.
pub struct MeanSquaredError {
    value: f64,
    grad: Tensor,
}

pub(crate) fn ensure_comparable(
    op: &'static str,
    output: &Tensor,
    target: &Tensor,
) -> Result<()> {
    if output.shape() != target.shape() {
        return Err(Error::ShapeMismatch {
            op,
            expected: output.shape(),
            found: target.shape(),
        });
    }
    Ok(())
}

fn squared_error_sum(output: ArrayView2<f64>, target: ArrayView2<f64>) -> f64 {
    Zip::from(&output)
        .and(&target)
        .fold(0.0, |loss, &output, &target| loss + (output - target).powi(2))
}

impl LossCriterion for MeanSquaredError {
    fn compute(output: &Tensor, target: &Tensor) -> Result<Self> {
        ensure_comparable("mean squared error", output, target)?;

        let n = output.len() as f64;
        let loss = squared_error_sum(output.view(), target.view()) / n;
        let grad = Zip::from(&output.view())
            .and(&target.view())
            .map_collect(|&output, &target| 2.0 * (output - target) / n);

        Ok(Self {
            value: loss,
            grad: Tensor::from_array(grad)?,
        })
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn grad(&self) -> Tensor {
        self.grad.clone()
    }
}
