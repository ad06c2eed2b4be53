//! Loss and accuracy of a network output against its target.

use ndarray::Zip;

use crate::{
    error::Result,
    loss::{ensure_comparable, LossCriterion, MeanSquaredError},
    tensor::Tensor,
};

/// Outputs at or above this value count as a positive prediction.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Mean squared error between `output` and `target`.
pub fn loss(output: &Tensor, target: &Tensor) -> Result<f64> {
    Ok(MeanSquaredError::compute(output, target)?.value())
}

/// Gradient of [`loss`] with respect to `output`: `2 * (output - target) / n`.
pub fn loss_gradient(output: &Tensor, target: &Tensor) -> Result<Tensor> {
    Ok(MeanSquaredError::compute(output, target)?.grad())
}

/// Fraction of elements where the thresholded `output` equals `target` exactly.
pub fn accuracy(output: &Tensor, target: &Tensor) -> Result<f64> {
    ensure_comparable("accuracy", output, target)?;

    let n_corrects = Zip::from(&output.view())
        .and(&target.view())
        .fold(0usize, |count, &output, &target| {
            let predicted = if output >= DECISION_THRESHOLD { 1.0 } else { 0.0 };
            if predicted == target {
                count + 1
            } else {
                count
            }
        });
    Ok(n_corrects as f64 / output.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn tensor(rows: &[&[f64]]) -> Tensor {
        Tensor::new(rows.iter().map(|row| row.to_vec()).collect()).unwrap()
    }

    #[test]
    fn test_loss() {
        let output = tensor(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let target = tensor(&[&[1.0, 1.0], &[1.0, 1.0]]);
        // (0 + 1 + 4 + 9) / 4
        assert_relative_eq!(3.5, loss(&output, &target).unwrap());
    }

    #[test]
    fn loss_is_zero_only_for_equal_tensors() {
        let output = tensor(&[&[0.3, -1.2, 5.0]]);
        assert_relative_eq!(0.0, loss(&output, &output.clone()).unwrap());

        let nearby = tensor(&[&[0.3, -1.2, 5.001]]);
        assert!(loss(&output, &nearby).unwrap() > 0.0);
    }

    #[test]
    fn test_loss_gradient() {
        let output = tensor(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let target = tensor(&[&[1.0, 1.0], &[1.0, 1.0]]);
        let grad = loss_gradient(&output, &target).unwrap();
        assert_eq!(vec![vec![0.0, 0.5], vec![1.0, 1.5]], grad.data());
    }

    #[test]
    fn test_accuracy() {
        let output = tensor(&[&[0.9, 0.2, 0.5, 0.49]]);
        let target = tensor(&[&[1.0, 0.0, 0.0, 0.0]]);
        assert_relative_eq!(0.75, accuracy(&output, &target).unwrap());
    }

    #[test]
    fn accuracy_compares_exact_targets() {
        let output = tensor(&[&[0.9, 0.1]]);
        // Non-binary targets never match.
        let target = tensor(&[&[0.8, 0.1]]);
        assert_relative_eq!(0.0, accuracy(&output, &target).unwrap());
    }

    #[test]
    fn metrics_reject_mismatched_shapes() {
        let output = tensor(&[&[1.0, 2.0]]);
        let target = tensor(&[&[1.0], &[2.0]]);
        assert!(loss(&output, &target).unwrap_err().is_invalid_argument());
        assert!(loss_gradient(&output, &target).is_err());
        assert!(accuracy(&output, &target).is_err());
    }
}
