use std::{fmt, str::FromStr};

use ndarray::{Array2, ArrayView2};

use crate::error::Error;

pub trait Activation {
    fn compute(&self, x: ArrayView2<f64>) -> Array2<f64>;

    fn derivative(&self, x: ArrayView2<f64>) -> Array2<f64>;
}

/// Tag naming one of the supported element-wise nonlinearities.
/// Parsed case-insensitively and written back in lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationFunction {
    Relu,
    Sigmoid,
}

impl ActivationFunction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Relu => "relu",
            Self::Sigmoid => "sigmoid",
        }
    }
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Activation for ActivationFunction {
    fn compute(&self, x: ArrayView2<f64>) -> Array2<f64> {
        match self {
            Self::Relu => x.mapv(|v| v.max(0.0)),
            Self::Sigmoid => x.mapv(logistic),
        }
    }

    /// Derivative at the pre-activation values; ReLU takes 0 at the kink.
    fn derivative(&self, x: ArrayView2<f64>) -> Array2<f64> {
        match self {
            Self::Relu => x.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Self::Sigmoid => x.mapv(|v| {
                let s = logistic(v);
                s * (1.0 - s)
            }),
        }
    }
}

impl FromStr for ActivationFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("relu") {
            Ok(Self::Relu)
        } else if s.eq_ignore_ascii_case("sigmoid") {
            Ok(Self::Sigmoid)
        } else {
            Err(Error::UnsupportedActivation(s.to_string()))
        }
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use crate::assert_rel_eq_arr2;

    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn relu_clamps_negatives() {
        let x = arr2(&[[-3.5, -0.0, 0.0], [0.25, 7.0, -1e-9]]);
        let relu = ActivationFunction::Relu;
        assert_rel_eq_arr2!(
            relu.compute(x.view()),
            arr2(&[[0.0, 0.0, 0.0], [0.25, 7.0, 0.0]])
        );
        assert_rel_eq_arr2!(
            relu.derivative(x.view()),
            arr2(&[[0.0, 0.0, 0.0], [1.0, 1.0, 0.0]])
        );
    }

    #[test]
    fn sigmoid_is_symmetric_around_half() {
        let x = arr2(&[[-4.0, -0.5, 0.0, 0.5, 4.0]]);
        let sigmoid = ActivationFunction::Sigmoid;
        let y = sigmoid.compute(x.view());
        assert_relative_eq!(0.5, y[[0, 2]]);
        assert_relative_eq!(1.0, y[[0, 1]] + y[[0, 3]], epsilon = 1e-12);
        assert_relative_eq!(1.0, y[[0, 0]] + y[[0, 4]], epsilon = 1e-12);
        assert_relative_eq!(0.6224593312018546, y[[0, 3]], epsilon = 1e-12);
        assert!(y.iter().all(|&v| v > 0.0 && v < 1.0));
    }

    #[test]
    fn sigmoid_derivative_peaks_at_zero() {
        let x = arr2(&[[-2.0, 0.0, 2.0]]);
        let d = ActivationFunction::Sigmoid.derivative(x.view());
        assert_relative_eq!(0.25, d[[0, 1]]);
        assert_relative_eq!(d[[0, 0]], d[[0, 2]], epsilon = 1e-12);
        assert_relative_eq!(0.10499358540350651, d[[0, 2]], epsilon = 1e-12);
    }

    #[test]
    fn parse_function_tags() {
        assert_eq!(ActivationFunction::Relu, "relu".parse().unwrap());
        assert_eq!(ActivationFunction::Relu, "ReLU".parse().unwrap());
        assert_eq!(ActivationFunction::Sigmoid, "SIGMOID".parse().unwrap());
        assert!(matches!(
            "tanh".parse::<ActivationFunction>(),
            Err(Error::UnsupportedActivation(_))
        ));
        assert!(" relu".parse::<ActivationFunction>().is_err());
        assert_eq!("sigmoid", ActivationFunction::Sigmoid.to_string());
    }
}
