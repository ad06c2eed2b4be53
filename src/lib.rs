//! A small feed-forward neural network library: tensors, dense and activation
//! layers, mean squared error and stochastic gradient descent.

pub mod activation;
pub mod config;
pub mod error;
pub mod event;
pub mod layer;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod persistence;
pub mod tensor;

pub use config::TrainingConfig;
pub use error::{Error, Result};
pub use layer::{ActivationLayer, DenseLayer, Layer};
pub use network::{NeuralNetwork, TrainingListener};
pub use optimizer::{Optimizer, SgdOptimizer};
pub use tensor::Tensor;

/// Compare two 2D arrays element-wise, tolerating rounding error.
#[macro_export]
macro_rules! assert_rel_eq_arr2 {
    ($actual:expr, $expected:expr) => {
        assert_eq!($actual.shape(), $expected.shape());
        ndarray::Zip::from(&$actual)
            .and(&$expected)
            .for_each(|v, w| {
                assert_relative_eq!(v, w, epsilon = 1e-12, max_relative = 1e-10);
            });
    };
}
