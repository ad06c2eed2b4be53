use crate::{
    error::{Error, Result},
    layer::Parameter,
    optimizer::{Optimizer, OptimizerRecord},
};

/// Plain stochastic gradient descent: `param -= learning_rate * gradient`.
#[derive(Debug, Clone, PartialEq)]
pub struct SgdOptimizer {
    learning_rate: f64,
}

impl SgdOptimizer {
    pub fn new(learning_rate: f64) -> Result<Self> {
        check_learning_rate(learning_rate)?;
        Ok(Self { learning_rate })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        check_learning_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }

    pub fn from_record(record: OptimizerRecord) -> Result<Self> {
        match record {
            OptimizerRecord::Sgd { learning_rate } => Self::new(learning_rate),
        }
    }
}

fn check_learning_rate(learning_rate: f64) -> Result<()> {
    // Also rejects NaN.
    if !(learning_rate > 0.0 && learning_rate.is_finite()) {
        return Err(Error::invalid(format!(
            "learning rate must be positive, got {}",
            learning_rate
        )));
    }
    Ok(())
}

impl Optimizer for SgdOptimizer {
    fn update(&self, parameter: Parameter<'_>) -> Result<()> {
        parameter
            .value
            .scaled_sub(self.learning_rate, parameter.gradient)
    }

    fn to_record(&self) -> OptimizerRecord {
        OptimizerRecord::Sgd {
            learning_rate: self.learning_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        assert_rel_eq_arr2,
        layer::{ActivationLayer, DenseLayer, Layer},
        tensor::Tensor,
    };

    use super::*;

    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn update_gradient_descent() {
        let mut w = Tensor::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let g = Tensor::new(vec![vec![1.0, -0.5], vec![0.2, -2.0]]).unwrap();

        let opt = SgdOptimizer::new(0.5).unwrap();
        opt.update(Parameter {
            value: &mut w,
            gradient: &g,
        })
        .unwrap();
        assert_rel_eq_arr2!(arr2(&[[0.5, 2.25], [2.9, 5.0]]), w.view());
    }

    #[test]
    fn reject_non_positive_learning_rate() {
        assert!(SgdOptimizer::new(0.0).is_err());
        assert!(SgdOptimizer::new(-0.1).is_err());
        assert!(SgdOptimizer::new(f64::NAN).is_err());

        let mut opt = SgdOptimizer::new(0.1).unwrap();
        assert!(opt.set_learning_rate(0.0).is_err());
        assert_relative_eq!(0.1, opt.learning_rate());
        opt.set_learning_rate(0.05).unwrap();
        assert_relative_eq!(0.05, opt.learning_rate());
    }

    #[test]
    fn skip_layers_without_parameters() {
        let mut layer = ActivationLayer::new("sigmoid").unwrap();
        let opt = SgdOptimizer::new(0.1).unwrap();
        opt.update_parameters(&mut layer).unwrap();
    }

    #[test]
    fn update_dense_layer() {
        let weights = Tensor::new(vec![vec![1.0], vec![-1.0]]).unwrap();
        let biases = Tensor::new(vec![vec![0.0]]).unwrap();
        let mut layer = DenseLayer::with_parameters(weights, biases).unwrap();
        layer
            .forward(&Tensor::new(vec![vec![2.0, 4.0]]).unwrap())
            .unwrap();
        layer
            .backward(&Tensor::new(vec![vec![1.0]]).unwrap())
            .unwrap();

        let opt = SgdOptimizer::new(0.1).unwrap();
        opt.update_parameters(&mut layer).unwrap();
        assert_rel_eq_arr2!(arr2(&[[0.8], [-1.4]]), layer.weights().view());
        assert_rel_eq_arr2!(arr2(&[[-0.1]]), layer.biases().view());
    }

    #[test]
    fn record_round_trip() {
        let opt = SgdOptimizer::new(0.25).unwrap();
        let json = serde_json::to_value(opt.to_record()).unwrap();
        assert_eq!(
            serde_json::json!({"type": "SgdOptimizer", "learningRate": 0.25}),
            json
        );

        let record: OptimizerRecord = serde_json::from_value(json).unwrap();
        assert_eq!(opt, SgdOptimizer::from_record(record.clone()).unwrap());
        assert_eq!(opt.to_record(), record.into_optimizer().unwrap().to_record());
    }

    #[test]
    fn reject_record_with_bad_rate() {
        let record = OptimizerRecord::Sgd {
            learning_rate: -1.0,
        };
        assert!(record.into_optimizer().is_err());
    }
}
