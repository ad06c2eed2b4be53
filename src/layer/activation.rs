use crate::{
    activation::{Activation, ActivationFunction},
    error::{Error, Result},
    layer::{Layer, LayerRecord},
    optimizer::Optimizer,
    tensor::Tensor,
};

/// Applies a nonlinearity element-wise. Has no trainable parameters.
#[derive(Debug, Clone)]
pub struct ActivationLayer {
    function: ActivationFunction,
    input_cache: Option<Tensor>,
}

impl ActivationLayer {
    /// `function` is `"relu"` or `"sigmoid"`, in any case.
    pub fn new(function: &str) -> Result<Self> {
        Ok(Self::with_function(function.parse()?))
    }

    pub fn with_function(function: ActivationFunction) -> Self {
        Self {
            function,
            input_cache: None,
        }
    }

    pub fn activation_function(&self) -> ActivationFunction {
        self.function
    }
}

impl Layer for ActivationLayer {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        let outputs = self.function.compute(input.view());
        self.input_cache = Some(input.clone());
        Tensor::from_array(outputs)
    }

    fn backward(&mut self, gradient: &Tensor) -> Result<Tensor> {
        let inputs = self
            .input_cache
            .as_ref()
            .ok_or(Error::MissingCache("activation backward called before forward"))?;
        let mut derivative = Tensor::from_array(self.function.derivative(inputs.view()))?;
        derivative.ensure_same_shape("activation backward", gradient)?;

        derivative.multiply(gradient)?;
        self.input_cache = None;
        Ok(derivative)
    }

    fn update_parameters(&mut self, _optimizer: &dyn Optimizer) -> Result<()> {
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "ActivationLayer"
    }

    fn describe(&self) -> String {
        format!("ActivationLayer({})", self.function)
    }

    fn to_record(&self) -> LayerRecord {
        LayerRecord::Activation {
            activation_function: self.function.name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{assert_rel_eq_arr2, optimizer::SgdOptimizer};

    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn reject_unknown_function() {
        assert!(matches!(
            ActivationLayer::new("tanh"),
            Err(Error::UnsupportedActivation(_))
        ));
        assert!(ActivationLayer::new("").is_err());
        assert_eq!(
            ActivationFunction::Relu,
            ActivationLayer::new("RELU").unwrap().activation_function()
        );
    }

    #[test]
    fn relu_forward_backward() {
        let mut layer = ActivationLayer::new("relu").unwrap();
        let input = Tensor::new(vec![vec![-1.0, 0.0, 1.0]]).unwrap();
        let output = layer.forward(&input).unwrap();
        assert_rel_eq_arr2!(output.view(), arr2(&[[0.0, 0.0, 1.0]]));
        // Input is not modified.
        assert_rel_eq_arr2!(input.view(), arr2(&[[-1.0, 0.0, 1.0]]));

        let gradient = Tensor::new(vec![vec![0.1, 0.2, 0.3]]).unwrap();
        let dz = layer.backward(&gradient).unwrap();
        assert_rel_eq_arr2!(dz.view(), arr2(&[[0.0, 0.0, 0.3]]));
    }

    #[test]
    fn sigmoid_of_zero_is_half() {
        let mut layer = ActivationLayer::new("sigmoid").unwrap();
        let output = layer.forward(&Tensor::new(vec![vec![0.0]]).unwrap()).unwrap();
        assert_eq!(Some(0.5), output.get(0, 0));

        let dz = layer
            .backward(&Tensor::new(vec![vec![2.0]]).unwrap())
            .unwrap();
        assert_relative_eq!(0.5, dz.get(0, 0).unwrap());
    }

    #[test]
    fn backward_requires_forward() {
        let mut layer = ActivationLayer::new("sigmoid").unwrap();
        let gradient = Tensor::new(vec![vec![1.0]]).unwrap();
        assert!(matches!(
            layer.backward(&gradient),
            Err(Error::MissingCache(_))
        ));
    }

    #[test]
    fn backward_rejects_wrong_gradient_shape() {
        let mut layer = ActivationLayer::new("relu").unwrap();
        layer
            .forward(&Tensor::new(vec![vec![1.0, 2.0]]).unwrap())
            .unwrap();
        let gradient = Tensor::new(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        assert!(matches!(
            layer.backward(&gradient),
            Err(Error::ShapeMismatch { .. })
        ));
        // The cache survives a rejected gradient.
        let gradient = Tensor::new(vec![vec![1.0, 1.0]]).unwrap();
        assert!(layer.backward(&gradient).is_ok());
    }

    #[test]
    fn update_is_a_no_op() {
        let mut layer = ActivationLayer::new("relu").unwrap();
        let optimizer = SgdOptimizer::new(0.1).unwrap();
        layer.update_parameters(&optimizer).unwrap();
        assert!(layer.parameters().unwrap().is_empty());
    }
}
