use ndarray::{Array, Axis};
use ndarray_rand::rand::{thread_rng, Rng};
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;

use crate::{
    error::{Error, Result},
    layer::{Layer, LayerRecord, Parameter},
    optimizer::Optimizer,
    tensor::Tensor,
};

/// Fully connected layer computing `input · weights + biases`.
///
/// `weights` has shape `(input_size, output_size)` and `biases` `(1, output_size)`;
/// the bias row is broadcast over every row of the batch.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    weights: Tensor,
    biases: Tensor,
    weight_gradients: Option<Tensor>,
    bias_gradients: Option<Tensor>,
    input_cache: Option<Tensor>,
}

impl DenseLayer {
    /// Create a layer whose weights and biases are drawn from `N(0, 1/sqrt(input_size))`.
    pub fn new(input_size: usize, output_size: usize) -> Result<Self> {
        Self::with_rng(input_size, output_size, &mut thread_rng())
    }

    pub fn with_rng<R>(input_size: usize, output_size: usize, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        if input_size == 0 || output_size == 0 {
            return Err(Error::invalid(format!(
                "dense layer sizes must be positive, got {}x{}",
                input_size, output_size
            )));
        }

        let std_dev = 1.0 / (input_size as f64).sqrt();
        let normal = Normal::new(0.0, std_dev).map_err(|e| Error::invalid(e.to_string()))?;
        let weights = Array::random_using((input_size, output_size), normal, rng);
        let biases = Array::random_using((1, output_size), normal, rng);
        Self::with_parameters(Tensor::from_array(weights)?, Tensor::from_array(biases)?)
    }

    /// Create a layer from existing parameters, e.g. when restoring a saved network.
    pub fn with_parameters(weights: Tensor, biases: Tensor) -> Result<Self> {
        if biases.rows() != 1 || biases.cols() != weights.cols() {
            return Err(Error::ShapeMismatch {
                op: "dense biases",
                expected: (1, weights.cols()),
                found: biases.shape(),
            });
        }
        Ok(Self {
            weights,
            biases,
            weight_gradients: None,
            bias_gradients: None,
            input_cache: None,
        })
    }

    pub fn input_size(&self) -> usize {
        self.weights.rows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.cols()
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub fn biases(&self) -> &Tensor {
        &self.biases
    }

    pub fn weight_gradients(&self) -> Option<&Tensor> {
        self.weight_gradients.as_ref()
    }

    pub fn bias_gradients(&self) -> Option<&Tensor> {
        self.bias_gradients.as_ref()
    }

    /// Replace the weights. The new tensor must have the same shape as the old one.
    pub fn set_weights(&mut self, weights: Tensor) -> Result<()> {
        self.weights.ensure_same_shape("set_weights", &weights)?;
        self.weights = weights;
        Ok(())
    }

    /// Replace the biases. The new tensor must have the same shape as the old one.
    pub fn set_biases(&mut self, biases: Tensor) -> Result<()> {
        self.biases.ensure_same_shape("set_biases", &biases)?;
        self.biases = biases;
        Ok(())
    }
}

impl Layer for DenseLayer {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        if input.cols() != self.input_size() {
            return Err(Error::ShapeMismatch {
                op: "dense forward",
                expected: (input.rows(), self.input_size()),
                found: input.shape(),
            });
        }

        let mut outputs = input.view().dot(&self.weights.view());
        outputs += &self.biases.view();
        self.input_cache = Some(input.clone());
        Tensor::from_array(outputs)
    }

    fn backward(&mut self, gradient: &Tensor) -> Result<Tensor> {
        let inputs = self
            .input_cache
            .as_ref()
            .ok_or(Error::MissingCache("dense backward called before forward"))?;
        let expected = (inputs.rows(), self.output_size());
        if gradient.shape() != expected {
            return Err(Error::ShapeMismatch {
                op: "dense backward",
                expected,
                found: gradient.shape(),
            });
        }

        let gradient = gradient.view();
        let bias_gradients = gradient.sum_axis(Axis(0)).insert_axis(Axis(0));
        let weight_gradients = inputs.view().t().dot(&gradient);
        let inputs_derivative = gradient.dot(&self.weights.view().t());

        self.bias_gradients = Some(Tensor::from_array(bias_gradients)?);
        self.weight_gradients = Some(Tensor::from_array(weight_gradients)?);
        self.input_cache = None;
        Tensor::from_array(inputs_derivative)
    }

    fn update_parameters(&mut self, optimizer: &dyn Optimizer) -> Result<()> {
        optimizer.update_parameters(self)
    }

    fn parameters(&mut self) -> Result<Vec<Parameter<'_>>> {
        match (&self.weight_gradients, &self.bias_gradients) {
            (Some(weight_gradients), Some(bias_gradients)) => Ok(vec![
                Parameter {
                    value: &mut self.weights,
                    gradient: weight_gradients,
                },
                Parameter {
                    value: &mut self.biases,
                    gradient: bias_gradients,
                },
            ]),
            _ => Err(Error::MissingCache(
                "dense parameters updated before backward",
            )),
        }
    }

    fn kind(&self) -> &'static str {
        "DenseLayer"
    }

    fn describe(&self) -> String {
        format!(
            "DenseLayer(input: {}, output: {})",
            self.input_size(),
            self.output_size()
        )
    }

    fn to_record(&self) -> LayerRecord {
        LayerRecord::Dense {
            weights: self.weights.clone(),
            biases: self.biases.clone(),
        }
    }
}
