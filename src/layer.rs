mod activation;
mod dense;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::Result, optimizer::Optimizer, tensor::Tensor};

pub use activation::ActivationLayer;
pub use dense::DenseLayer;

/// A stage of a feed-forward network.
///
/// `forward` caches what `backward` needs, so the two must be called in pairs:
/// calling `backward` without a preceding `forward` fails with
/// [`Error::MissingCache`](crate::Error::MissingCache) and leaves the layer unchanged.
pub trait Layer: fmt::Debug + Send {
    fn forward(&mut self, input: &Tensor) -> Result<Tensor>;

    /// Propagate `gradient` (dLoss/dOutput) and return dLoss/dInput.
    fn backward(&mut self, gradient: &Tensor) -> Result<Tensor>;

    fn update_parameters(&mut self, optimizer: &dyn Optimizer) -> Result<()>;

    /// Trainable tensors paired with the gradients from the latest `backward`.
    /// Layers without parameters return an empty list.
    fn parameters(&mut self) -> Result<Vec<Parameter<'_>>> {
        Ok(Vec::new())
    }

    /// Type tag used in records and architecture listings.
    fn kind(&self) -> &'static str;

    /// One-line summary of the layer's configuration.
    fn describe(&self) -> String;

    fn to_record(&self) -> LayerRecord;
}

/// Mutable access to one trainable tensor together with its gradient.
pub struct Parameter<'a> {
    pub value: &'a mut Tensor,
    pub gradient: &'a Tensor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayerRecord {
    #[serde(rename = "DenseLayer")]
    Dense { weights: Tensor, biases: Tensor },
    #[serde(rename = "ActivationLayer")]
    Activation {
        #[serde(rename = "activationFunction")]
        activation_function: String,
    },
}

impl LayerRecord {
    pub fn into_layer(self) -> Result<Box<dyn Layer>> {
        let layer: Box<dyn Layer> = match self {
            LayerRecord::Dense { weights, biases } => {
                Box::new(DenseLayer::with_parameters(weights, biases)?)
            }
            LayerRecord::Activation {
                activation_function,
            } => Box::new(ActivationLayer::new(&activation_function)?),
        };
        Ok(layer)
    }
}
