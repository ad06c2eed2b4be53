mod sgd;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::Result, layer::Layer, layer::Parameter};

pub use sgd::SgdOptimizer;

/// Trait to abstract optimizers.
///
/// An optimizer only sees a layer through [`Layer::parameters`], so layers without
/// trainable tensors are left alone.
pub trait Optimizer: fmt::Debug {
    /// Update one parameter in place from its gradient.
    fn update(&self, parameter: Parameter<'_>) -> Result<()>;

    fn update_parameters(&self, layer: &mut dyn Layer) -> Result<()> {
        let parameters = layer.parameters()?;
        // Check every pair first so a bad gradient cannot leave the layer half updated.
        for parameter in &parameters {
            parameter
                .value
                .ensure_same_shape("optimizer update", parameter.gradient)?;
        }
        for parameter in parameters {
            self.update(parameter)?;
        }
        Ok(())
    }

    fn to_record(&self) -> OptimizerRecord;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OptimizerRecord {
    #[serde(rename = "SgdOptimizer")]
    Sgd {
        #[serde(rename = "learningRate")]
        learning_rate: f64,
    },
}

impl OptimizerRecord {
    pub fn into_optimizer(self) -> Result<Box<dyn Optimizer>> {
        match self {
            OptimizerRecord::Sgd { learning_rate } => {
                Ok(Box::new(SgdOptimizer::new(learning_rate)?))
            }
        }
    }
}
