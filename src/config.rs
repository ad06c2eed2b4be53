use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    optimizer::SgdOptimizer,
};

/// Hyperparameters of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            learning_rate: 0.01,
        }
    }
}

impl TrainingConfig {
    pub fn new(epochs: usize, learning_rate: f64) -> Result<Self> {
        let config = Self {
            epochs,
            learning_rate,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::invalid("epochs must be positive"));
        }
        SgdOptimizer::new(self.learning_rate).map(|_| ())
    }

    pub fn optimizer(&self) -> Result<SgdOptimizer> {
        SgdOptimizer::new(self.learning_rate)
    }
}
