use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::TrainingConfig,
    error::{Error, Result},
    event::{Event, EventSink},
    layer::{Layer, LayerRecord},
    loss::{LossCriterion, MeanSquaredError},
    metrics,
    optimizer::Optimizer,
    tensor::Tensor,
};

/// Receives the average loss after every completed epoch of [`NeuralNetwork::train`].
pub trait TrainingListener: Send {
    /// `epoch` counts from 1 up to `total_epochs`.
    fn on_epoch_end(&mut self, epoch: usize, total_epochs: usize, loss: f64);
}

impl<F> TrainingListener for F
where
    F: FnMut(usize, usize, f64) + Send,
{
    fn on_epoch_end(&mut self, epoch: usize, total_epochs: usize, loss: f64) {
        self(epoch, total_epochs, loss)
    }
}

/// Average loss and accuracy of a network over a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss: f64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub layers: Vec<LayerRecord>,
}

/// Ordered stack of layers trained with mean squared error.
///
/// Layers run front to back in `predict` and back to front when propagating
/// gradients. A network is driven by one caller at a time; `train` runs to
/// completion once started.
#[derive(Default)]
pub struct NeuralNetwork {
    layers: Vec<Box<dyn Layer>>,
    listener: Option<Box<dyn TrainingListener>>,
    event_sink: Option<Box<dyn EventSink>>,
}

impl NeuralNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[Box<dyn Layer>] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn add_layer<L>(&mut self, layer: L)
    where
        L: Layer + 'static,
    {
        self.push_layer(Box::new(layer));
    }

    pub fn push_layer(&mut self, layer: Box<dyn Layer>) {
        debug!(layer = %layer.describe(), index = self.layers.len(), "add layer");
        self.log(format!("Added {} to the network", layer.describe()));
        self.layers.push(layer);
    }

    /// Replace the layer at `index`, returning the old one.
    pub fn update_layer_at<L>(&mut self, index: usize, layer: L) -> Result<Box<dyn Layer>>
    where
        L: Layer + 'static,
    {
        self.check_index(index)?;
        debug!(layer = %layer.describe(), index, "replace layer");
        self.log(format!(
            "Replaced layer {} with {}",
            index,
            layer.describe()
        ));
        Ok(std::mem::replace(&mut self.layers[index], Box::new(layer)))
    }

    pub fn remove_layer_at(&mut self, index: usize) -> Result<Box<dyn Layer>> {
        self.check_index(index)?;
        let layer = self.layers.remove(index);
        debug!(layer = %layer.describe(), index, "remove layer");
        self.log(format!("Removed {} from the network", layer.describe()));
        Ok(layer)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.layers.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.layers.len(),
            });
        }
        Ok(())
    }

    pub fn set_training_listener<T>(&mut self, listener: T)
    where
        T: TrainingListener + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_training_listener(&mut self) {
        self.listener = None;
    }

    pub fn set_event_sink<S>(&mut self, sink: S)
    where
        S: EventSink + 'static,
    {
        self.event_sink = Some(Box::new(sink));
    }

    fn log(&mut self, description: String) {
        if let Some(sink) = self.event_sink.as_mut() {
            sink.log_event(Event::new(description));
        }
    }

    /// Run `input` through every layer and return the final output.
    pub fn predict(&mut self, input: &Tensor) -> Result<Tensor> {
        self.forward(input)
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor> {
        let mut output = input.clone();
        for layer in self.layers.iter_mut() {
            output = layer.forward(&output)?;
        }
        Ok(output)
    }

    fn backward(&mut self, gradient: Tensor) -> Result<Tensor> {
        let mut gradient = gradient;
        for layer in self.layers.iter_mut().rev() {
            gradient = layer.backward(&gradient)?;
        }
        Ok(gradient)
    }

    fn update_parameters(&mut self, optimizer: &dyn Optimizer) -> Result<()> {
        for layer in self.layers.iter_mut() {
            layer.update_parameters(optimizer)?;
        }
        Ok(())
    }

    /// Train on `(inputs[i], targets[i])` pairs, one optimizer step per pair, for
    /// exactly `epochs` passes. Returns the average loss of every epoch.
    ///
    /// Fails with [`Error::InvalidArgument`] before touching any parameter if
    /// `inputs` and `targets` differ in length, if they are empty (an epoch
    /// average would be undefined), or if `epochs` is zero.
    ///
    /// Training is not transactional: if a pair fails midway, updates from the
    /// earlier pairs stay applied.
    pub fn train(
        &mut self,
        inputs: &[Tensor],
        targets: &[Tensor],
        epochs: usize,
        optimizer: &dyn Optimizer,
    ) -> Result<Vec<f64>> {
        if inputs.len() != targets.len() {
            return Err(Error::invalid(format!(
                "{} inputs but {} targets",
                inputs.len(),
                targets.len()
            )));
        }
        if inputs.is_empty() {
            return Err(Error::invalid("training data must not be empty"));
        }
        if epochs == 0 {
            return Err(Error::invalid("epochs must be positive"));
        }

        info!(epochs, examples = inputs.len(), "start training");
        self.log(format!(
            "Started training for {} epochs on {} examples",
            epochs,
            inputs.len()
        ));

        let mut history = Vec::with_capacity(epochs);
        for epoch in 1..=epochs {
            let mut total_loss = 0.0;
            for (input, target) in inputs.iter().zip(targets) {
                let output = self.forward(input)?;
                let loss = MeanSquaredError::compute(&output, target)?;
                total_loss += loss.value();

                self.backward(loss.grad())?;
                self.update_parameters(optimizer)?;
            }

            let average_loss = total_loss / inputs.len() as f64;
            debug!(epoch, loss = average_loss, "epoch finished");
            if let Some(listener) = self.listener.as_mut() {
                listener.on_epoch_end(epoch, epochs, average_loss);
            }
            history.push(average_loss);
        }

        let final_loss = history.last().copied().unwrap_or_default();
        info!(loss = final_loss, "finish training");
        self.log(format!("Finished training with loss {}", final_loss));
        Ok(history)
    }

    /// Validate `config` and train with an SGD optimizer built from it.
    pub fn fit(
        &mut self,
        inputs: &[Tensor],
        targets: &[Tensor],
        config: &TrainingConfig,
    ) -> Result<Vec<f64>> {
        config.validate()?;
        let optimizer = config.optimizer()?;
        self.train(inputs, targets, config.epochs, &optimizer)
    }

    /// Average loss and accuracy over the pairs, without updating any parameter.
    pub fn evaluate(&mut self, inputs: &[Tensor], targets: &[Tensor]) -> Result<Evaluation> {
        if inputs.len() != targets.len() {
            return Err(Error::invalid(format!(
                "{} inputs but {} targets",
                inputs.len(),
                targets.len()
            )));
        }
        if inputs.is_empty() {
            return Err(Error::invalid("evaluation data must not be empty"));
        }

        let mut loss = 0.0;
        let mut accuracy = 0.0;
        for (input, target) in inputs.iter().zip(targets) {
            let output = self.predict(input)?;
            loss += metrics::loss(&output, target)?;
            accuracy += metrics::accuracy(&output, target)?;
        }
        let n = inputs.len() as f64;
        Ok(Evaluation {
            loss: loss / n,
            accuracy: accuracy / n,
        })
    }

    /// Human-readable listing of the layers in execution order.
    pub fn architecture(&self) -> String {
        if self.layers.is_empty() {
            return "Empty network".to_string();
        }
        self.layers
            .iter()
            .enumerate()
            .map(|(i, layer)| format!("Layer {}: {}\n", i + 1, layer.describe()))
            .collect()
    }

    pub fn to_record(&self) -> NetworkRecord {
        NetworkRecord {
            layers: self.layers.iter().map(|layer| layer.to_record()).collect(),
        }
    }

    pub fn from_record(record: NetworkRecord) -> Result<Self> {
        let layers = record
            .layers
            .into_iter()
            .map(LayerRecord::into_layer)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            layers,
            ..Self::default()
        })
    }
}

impl fmt::Debug for NeuralNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NeuralNetwork")
            .field("layers", &self.layers)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl Serialize for NeuralNetwork {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_record().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NeuralNetwork {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let record = NetworkRecord::deserialize(deserializer)?;
        Self::from_record(record).map_err(serde::de::Error::custom)
    }
}
