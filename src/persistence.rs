//! Saving and loading networks, tensors and optimizers as JSON files, and
//! reading training pairs from CSV.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use csv::Reader;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    layer::LayerRecord,
    network::NeuralNetwork,
    optimizer::{Optimizer, OptimizerRecord},
    tensor::Tensor,
};

fn write_json<T>(path: impl AsRef<Path>, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    debug!(path = %path.display(), "wrote JSON");
    Ok(())
}

fn read_json<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let value = serde_json::from_reader(reader)?;
    debug!(path = %path.display(), "read JSON");
    Ok(value)
}

/// JSON has no encoding for NaN or infinity, so those are refused before the
/// file is created.
fn ensure_finite<'a>(tensors: impl IntoIterator<Item = &'a Tensor>) -> Result<()> {
    tensors.into_iter().try_for_each(Tensor::ensure_finite)
}

/// Save the layer records of `network`. Fails without touching `path` if any
/// parameter is NaN or infinite.
pub fn write_network(path: impl AsRef<Path>, network: &NeuralNetwork) -> Result<()> {
    let record = network.to_record();
    ensure_finite(record.layers.iter().flat_map(|layer| match layer {
        LayerRecord::Dense { weights, biases } => vec![weights, biases],
        LayerRecord::Activation { .. } => vec![],
    }))?;
    write_json(path, &record)
}

pub fn read_network(path: impl AsRef<Path>) -> Result<NeuralNetwork> {
    NeuralNetwork::from_record(read_json(path)?)
}

/// Save named tensors as a JSON object of tensor records.
pub fn write_tensors(path: impl AsRef<Path>, tensors: &BTreeMap<String, Tensor>) -> Result<()> {
    ensure_finite(tensors.values())?;
    write_json(path, tensors)
}

pub fn read_tensors(path: impl AsRef<Path>) -> Result<BTreeMap<String, Tensor>> {
    read_json(path)
}

pub fn write_optimizer(path: impl AsRef<Path>, optimizer: &dyn Optimizer) -> Result<()> {
    write_json(path, &optimizer.to_record())
}

pub fn read_optimizer(path: impl AsRef<Path>) -> Result<Box<dyn Optimizer>> {
    read_json::<OptimizerRecord>(path)?.into_optimizer()
}

/// Read a CSV file with a header row into `(inputs, targets)`.
/// The first `n_inputs` columns of each row form a `1 x n_inputs` input tensor and
/// the remaining columns the target tensor.
pub fn read_csv_dataset(
    path: impl AsRef<Path>,
    n_inputs: usize,
) -> Result<(Vec<Tensor>, Vec<Tensor>)> {
    if n_inputs == 0 {
        return Err(Error::invalid("a dataset needs at least one input column"));
    }

    let mut reader = Reader::from_path(path)?;
    let mut inputs = Vec::new();
    let mut targets = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let values = row
            .iter()
            .map(|field| {
                field.trim().parse::<f64>().map_err(|_| {
                    Error::Parse(format!("{:?} on data row {} as a number", field, line + 1))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if values.len() <= n_inputs {
            return Err(Error::Parse(format!(
                "data row {}: expected more than {} columns, found {}",
                line + 1,
                n_inputs,
                values.len()
            )));
        }

        let (input, target) = values.split_at(n_inputs);
        inputs.push(Tensor::new(vec![input.to_vec()])?);
        targets.push(Tensor::new(vec![target.to_vec()])?);
    }
    debug!(rows = inputs.len(), "read CSV dataset");
    Ok((inputs, targets))
}
