use ndarray::{Array2, ArrayView2, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Rectangular grid of `f64` values, the unit of data every layer consumes and produces.
///
/// A tensor always has at least one row and one column. It owns its buffer, so
/// cloning copies the data and two tensors never share storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TensorRecord", into = "TensorRecord")]
pub struct Tensor {
    data: Array2<f64>,
}

/// Serialized form of a tensor: `{"data": [[...], ...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorRecord {
    pub data: Vec<Vec<f64>>,
}

impl Tensor {
    /// Build a tensor from rows of values.
    /// Fails if there are no rows, the first row is empty, or any row differs in length.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);
        if n_rows == 0 || n_cols == 0 {
            return Err(Error::invalid("tensor data must not be empty"));
        }
        if let Some(row) = rows.iter().position(|row| row.len() != n_cols) {
            return Err(Error::invalid(format!(
                "row {} has {} columns, expected {}",
                row,
                rows[row].len(),
                n_cols
            )));
        }

        let flat = rows.into_iter().flatten().collect();
        let data = Array2::from_shape_vec((n_rows, n_cols), flat)
            .map_err(|e| Error::invalid(e.to_string()))?;
        Ok(Self { data })
    }

    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(Error::invalid("tensor data must not be empty"));
        }
        Ok(Self { data })
    }

    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Self::from_array(Array2::zeros((rows, cols)))
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    // Always false for a constructed tensor.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get((row, col)).copied()
    }

    /// Copy of the values, row by row.
    pub fn data(&self) -> Vec<Vec<f64>> {
        self.data.rows().into_iter().map(|row| row.to_vec()).collect()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn into_array(self) -> Array2<f64> {
        self.data
    }

    /// Apply `f` to every element, returning a new tensor of the same shape.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            data: self.data.mapv(f),
        }
    }

    /// Element-wise `self += other`.
    pub fn add(&mut self, other: &Tensor) -> Result<()> {
        self.ensure_same_shape("add", other)?;
        Zip::from(&mut self.data)
            .and(&other.data)
            .for_each(|v, &w| *v += w);
        Ok(())
    }

    /// Element-wise (Hadamard) `self *= other`.
    pub fn multiply(&mut self, other: &Tensor) -> Result<()> {
        self.ensure_same_shape("multiply", other)?;
        Zip::from(&mut self.data)
            .and(&other.data)
            .for_each(|v, &w| *v *= w);
        Ok(())
    }

    /// In-place `self -= scale * other`, the building block of gradient descent.
    pub fn scaled_sub(&mut self, scale: f64, other: &Tensor) -> Result<()> {
        self.ensure_same_shape("scaled_sub", other)?;
        self.data.scaled_add(-scale, &other.data);
        Ok(())
    }

    /// Fails on the first NaN or infinite element.
    pub fn ensure_finite(&self) -> Result<()> {
        match self.data.iter().find(|v| !v.is_finite()) {
            Some(v) => Err(Error::invalid(format!(
                "tensor of shape {:?} holds non-finite value {}",
                self.shape(),
                v
            ))),
            None => Ok(()),
        }
    }

    pub(crate) fn ensure_same_shape(&self, op: &'static str, other: &Tensor) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::ShapeMismatch {
                op,
                expected: self.shape(),
                found: other.shape(),
            });
        }
        Ok(())
    }

    pub fn to_record(&self) -> TensorRecord {
        TensorRecord { data: self.data() }
    }

    pub fn from_record(record: TensorRecord) -> Result<Self> {
        Self::new(record.data)
    }
}

impl TryFrom<TensorRecord> for Tensor {
    type Error = Error;

    fn try_from(record: TensorRecord) -> Result<Self> {
        Tensor::from_record(record)
    }
}

impl From<Tensor> for TensorRecord {
    fn from(tensor: Tensor) -> Self {
        tensor.to_record()
    }
}
