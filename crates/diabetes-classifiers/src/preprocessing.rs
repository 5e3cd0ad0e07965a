//! Standard scaling shared by training and inference.
//!
//! The `Scaler` is fitted once on the training partition and then only ever
//! used to transform. It carries the ordered feature names it was fitted on so
//! inference can rebuild rows in the same order.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::math::Array2;

/// Per-column mean and population standard deviation.
///
/// A column with zero variance keeps `std == 0.0` and transforms to
/// non-finite values, see [`Scaler::zero_variance_columns`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub features: Vec<String>,
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

impl Scaler {
    /// Fit on `x` where rows are samples and columns follow `features`.
    pub fn fit(x: &Array2<f32>, features: &[String]) -> Result<Scaler> {
        let (nrows, ncols) = x.shape();
        if nrows == 0 || ncols == 0 {
            return Err(PipelineError::EmptyDataset.into());
        }
        if features.len() != ncols {
            return Err(PipelineError::ShapeMismatch {
                expected: features.len(),
                found: ncols,
            }
            .into());
        }

        // accumulate in f64, the raw insulin/glucose ranges lose precision in f32
        let mut mean = vec![0.0f64; ncols];
        for row in x.rows() {
            for (c, v) in row.iter().enumerate() {
                mean[c] += *v as f64;
            }
        }
        let nrows_f = nrows as f64;
        for v in mean.iter_mut() {
            *v /= nrows_f;
        }

        let mut var = vec![0.0f64; ncols];
        for row in x.rows() {
            for (c, v) in row.iter().enumerate() {
                let d = *v as f64 - mean[c];
                var[c] += d * d;
            }
        }

        let scaler = Scaler {
            features: features.to_vec(),
            mean: mean.iter().map(|&m| m as f32).collect(),
            std: var.iter().map(|&v| (v / nrows_f).sqrt() as f32).collect(),
        };
        let non_finite =
            (0..ncols).find(|&c| !(scaler.mean[c].is_finite() && scaler.std[c].is_finite()));
        if let Some(c) = non_finite {
            return Err(PipelineError::NonFiniteColumn(features[c].clone()).into());
        }
        Ok(scaler)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Indices of columns whose training variance was zero.
    pub fn zero_variance_columns(&self) -> Vec<usize> {
        self.std
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    fn check_width(&self, found: usize) -> Result<()> {
        if found != self.n_features() {
            return Err(PipelineError::ShapeMismatch {
                expected: self.n_features(),
                found,
            }
            .into());
        }
        Ok(())
    }

    /// Apply `(x - mean) / std` column-wise. Never refits.
    pub fn transform(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        self.check_width(x.ncols())?;
        let (nrows, ncols) = x.shape();
        let mut out = Vec::with_capacity(nrows * ncols);
        for row in x.rows() {
            out.extend(self.scale(row));
        }
        Ok(Array2::from_shape_vec((nrows, ncols), out)?)
    }

    pub fn transform_row(&self, row: &[f32]) -> Result<Vec<f32>> {
        self.check_width(row.len())?;
        Ok(self.scale(row).collect())
    }

    pub fn inverse_transform(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        self.check_width(x.ncols())?;
        let mut out = Vec::with_capacity(x.nrows() * x.ncols());
        for row in x.rows() {
            out.extend(
                row.iter()
                    .enumerate()
                    .map(|(c, v)| v * self.std[c] + self.mean[c]),
            );
        }
        Ok(Array2::from_shape_vec(x.shape(), out)?)
    }

    fn scale<'a>(&'a self, row: &'a [f32]) -> impl Iterator<Item = f32> + 'a {
        row.iter()
            .enumerate()
            .map(move |(c, v)| (v - self.mean[c]) / self.std[c])
    }
}
