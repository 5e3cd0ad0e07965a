//! Labelled feature matrices and the stratified train/test split.
use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::PipelineError;
use crate::io::Table;
use crate::math::{Array1, Array2};

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub x: Array2<f32>,
    pub y: Array1<u8>,
    /// Column names of `x`, in order.
    pub features: Vec<String>,
}

impl Dataset {
    pub fn new(x: Array2<f32>, y: Array1<u8>, features: Vec<String>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: x.nrows(),
                found: y.len(),
            }
            .into());
        }
        if x.ncols() != features.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: features.len(),
                found: x.ncols(),
            }
            .into());
        }
        Ok(Dataset { x, y, features })
    }

    /// Extract `features` and the `target` column from a cleaned table.
    ///
    /// Feature cells that are still missing (a column with no values at all)
    /// become `NaN`. Target values are thresholded at 0.5 into 0/1.
    pub fn from_table(table: &Table, features: &[String], target: &str) -> Result<Self> {
        if table.nrows() == 0 {
            return Err(PipelineError::EmptyDataset.into());
        }

        let mut columns = Vec::with_capacity(features.len());
        for name in features {
            let column = table
                .numeric_column(name)
                .ok_or_else(|| PipelineError::NonNumericColumn(name.clone()))?;
            columns.push(column);
        }

        let target_values = table
            .numeric_column(target)
            .ok_or_else(|| PipelineError::NonNumericColumn(target.to_string()))?;
        let missing = target_values.iter().filter(|v| v.is_none()).count();
        if missing > 0 {
            return Err(PipelineError::MissingTargetValues {
                column: target.to_string(),
                count: missing,
            }
            .into());
        }

        let nrows = table.nrows();
        let mut data = Vec::with_capacity(nrows * features.len());
        for row in 0..nrows {
            data.extend(columns.iter().map(|col| col[row].unwrap_or(f32::NAN)));
        }
        let x = Array2::from_shape_vec((nrows, features.len()), data)?;
        let y = target_values
            .iter()
            .map(|v| u8::from(v.unwrap_or(0.0) >= 0.5))
            .collect();

        Dataset::new(x, y, features.to_vec())
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Number of rows labelled 0 and 1.
    pub fn class_counts(&self) -> [usize; 2] {
        let positives = self.y.iter().filter(|&&v| v == 1).count();
        [self.len() - positives, positives]
    }

    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            x: self.x.select_rows(indices),
            y: self.y.select(indices),
            features: self.features.clone(),
        }
    }

    pub fn log_input_data_summary(&self) {
        let [negatives, positives] = self.class_counts();
        log::info!("----- Input Data Summary -----");
        log::info!("{} rows: {} positive, {} negative", self.len(), positives, negatives);
        log::info!("{} features: {}", self.features.len(), self.features.join(", "));
        log::info!("------------------------------");
    }
}

/// Train and held-out partitions.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}

/// Stratified split of row indices.
///
/// For each class the rows are shuffled with a `StdRng` seeded from `seed`
/// and `round(n_class * test_fraction)` of them go to the test set, keeping
/// at least one row of every class with two or more rows in train. Both
/// index lists are returned sorted.
pub fn stratified_split_indices(
    y: &[u8],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        anyhow::bail!("test_fraction must be in (0, 1), got {}", test_fraction);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(y.len());
    let mut test = Vec::new();

    for class in [0u8, 1u8] {
        let mut members: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
        members.shuffle(&mut rng);
        let n = members.len();
        let mut n_test = (n as f64 * test_fraction).round() as usize;
        if n >= 2 {
            n_test = n_test.min(n - 1);
        }
        log::debug!("Class {}: {} rows, {} held out", class, n, n_test);
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}

pub fn train_test_split(dataset: &Dataset, test_fraction: f64, seed: u64) -> Result<Split> {
    let (train_idx, test_idx) =
        stratified_split_indices(dataset.y.as_slice(), test_fraction, seed)?;
    Ok(Split {
        train: dataset.select(&train_idx),
        test: dataset.select(&test_idx),
    })
}
