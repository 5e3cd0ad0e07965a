use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::math::Array2;
use crate::models::gbdt::GBDTClassifier;
use crate::models::label_for;
use crate::models::random_forest::RandomForestClassifier;

/// Contract shared by every binary classifier in the crate. Labels are 0/1.
pub trait ClassifierModel: Send + Sync {
    /// Fit the model on scaled features `x` and labels `y`.
    fn fit(&mut self, x: &Array2<f32>, y: &[u8]) -> Result<()>;

    /// Probability of label 1 for each row.
    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>>;

    /// Hard labels, consistent with `predict_proba` through
    /// [`DECISION_THRESHOLD`](crate::models::DECISION_THRESHOLD).
    fn predict(&self, x: &Array2<f32>) -> Result<Vec<u8>> {
        Ok(self.predict_proba(x)?.into_iter().map(label_for).collect())
    }

    fn is_fitted(&self) -> bool;

    /// Serializable snapshot of the fitted model.
    fn state(&self) -> Result<ModelState>;

    fn name(&self) -> &str {
        "classifier"
    }
}

/// Persisted classifier state.
#[derive(Serialize, Deserialize)]
pub enum ModelState {
    RandomForest(RandomForestClassifier),
    GBDT(GBDTClassifier),
}

impl ModelState {
    pub fn into_model(self) -> Box<dyn ClassifierModel> {
        match self {
            ModelState::RandomForest(model) => Box::new(model),
            ModelState::GBDT(model) => Box::new(model),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelState::RandomForest(_) => "random_forest",
            ModelState::GBDT(_) => "gbdt",
        }
    }
}

/// Shared input checks for `fit`.
pub(crate) fn validate_training_data(x: &Array2<f32>, y: &[u8]) -> Result<()> {
    if x.is_empty() {
        return Err(PipelineError::EmptyDataset.into());
    }
    if x.nrows() != y.len() {
        return Err(PipelineError::ShapeMismatch {
            expected: x.nrows(),
            found: y.len(),
        }
        .into());
    }
    if let Some(bad) = y.iter().find(|&&label| label > 1) {
        anyhow::bail!("Labels must be 0 or 1, found {}", bad);
    }
    let positives = y.iter().filter(|&&label| label == 1).count();
    if positives == 0 {
        return Err(PipelineError::SingleClass(0).into());
    }
    if positives == y.len() {
        return Err(PipelineError::SingleClass(1).into());
    }
    Ok(())
}
