use anyhow::Result;
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};

use crate::config::ModelType;
use crate::error::PipelineError;
use crate::math::Array2;
use crate::models::classifier_trait::{validate_training_data, ClassifierModel, ModelState};

/// Gradient Boosting Decision Tree (GBDT) classifier.
///
/// Trained with the `LogLikelyhood` loss, which expects labels in {-1, 1};
/// 0/1 labels are mapped on the way in. Data and feature sampling ratios are
/// pinned to 1.0 so boosting has no random component and `seed` is only
/// recorded alongside the model.
#[derive(Serialize, Deserialize)]
pub struct GBDTClassifier {
    model: Option<GBDT>,
    params: ModelType,
    seed: u64,
    n_features: usize,
}

impl GBDTClassifier {
    pub fn new(params: ModelType, seed: u64) -> Self {
        GBDTClassifier {
            model: None,
            params,
            seed,
            n_features: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn to_data_vec(x: &Array2<f32>) -> DataVec {
        x.rows()
            .map(|row| Data::new_test_data(row.to_vec(), None))
            .collect()
    }
}

impl ClassifierModel for GBDTClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[u8]) -> Result<()> {
        validate_training_data(x, y)?;

        let ModelType::GBDT {
            learning_rate,
            max_depth,
            num_boost_round,
            training_optimization_level,
        } = &self.params
        else {
            anyhow::bail!(
                "Expected ModelType::GBDT params, got {}",
                self.params.name()
            );
        };

        let mut config = Config::new();
        config.set_feature_size(x.ncols());
        config.set_shrinkage(*learning_rate);
        config.set_max_depth(*max_depth);
        config.set_iterations(*num_boost_round as usize);
        config.set_training_optimization_level(*training_optimization_level);
        config.set_data_sample_ratio(1.0);
        config.set_feature_sample_ratio(1.0);
        config.set_loss("LogLikelyhood");

        let mut train_x: DataVec = x
            .rows()
            .zip(y.iter())
            .map(|(row, &label)| {
                let label = if label == 1 { 1.0 } else { -1.0 };
                Data::new_training_data(row.to_vec(), 1.0, label, None)
            })
            .collect();

        log::debug!(
            "Fitting GBDT: {} rows, {} features, {} rounds",
            x.nrows(),
            x.ncols(),
            num_boost_round
        );
        let mut gbdt = GBDT::new(&config);
        gbdt.fit(&mut train_x);

        self.n_features = x.ncols();
        self.model = Some(gbdt);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>> {
        let model = self.model.as_ref().ok_or(PipelineError::ModelNotFitted)?;
        if x.ncols() != self.n_features {
            return Err(PipelineError::ShapeMismatch {
                expected: self.n_features,
                found: x.ncols(),
            }
            .into());
        }
        let predictions = model.predict(&Self::to_data_vec(x));
        Ok(predictions.into_iter().map(|p| p.clamp(0.0, 1.0)).collect())
    }

    fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    fn state(&self) -> Result<ModelState> {
        // GBDT has no Clone; round-trip through serde instead
        let value = serde_json::to_value(self)?;
        Ok(ModelState::GBDT(serde_json::from_value(value)?))
    }

    fn name(&self) -> &str {
        "gbdt"
    }
}
