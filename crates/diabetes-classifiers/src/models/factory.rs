use crate::config::{ModelConfig, ModelType};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::gbdt::GBDTClassifier;
use crate::models::random_forest::RandomForestClassifier;

/// Build an unfitted classifier from a `ModelConfig`.
///
/// `seed` drives every stochastic step of the model so repeated training on
/// identical data is reproducible.
pub fn build_model(params: &ModelConfig, seed: u64) -> Box<dyn ClassifierModel> {
    match &params.model_type {
        ModelType::RandomForest {
            n_estimators,
            max_depth,
            min_samples_split,
            min_samples_leaf,
        } => Box::new(
            RandomForestClassifier::new(*n_estimators, seed)
                .with_max_depth(*max_depth)
                .with_min_samples_split(*min_samples_split)
                .with_min_samples_leaf(*min_samples_leaf),
        ),
        ModelType::GBDT { .. } => Box::new(GBDTClassifier::new(params.model_type.clone(), seed)),
    }
}
