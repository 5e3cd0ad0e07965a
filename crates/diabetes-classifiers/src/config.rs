use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactPaths;

/// Central configuration for the classifier.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    RandomForest {
        n_estimators: usize,
        /// `None` grows trees until leaves are pure.
        max_depth: Option<usize>,
        min_samples_split: usize,
        min_samples_leaf: usize,
    },
    GBDT {
        learning_rate: f32,
        max_depth: u32,
        num_boost_round: u32,
        training_optimization_level: u8,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::RandomForest {
            n_estimators: 200,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl ModelType {
    pub fn name(&self) -> &'static str {
        match self {
            ModelType::RandomForest { .. } => "random_forest",
            ModelType::GBDT { .. } => "gbdt",
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rf" | "random_forest" | "randomforest" => Ok(ModelType::default()),
            "gbdt" => Ok(ModelType::GBDT {
                learning_rate: 0.1,
                max_depth: 4,
                num_boost_round: 100,
                training_optimization_level: 2,
            }),
            _ => Err(format!(
                "Unknown model type: {}. Expected one of: rf, random_forest, gbdt",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(model_type: ModelType) -> Self {
        Self { model_type }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_type: ModelType::default(),
        }
    }
}

/// Parameters for a training run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainConfig {
    pub data_path: PathBuf,
    pub model_dir: PathBuf,
    pub model_file: String,
    pub scaler_file: String,
    pub target_column: String,
    pub fallback_target_column: String,
    pub test_fraction: f64,
    pub seed: u64,
    /// Fail when a schema feature is absent from the dataset instead of
    /// training on the intersection.
    pub strict_schema: bool,
    pub report_path: Option<PathBuf>,
    pub model: ModelConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/diabetes.csv"),
            model_dir: PathBuf::from("models"),
            model_file: String::from("diabetes_rf_model.json"),
            scaler_file: String::from("scaler.json"),
            target_column: String::from("Outcome"),
            fallback_target_column: String::from("target"),
            test_fraction: 0.2,
            seed: 42,
            strict_schema: true,
            report_path: None,
            model: ModelConfig::default(),
        }
    }
}

impl TrainConfig {
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::new(&self.model_dir, &self.model_file, &self.scaler_file)
    }
}

/// Parameters for the inference service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InferenceConfig {
    pub model_dir: PathBuf,
    pub model_file: String,
    pub scaler_file: String,
    /// Feed the unscaled row to the classifier when scaling fails instead of
    /// returning the error.
    pub fallback_on_scale_error: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            model_file: String::from("diabetes_rf_model.json"),
            scaler_file: String::from("scaler.json"),
            fallback_on_scale_error: false,
        }
    }
}

impl InferenceConfig {
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::new(&self.model_dir, &self.model_file, &self.scaler_file)
    }
}

fn load_json<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))
}

/// Load a training configuration from a JSON file. Missing fields take
/// their defaults.
pub fn load_train_config<P: AsRef<Path>>(path: P) -> Result<TrainConfig> {
    load_json(path)
}

pub fn load_inference_config<P: AsRef<Path>>(path: P) -> Result<InferenceConfig> {
    load_json(path)
}
