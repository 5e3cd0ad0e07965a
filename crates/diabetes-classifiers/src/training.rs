//! Training pipeline: load → select → split → scale → fit → evaluate → persist.
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::artifacts::{save_model, save_scaler, ArtifactPaths};
use crate::config::TrainConfig;
use crate::data_handling::{train_test_split, Dataset};
use crate::error::PipelineError;
use crate::io::{load_table, Table};
use crate::metrics::EvaluationMetrics;
use crate::models::{build_model, ClassifierModel};
use crate::preprocessing::Scaler;
use crate::report;
use crate::schema::feature_order;

/// Everything a training run produces.
pub struct TrainingOutcome {
    pub scaler: Scaler,
    pub model: Box<dyn ClassifierModel>,
    pub metrics: EvaluationMetrics,
    /// Features the model was actually trained on, in schema order.
    pub features: Vec<String>,
    /// Schema features absent from the dataset (lenient schema only).
    pub missing_features: Vec<String>,
    pub target_column: String,
    pub n_train: usize,
    pub n_test: usize,
    /// Held-out labels and class-1 probabilities, in row order.
    pub test_labels: Vec<u8>,
    pub test_probabilities: Vec<f32>,
    pub paths: ArtifactPaths,
}

/// Pick the primary target column, falling back to the secondary name.
pub fn resolve_target_column(table: &Table, config: &TrainConfig) -> Result<String> {
    [&config.target_column, &config.fallback_target_column]
        .into_iter()
        .find(|name| table.has_column(name))
        .cloned()
        .ok_or_else(|| {
            PipelineError::MissingTargetColumn {
                primary: config.target_column.clone(),
                fallback: config.fallback_target_column.clone(),
            }
            .into()
        })
}

/// Schema features present in `table`, in schema order, plus the absent ones.
///
/// With `strict` any absent feature is fatal; otherwise a warning is logged
/// and training continues on the intersection.
pub fn select_features(
    table: &Table,
    schema: &[String],
    strict: bool,
) -> Result<(Vec<String>, Vec<String>)> {
    let (present, missing): (Vec<String>, Vec<String>) =
        schema.iter().cloned().partition(|f| table.has_column(f));

    if !missing.is_empty() {
        if strict {
            return Err(PipelineError::MissingFeatures(missing).into());
        }
        log::warn!(
            "The following schema features are missing from the dataset: {}. \
             Training continues with the remaining {} features.",
            missing.join(", "),
            present.len()
        );
    }
    if present.is_empty() {
        return Err(PipelineError::NoFeatures.into());
    }
    Ok((present, missing))
}

/// Load the configured dataset and run the full training pipeline.
pub fn train(config: &TrainConfig) -> Result<TrainingOutcome> {
    log::info!("Loading dataset from {}", config.data_path.display());
    let table = load_table(&config.data_path)?;
    train_on_table(&table, config)
}

/// Run the training pipeline on an already loaded table and persist the
/// artifacts. Existing artifacts are overwritten.
pub fn train_on_table(table: &Table, config: &TrainConfig) -> Result<TrainingOutcome> {
    let target = resolve_target_column(table, config)?;
    let (features, missing_features) =
        select_features(table, &feature_order(), config.strict_schema)?;

    let dataset = Dataset::from_table(table, &features, &target)?;
    dataset.log_input_data_summary();

    let split = train_test_split(&dataset, config.test_fraction, config.seed)?;
    log::info!(
        "Split {} rows into {} train / {} test (seed {})",
        dataset.len(),
        split.train.len(),
        split.test.len(),
        config.seed
    );

    let scaler = Scaler::fit(&split.train.x, &features)?;
    for col in scaler.zero_variance_columns() {
        log::warn!(
            "Feature '{}' has zero variance in the training data; its scaled values are not finite",
            features[col]
        );
    }
    let x_train = scaler.transform(&split.train.x)?;
    let x_test = scaler.transform(&split.test.x)?;

    let mut model = build_model(&config.model, config.seed);
    let start_time = Instant::now();
    model
        .fit(&x_train, split.train.y.as_slice())
        .with_context(|| format!("Failed to fit {}", config.model.model_type.name()))?;
    log::info!("Fitted {} in {:?}", model.name(), start_time.elapsed());

    let test_probabilities = model.predict_proba(&x_test)?;
    let test_predictions = model.predict(&x_test)?;
    let metrics = EvaluationMetrics::evaluate(
        split.test.y.as_slice(),
        &test_predictions,
        &test_probabilities,
    );

    let paths = config.artifact_paths();
    save_model(&paths.model, &model.state()?, &features)?;
    save_scaler(&paths.scaler, &scaler)?;

    let outcome = TrainingOutcome {
        scaler,
        model,
        metrics,
        features,
        missing_features,
        target_column: target,
        n_train: split.train.len(),
        n_test: split.test.len(),
        test_labels: split.test.y.to_vec(),
        test_probabilities,
        paths,
    };

    if let Some(report_path) = &config.report_path {
        write_report(report_path, &outcome, config)?;
    }

    Ok(outcome)
}

fn write_report(path: &Path, outcome: &TrainingOutcome, config: &TrainConfig) -> Result<()> {
    let html = report::training_report(outcome, config)?;
    std::fs::write(path, html)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    log::info!("Saved training report to {}", path.display());
    Ok(())
}
