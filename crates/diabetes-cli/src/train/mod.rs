pub mod input;

use anyhow::Result;

use diabetes_classifiers::config::TrainConfig;
use diabetes_classifiers::training::{self, TrainingOutcome};

/// Train, persist the artifacts and print the held-out metrics to stdout.
pub fn run_training(config: &TrainConfig) -> Result<TrainingOutcome> {
    let outcome = training::train(config)?;

    if !outcome.missing_features.is_empty() {
        println!(
            "Trained without missing features: {}",
            outcome.missing_features.join(", ")
        );
    }
    println!(
        "Model: {} | target: {} | train rows: {} | test rows: {}",
        outcome.model.name(),
        outcome.target_column,
        outcome.n_train,
        outcome.n_test
    );
    println!("{}", outcome.metrics);
    println!("Saved model to {}", outcome.paths.model.display());
    println!("Saved scaler to {}", outcome.paths.scaler.display());
    if let Some(report) = &config.report_path {
        println!("Saved report to {}", report.display());
    }

    Ok(outcome)
}
