//! End-to-end tests of the training pipeline and the predictor.

mod common;

use common::{synthetic_csv, train_config, write_file};

use diabetes_classifiers::artifacts::ArtifactPaths;
use diabetes_classifiers::config::{ModelConfig, ModelType};
use diabetes_classifiers::data_handling::Dataset;
use diabetes_classifiers::error::PipelineError;
use diabetes_classifiers::inference::{Predictor, PredictorOptions};
use diabetes_classifiers::io::load_table;
use diabetes_classifiers::models::label_for;
use diabetes_classifiers::preprocessing::Scaler;
use diabetes_classifiers::schema::{default_inputs, feature_order, InputRow, FEATURES};
use diabetes_classifiers::training::train;

fn pipeline_error(err: &anyhow::Error) -> &PipelineError {
    err.downcast_ref::<PipelineError>()
        .unwrap_or_else(|| panic!("expected a PipelineError, got: {:#}", err))
}

// ---------------------------------------------------------------------------
// Training and scoring
// ---------------------------------------------------------------------------

#[test]
fn training_on_balanced_data_persists_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "diabetes.csv", &synthetic_csv(500, &[], &[]));
    let config = train_config(dir.path(), &data);

    let outcome = train(&config).unwrap();

    assert_eq!(outcome.n_train + outcome.n_test, 500);
    assert_eq!(outcome.n_test, 100);
    assert_eq!(outcome.features, feature_order());
    assert!(outcome.missing_features.is_empty());
    assert_eq!(outcome.target_column, "Outcome");

    let metrics = &outcome.metrics;
    assert!((0.0..=1.0).contains(&metrics.accuracy));
    let auc = metrics.roc_auc.expect("both classes are in the test split");
    assert!((0.0..=1.0).contains(&auc));
    assert!(metrics.accuracy > 0.7, "accuracy {}", metrics.accuracy);

    assert!(outcome.paths.model.exists());
    assert!(outcome.paths.scaler.exists());
    assert_eq!(outcome.paths.model, dir.path().join("models/diabetes_rf_model.json"));
    assert_eq!(outcome.paths.scaler, dir.path().join("models/scaler.json"));
}

#[test]
fn default_inputs_score_against_trained_model() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "diabetes.csv", &synthetic_csv(500, &[], &[]));
    let outcome = train(&train_config(dir.path(), &data)).unwrap();

    let predictor = Predictor::load(&outcome.paths, PredictorOptions::default()).unwrap();
    assert_eq!(predictor.features(), outcome.features.as_slice());

    let prediction = predictor.predict(&default_inputs()).unwrap();
    assert!(prediction.label == 0 || prediction.label == 1);
    assert!((0.0..=1.0).contains(&prediction.probability));
    assert_eq!(prediction.label, label_for(prediction.probability));
}

#[test]
fn missing_target_column_is_fatal_and_named() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "no_target.csv", &synthetic_csv(50, &[], &["Outcome"]));

    let err = train(&train_config(dir.path(), &data)).err().unwrap();

    assert!(matches!(
        pipeline_error(&err),
        PipelineError::MissingTargetColumn { .. }
    ));
    assert!(err.to_string().contains("Outcome"));
    assert!(!dir.path().join("models").exists());
}

#[test]
fn fallback_target_column_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(
        dir.path(),
        "renamed.csv",
        &synthetic_csv(120, &[("Outcome", "target")], &[]),
    );

    let outcome = train(&train_config(dir.path(), &data)).unwrap();
    assert_eq!(outcome.target_column, "target");
}

#[test]
fn inference_before_training_reports_missing_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::new(dir.path(), "diabetes_rf_model.json", "scaler.json");

    let err = Predictor::load(&paths, PredictorOptions::default()).err().unwrap();

    match pipeline_error(&err) {
        PipelineError::ArtifactNotFound(path) => assert_eq!(path, &paths.scaler),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn fixed_seed_training_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "diabetes.csv", &synthetic_csv(300, &[], &[]));

    let mut first_config = train_config(dir.path(), &data);
    first_config.model_dir = dir.path().join("first");
    let mut second_config = first_config.clone();
    second_config.model_dir = dir.path().join("second");

    let first = train(&first_config).unwrap();
    let second = train(&second_config).unwrap();

    assert_eq!(first.metrics, second.metrics);
    assert_eq!(first.test_labels, second.test_labels);
    assert_eq!(first.test_probabilities, second.test_probabilities);
    assert_eq!(first.scaler, second.scaler);

    let inputs = default_inputs();
    let a = Predictor::load(&first.paths, PredictorOptions::default())
        .unwrap()
        .predict(&inputs)
        .unwrap();
    let b = Predictor::load(&second.paths, PredictorOptions::default())
        .unwrap()
        .predict(&inputs)
        .unwrap();
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// Schema policies
// ---------------------------------------------------------------------------

#[test]
fn strict_schema_rejects_missing_feature() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "partial.csv", &synthetic_csv(100, &[], &["Insulin"]));

    let err = train(&train_config(dir.path(), &data)).err().unwrap();

    match pipeline_error(&err) {
        PipelineError::MissingFeatures(names) => assert_eq!(names, &vec!["Insulin".to_string()]),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn lenient_schema_trains_on_intersection() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "partial.csv", &synthetic_csv(200, &[], &["Insulin"]));
    let mut config = train_config(dir.path(), &data);
    config.strict_schema = false;

    let outcome = train(&config).unwrap();
    assert_eq!(outcome.missing_features, vec!["Insulin".to_string()]);
    assert_eq!(outcome.features.len(), FEATURES.len() - 1);
    assert!(!outcome.features.contains(&"Insulin".to_string()));

    let predictor = Predictor::load(&outcome.paths, PredictorOptions::default()).unwrap();
    let prediction = predictor.predict(&default_inputs()).unwrap();
    assert!((0.0..=1.0).contains(&prediction.probability));
}

#[test]
fn mismatched_artifact_pair_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let full = write_file(dir.path(), "full.csv", &synthetic_csv(150, &[], &[]));
    let partial = write_file(dir.path(), "partial.csv", &synthetic_csv(150, &[], &["Age"]));

    let mut full_config = train_config(dir.path(), &full);
    full_config.model_dir = dir.path().join("full");
    let mut partial_config = train_config(dir.path(), &partial);
    partial_config.model_dir = dir.path().join("partial");
    partial_config.strict_schema = false;

    let full_outcome = train(&full_config).unwrap();
    let partial_outcome = train(&partial_config).unwrap();

    let mixed = ArtifactPaths {
        model: full_outcome.paths.model.clone(),
        scaler: partial_outcome.paths.scaler.clone(),
    };
    let err = Predictor::load(&mixed, PredictorOptions::default()).err().unwrap();
    assert!(matches!(
        pipeline_error(&err),
        PipelineError::SchemaMismatch { .. }
    ));
}

// ---------------------------------------------------------------------------
// Data handling, model choice and reporting
// ---------------------------------------------------------------------------

#[test]
fn missing_feature_values_are_imputed() {
    let dir = tempfile::tempdir().unwrap();
    let mut csv = synthetic_csv(200, &[], &[]);
    csv = csv
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i > 0 && i % 7 == 0 {
                let mut cells: Vec<&str> = line.split(',').collect();
                cells[4] = "NA";
                cells[5] = "";
                cells.join(",")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    let data = write_file(dir.path(), "gaps.csv", &csv);

    let table = load_table(&data).unwrap();
    assert_eq!(table.column("Insulin").unwrap().missing_count(), 0);
    assert_eq!(table.column("BMI").unwrap().missing_count(), 0);

    let outcome = train(&train_config(dir.path(), &data)).unwrap();
    assert!(outcome.test_probabilities.iter().all(|p| p.is_finite()));
}

#[test]
fn non_finite_cells_train_into_loadable_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let csv = synthetic_csv(200, &[], &[])
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let mut cells: Vec<&str> = line.split(',').collect();
            match i {
                3 => cells[1] = "NAN",
                4 => cells[4] = "inf",
                5 => cells[5] = "#N/A",
                _ => {}
            }
            cells.join(",")
        })
        .collect::<Vec<_>>()
        .join("\n");
    let data = write_file(dir.path(), "non_finite.csv", &csv);

    let outcome = train(&train_config(dir.path(), &data)).unwrap();
    assert!(outcome.scaler.mean.iter().all(|m| m.is_finite()));
    assert!(outcome.scaler.std.iter().all(|s| s.is_finite()));

    let predictor = Predictor::load(&outcome.paths, PredictorOptions::default()).unwrap();
    let prediction = predictor.predict(&default_inputs()).unwrap();
    assert!((0.0..=1.0).contains(&prediction.probability));
}

#[test]
fn gbdt_pipeline_trains_and_serves() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "diabetes.csv", &synthetic_csv(200, &[], &[]));
    let mut config = train_config(dir.path(), &data);
    config.model = ModelConfig::new(ModelType::GBDT {
        learning_rate: 0.1,
        max_depth: 3,
        num_boost_round: 20,
        training_optimization_level: 2,
    });

    let outcome = train(&config).unwrap();
    assert_eq!(outcome.model.name(), "gbdt");
    assert!(outcome
        .test_probabilities
        .iter()
        .all(|p| (0.0..=1.0).contains(p)));

    let predictor = Predictor::load(&outcome.paths, PredictorOptions::default()).unwrap();
    assert_eq!(predictor.model_name(), "gbdt");
    let prediction = predictor.predict(&default_inputs()).unwrap();
    assert!((0.0..=1.0).contains(&prediction.probability));
}

#[test]
fn html_report_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "diabetes.csv", &synthetic_csv(120, &[], &[]));
    let mut config = train_config(dir.path(), &data);
    let report = dir.path().join("report.html");
    config.report_path = Some(report.clone());

    train(&config).unwrap();

    let html = std::fs::read_to_string(&report).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Held-out metrics"));
    assert!(html.contains("roc-curve"));
    assert!(html.contains("strict_schema"));
}

// ---------------------------------------------------------------------------
// Input bounds and scaling
// ---------------------------------------------------------------------------

#[test]
fn ui_bounds_score_without_error() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "diabetes.csv", &synthetic_csv(120, &[], &[]));
    let outcome = train(&train_config(dir.path(), &data)).unwrap();
    let predictor = Predictor::load(&outcome.paths, PredictorOptions::default()).unwrap();

    let minimum: InputRow = FEATURES.iter().map(|f| (f.name.to_string(), f.min)).collect();
    let maximum: InputRow = FEATURES.iter().map(|f| (f.name.to_string(), f.max)).collect();

    for inputs in [minimum, maximum] {
        let prediction = predictor.predict(&inputs).unwrap();
        assert!((0.0..=1.0).contains(&prediction.probability));
    }
}

#[test]
fn scaler_transform_is_stable_and_invertible() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "diabetes.csv", &synthetic_csv(80, &[], &[]));
    let table = load_table(&data).unwrap();
    let features = feature_order();
    let dataset = Dataset::from_table(&table, &features, "Outcome").unwrap();

    let scaler = Scaler::fit(&dataset.x, &features).unwrap();
    let once = scaler.transform(&dataset.x).unwrap();
    let twice = scaler.transform(&dataset.x).unwrap();
    assert_eq!(once, twice);

    let restored = scaler.inverse_transform(&once).unwrap();
    for (a, b) in restored.as_slice().iter().zip(dataset.x.as_slice()) {
        assert!((a - b).abs() <= 1e-3 * b.abs().max(1.0), "{} vs {}", a, b);
    }
}
