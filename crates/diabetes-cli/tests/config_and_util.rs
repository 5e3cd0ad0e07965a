//! Integration tests for CLI argument overlays and util helpers.

use std::path::PathBuf;

use diabetes_classifiers::config::ModelType;
use diabetes_classifiers::schema::{feature_order, fingerprint, FEATURES};
use diabetes_cli::cli::build_cli;
use diabetes_cli::predict::input::PredictArgs;
use diabetes_cli::train::input::from_arguments;
use diabetes_cli::util::{render_schema, validate_tsv_or_csv_file};

fn subcommand_matches(args: &[&str]) -> clap::ArgMatches {
    let matches = build_cli()
        .try_get_matches_from(std::iter::once("diabetes").chain(args.iter().copied()))
        .unwrap();
    let (_, sub) = matches.subcommand().unwrap();
    sub.clone()
}

// ---------------------------------------------------------------------------
// validate_tsv_or_csv_file
// ---------------------------------------------------------------------------

#[test]
fn validate_tsv_file_exists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.tsv");
    std::fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(&path).is_ok());
}

#[test]
fn validate_uppercase_csv_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.CSV");
    std::fs::File::create(&path).unwrap();
    assert!(validate_tsv_or_csv_file(&path).is_ok());
}

#[test]
fn validate_wrong_extension_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.parquet");
    std::fs::File::create(&path).unwrap();
    let err = validate_tsv_or_csv_file(&path).unwrap_err();
    assert!(err.to_string().contains(".tsv or .csv"));
}

#[test]
fn validate_nonexistent_file_errors() {
    let err = validate_tsv_or_csv_file("/nonexistent/path/data.csv").unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

// ---------------------------------------------------------------------------
// Schema table
// ---------------------------------------------------------------------------

#[test]
fn schema_table_lists_every_feature() {
    let table = render_schema();
    for f in FEATURES.iter() {
        assert!(table.contains(f.name));
    }
    assert!(table.contains(&fingerprint(&feature_order())));
}

#[test]
fn schema_table_lists_sample_inputs() {
    let table = render_schema();
    let samples = table
        .split("Sample inputs:")
        .nth(1)
        .expect("sample section present");
    let rows: Vec<&str> = samples
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take_while(|l| !l.starts_with("Schema fingerprint"))
        .collect();
    assert_eq!(rows.len(), 6);
    assert!(rows[0].contains("Preg") && rows[0].contains("DPF"));
    assert_eq!(
        rows[2].split_whitespace().collect::<Vec<_>>(),
        vec!["5", "155", "82", "30", "130", "32.5", "1.2", "45"]
    );
}

// ---------------------------------------------------------------------------
// Train arguments
// ---------------------------------------------------------------------------

#[test]
fn train_flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("diabetes.csv");
    std::fs::File::create(&data).unwrap();
    let config_path = dir.path().join("train.json");
    std::fs::write(&config_path, r#"{ "seed": 3, "test_fraction": 0.3 }"#).unwrap();

    let matches = subcommand_matches(&[
        "train",
        config_path.to_str().unwrap(),
        "-d",
        data.to_str().unwrap(),
        "-o",
        "out",
        "--model-type",
        "gbdt",
        "--seed",
        "9",
        "--lenient-schema",
        "--report",
        "report.html",
    ]);
    let config = from_arguments(Some(&config_path), &matches).unwrap();

    assert_eq!(config.data_path, data);
    assert_eq!(config.model_dir, PathBuf::from("out"));
    assert_eq!(config.model.model_type.name(), "gbdt");
    assert_eq!(config.seed, 9);
    assert_eq!(config.test_fraction, 0.3);
    assert!(!config.strict_schema);
    assert_eq!(config.report_path, Some(PathBuf::from("report.html")));
}

#[test]
fn train_without_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("diabetes.tsv");
    std::fs::File::create(&data).unwrap();

    let matches = subcommand_matches(&["train", "--data", data.to_str().unwrap()]);
    let config = from_arguments(None, &matches).unwrap();

    assert_eq!(config.model.model_type, ModelType::default());
    assert_eq!(config.seed, 42);
    assert!(config.strict_schema);
    assert_eq!(config.model_dir, PathBuf::from("models"));
}

#[test]
fn train_rejects_missing_data_file() {
    let matches = subcommand_matches(&["train", "-d", "/nonexistent/diabetes.csv"]);
    assert!(from_arguments(None, &matches).is_err());
}

// ---------------------------------------------------------------------------
// Predict arguments
// ---------------------------------------------------------------------------

#[test]
fn predict_fills_defaults_and_clamps() {
    let matches = subcommand_matches(&[
        "predict",
        "--model-dir",
        "artifacts",
        "--fallback-on-scale-error",
        "--Glucose",
        "400",
        "--BMI",
        "31.5",
    ]);
    let args = PredictArgs::from_arguments(None, &matches).unwrap();

    assert_eq!(args.config.model_dir, PathBuf::from("artifacts"));
    assert!(args.config.fallback_on_scale_error);
    assert_eq!(args.values.len(), FEATURES.len());
    assert_eq!(args.values["Glucose"], 250.0);
    assert_eq!(args.values["BMI"], 31.5);
    assert_eq!(args.values["Age"], 30.0);
}

#[test]
fn predict_config_file_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("serve.json");
    std::fs::write(
        &config_path,
        r#"{ "model_dir": "prod", "fallback_on_scale_error": true }"#,
    )
    .unwrap();

    let path_str = config_path.to_str().unwrap();
    let matches = subcommand_matches(&["predict", "--config", path_str]);
    let args = PredictArgs::from_arguments(Some(&config_path), &matches).unwrap();

    assert_eq!(args.config.model_dir, PathBuf::from("prod"));
    assert!(args.config.fallback_on_scale_error);
}
