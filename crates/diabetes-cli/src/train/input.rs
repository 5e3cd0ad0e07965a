use anyhow::Result;
use clap::ArgMatches;
use std::path::PathBuf;
use std::str::FromStr;

use diabetes_classifiers::config::{load_train_config, ModelType, TrainConfig};

use crate::util::validate_tsv_or_csv_file;

/// Build the training configuration from an optional JSON file, then apply
/// command line overrides.
pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<TrainConfig> {
    let mut config = match config_path {
        Some(path) => load_train_config(path)?,
        None => TrainConfig::default(),
    };

    if let Some(data) = matches.get_one::<String>("data") {
        config.data_path = PathBuf::from(data);
    }
    validate_tsv_or_csv_file(&config.data_path)?;

    if let Some(model_dir) = matches.get_one::<String>("model_dir") {
        config.model_dir = PathBuf::from(model_dir);
    }

    if let Some(model_type) = matches.get_one::<String>("model_type") {
        config.model.model_type = ModelType::from_str(model_type).map_err(anyhow::Error::msg)?;
    }

    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.seed = *seed;
    }

    if let Some(test_fraction) = matches.get_one::<f64>("test_fraction") {
        config.test_fraction = *test_fraction;
    }

    if matches.get_flag("lenient_schema") {
        config.strict_schema = false;
    }

    if let Some(report) = matches.get_one::<PathBuf>("report") {
        config.report_path = Some(report.clone());
    }

    log::debug!(
        "Effective training config:\n{}",
        serde_json::to_string_pretty(&config).unwrap_or_default()
    );
    Ok(config)
}
