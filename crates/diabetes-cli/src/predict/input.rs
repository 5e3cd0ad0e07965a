use anyhow::Result;
use clap::{Arg, ArgMatches, ValueHint};
use std::path::PathBuf;

use diabetes_classifiers::config::{load_inference_config, InferenceConfig};
use diabetes_classifiers::schema::{FeatureSpec, InputRow, FEATURES};

#[derive(Debug, Clone)]
pub struct PredictArgs {
    pub config: InferenceConfig,
    pub values: InputRow,
}

/// One `--<Feature>` flag per schema feature.
pub fn feature_args() -> Vec<Arg> {
    FEATURES
        .iter()
        .map(|f| {
            Arg::new(f.name)
                .long(f.name)
                .help(format!(
                    "{} [{} to {}, default {}]",
                    f.label, f.min, f.max, f.default
                ))
                .value_parser(clap::value_parser!(f32))
                .allow_negative_numbers(true)
                .value_hint(ValueHint::Other)
        })
        .collect()
}

/// Value for `feature` from the flags, falling back to the default. Counts
/// are rounded to whole numbers, then everything is clamped to the input
/// bounds.
pub fn feature_value(feature: &FeatureSpec, matches: &ArgMatches) -> f32 {
    let Some(&value) = matches.get_one::<f32>(feature.name) else {
        return feature.default;
    };
    if !value.is_finite() {
        log::warn!("{} = {} is not finite; using default {}", feature.name, value, feature.default);
        return feature.default;
    }
    let value = if feature.integer && value.fract() != 0.0 {
        let rounded = value.round();
        log::warn!(
            "{} takes whole numbers; rounded {} to {}",
            feature.name,
            value,
            rounded
        );
        rounded
    } else {
        value
    };
    if !feature.contains(value) {
        let clamped = feature.clamp(value);
        log::warn!(
            "{} = {} is outside [{}, {}]; clamped to {}",
            feature.name,
            value,
            feature.min,
            feature.max,
            clamped
        );
        return clamped;
    }
    value
}

impl PredictArgs {
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => load_inference_config(path)?,
            None => InferenceConfig::default(),
        };

        if let Some(model_dir) = matches.get_one::<String>("model_dir") {
            config.model_dir = PathBuf::from(model_dir);
        }
        if matches.get_flag("fallback_on_scale_error") {
            config.fallback_on_scale_error = true;
        }

        let values = FEATURES
            .iter()
            .map(|feature| (feature.name.to_string(), feature_value(feature, matches)))
            .collect();

        Ok(PredictArgs { config, values })
    }
}
