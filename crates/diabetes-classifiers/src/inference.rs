//! Load-once inference over a persisted scaler/classifier pair.
use std::fmt;
use std::sync::{Mutex, OnceLock};

use anyhow::{Context, Result};

use crate::artifacts::{check_against_schema, load_model, load_scaler, ArtifactPaths};
use crate::config::InferenceConfig;
use crate::error::PipelineError;
use crate::math::Array2;
use crate::models::{label_for, ClassifierModel};
use crate::preprocessing::Scaler;
use crate::schema::{build_input, feature_order, InputRow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PredictorOptions {
    /// Feed the unscaled row to the classifier when scaling fails.
    pub fallback_on_scale_error: bool,
}

impl From<&InferenceConfig> for PredictorOptions {
    fn from(config: &InferenceConfig) -> Self {
        PredictorOptions {
            fallback_on_scale_error: config.fallback_on_scale_error,
        }
    }
}

/// Outcome of a single prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: u8,
    /// Probability of label 1.
    pub probability: f32,
}

impl Prediction {
    pub fn is_high_risk(&self) -> bool {
        self.label == 1
    }

    pub fn risk_message(&self) -> &'static str {
        if self.is_high_risk() {
            "High Risk of Diabetes"
        } else {
            "Low Risk of Diabetes"
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.risk_message())?;
        write!(f, "Probability: {:.1}%", self.probability * 100.0)
    }
}

/// A fitted scaler and classifier sharing one feature list.
pub struct Predictor {
    scaler: Scaler,
    model: Box<dyn ClassifierModel>,
    options: PredictorOptions,
}

impl Predictor {
    /// Assemble a predictor from in-memory parts. The feature list is the
    /// scaler's.
    pub fn new(
        scaler: Scaler,
        model: Box<dyn ClassifierModel>,
        options: PredictorOptions,
    ) -> Result<Self> {
        if !model.is_fitted() {
            return Err(PipelineError::ModelNotFitted.into());
        }
        Ok(Predictor {
            scaler,
            model,
            options,
        })
    }

    /// Read both artifacts and verify they agree with each other and with
    /// the current feature schema.
    pub fn load(paths: &ArtifactPaths, options: PredictorOptions) -> Result<Self> {
        let scaler = load_scaler(&paths.scaler)?;
        let model = load_model(&paths.model)?;

        if scaler.schema_fingerprint != model.schema_fingerprint
            || scaler.features != model.features
        {
            return Err(PipelineError::SchemaMismatch {
                expected: model.schema_fingerprint,
                found: scaler.schema_fingerprint,
            })
            .context("Scaler and model were fitted on different features");
        }
        check_against_schema(&scaler.features, &feature_order())
            .context("Artifacts do not match the current feature schema")?;

        log::info!(
            "Loaded {} model ({} features, fingerprint {}) from {}",
            model.kind,
            scaler.features.len(),
            scaler.schema_fingerprint,
            paths.model.display()
        );
        Predictor::new(scaler.payload, model.payload.into_model(), options)
    }

    pub fn from_config(config: &InferenceConfig) -> Result<Self> {
        Predictor::load(&config.artifact_paths(), config.into())
    }

    pub fn features(&self) -> &[String] {
        &self.scaler.features
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn predict(&self, values: &InputRow) -> Result<Prediction> {
        let raw = build_input(values, self.features());
        let row = match self.scale(&raw) {
            Ok(scaled) => scaled,
            Err(e) if self.options.fallback_on_scale_error => {
                log::warn!("Scaling failed ({:#}); using unscaled input", e);
                raw
            }
            Err(e) => return Err(e),
        };

        let x = Array2::from_shape_vec((1, row.len()), row)?;
        let probability = self
            .model
            .predict_proba(&x)?
            .first()
            .copied()
            .ok_or(PipelineError::ShapeMismatch {
                expected: 1,
                found: 0,
            })?;

        Ok(Prediction {
            label: label_for(probability),
            probability,
        })
    }

    /// A finite input that scales to a non-finite value (zero-variance
    /// training column) is a scaling failure.
    fn scale(&self, raw: &[f32]) -> Result<Vec<f32>> {
        let scaled = self.scaler.transform_row(raw)?;
        if let Some(i) = (0..raw.len()).find(|&i| raw[i].is_finite() && !scaled[i].is_finite()) {
            anyhow::bail!(
                "Feature '{}' scaled to a non-finite value (std = {})",
                self.scaler.features[i],
                self.scaler.std[i]
            );
        }
        Ok(scaled)
    }
}

static PREDICTOR: OnceLock<Predictor> = OnceLock::new();
static PREDICTOR_INIT: Mutex<()> = Mutex::new(());

/// Process-wide predictor, loaded on first successful call.
///
/// Later calls return the cached instance regardless of `paths`. A failed
/// load leaves the cache empty so a retry can succeed once the artifacts
/// exist.
pub fn predictor(paths: &ArtifactPaths, options: PredictorOptions) -> Result<&'static Predictor> {
    if let Some(p) = PREDICTOR.get() {
        return Ok(p);
    }

    let _guard = PREDICTOR_INIT
        .lock()
        .map_err(|_| anyhow::anyhow!("Predictor initialization lock poisoned"))?;
    if let Some(p) = PREDICTOR.get() {
        return Ok(p);
    }

    let loaded = Predictor::load(paths, options)?;
    Ok(PREDICTOR.get_or_init(|| loaded))
}
