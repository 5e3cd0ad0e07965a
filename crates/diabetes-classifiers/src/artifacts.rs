//! Persisted scaler and classifier artifacts.
//!
//! Each artifact is a JSON envelope carrying the ordered feature list it was
//! fitted on and that list's fingerprint. Loading verifies the fingerprint so
//! a scaler/model pair built for a different schema is rejected.
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::models::ModelState;
use crate::preprocessing::Scaler;
use crate::schema::fingerprint;

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Locations of the two artifacts making up a trained pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
}

impl ArtifactPaths {
    pub fn new<P: AsRef<Path>>(dir: P, model_file: &str, scaler_file: &str) -> Self {
        ArtifactPaths {
            model: dir.as_ref().join(model_file),
            scaler: dir.as_ref().join(scaler_file),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Artifact<T> {
    pub format_version: u32,
    pub kind: String,
    pub schema_fingerprint: String,
    pub features: Vec<String>,
    pub created_at: String,
    pub payload: T,
}

impl<T> Artifact<T> {
    /// Fingerprint recorded in the envelope must match its feature list.
    fn verify(&self, path: &Path) -> Result<()> {
        let actual = fingerprint(&self.features);
        if actual != self.schema_fingerprint {
            return Err(PipelineError::SchemaMismatch {
                expected: self.schema_fingerprint.clone(),
                found: actual,
            })
            .with_context(|| format!("Corrupt artifact: {}", path.display()));
        }
        Ok(())
    }
}

fn save_artifact<T: Serialize + DeserializeOwned>(
    path: &Path,
    kind: &str,
    features: &[String],
    payload: &T,
) -> Result<()> {
    let envelope = Artifact {
        format_version: ARTIFACT_FORMAT_VERSION,
        kind: kind.to_string(),
        schema_fingerprint: fingerprint(features),
        features: features.to_vec(),
        created_at: chrono::Utc::now().to_rfc3339(),
        payload,
    };
    let json = serde_json::to_string(&envelope)
        .with_context(|| format!("Failed to serialize {}", kind))?;
    // serde_json writes NaN and infinities as null, which no longer parse as floats
    serde_json::from_str::<Artifact<T>>(&json).with_context(|| {
        format!(
            "Refusing to write {} with non-finite values to {}",
            kind,
            path.display()
        )
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, json)
        .with_context(|| format!("Failed to write artifact: {}", path.display()))?;
    log::info!("Saved {} to {}", kind, path.display());
    Ok(())
}

fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<Artifact<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(PipelineError::ArtifactNotFound(path.to_path_buf()).into());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to open artifact: {}", path.display()))
        }
    };
    let artifact: Artifact<T> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse artifact: {}", path.display()))?;
    if artifact.format_version != ARTIFACT_FORMAT_VERSION {
        anyhow::bail!(
            "Unsupported artifact format {} in {}",
            artifact.format_version,
            path.display()
        );
    }
    artifact.verify(path)?;
    Ok(artifact)
}

pub fn save_scaler<P: AsRef<Path>>(path: P, scaler: &Scaler) -> Result<()> {
    save_artifact(path.as_ref(), "scaler", &scaler.features, scaler)
}

pub fn load_scaler<P: AsRef<Path>>(path: P) -> Result<Artifact<Scaler>> {
    let artifact: Artifact<Scaler> = load_artifact(path.as_ref())?;
    if artifact.payload.features != artifact.features {
        return Err(PipelineError::SchemaMismatch {
            expected: artifact.features.join(","),
            found: artifact.payload.features.join(","),
        }
        .into());
    }
    Ok(artifact)
}

pub fn save_model<P: AsRef<Path>>(path: P, model: &ModelState, features: &[String]) -> Result<()> {
    save_artifact(path.as_ref(), model.kind(), features, model)
}

pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Artifact<ModelState>> {
    load_artifact(path.as_ref())
}

/// `features` must appear in `schema` in the same relative order.
pub fn check_against_schema<S: AsRef<str>>(features: &[String], schema: &[S]) -> Result<()> {
    let mut schema_iter = schema.iter().map(|s| s.as_ref());
    let ordered = features
        .iter()
        .all(|feat| schema_iter.any(|s| s == feat.as_str()));
    if features.is_empty() || !ordered {
        return Err(PipelineError::SchemaMismatch {
            expected: fingerprint(schema),
            found: fingerprint(features),
        }
        .into());
    }
    Ok(())
}
