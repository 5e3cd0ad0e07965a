use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Fatal pipeline failures. Returned inside `anyhow::Error` so callers can
/// recover the variant with `downcast_ref`.
#[derive(Debug)]
pub enum PipelineError {
    /// Neither the primary nor the fallback target column exists.
    MissingTargetColumn { primary: String, fallback: String },
    /// Schema features absent from the dataset while the schema is strict.
    MissingFeatures(Vec<String>),
    /// No schema feature is present in the dataset.
    NoFeatures,
    /// A selected column stayed text after numeric coercion.
    NonNumericColumn(String),
    /// A column yields NaN or infinite statistics.
    NonFiniteColumn(String),
    /// The target column still has missing cells after load.
    MissingTargetValues { column: String, count: usize },
    /// A persisted artifact is absent at the expected location.
    ArtifactNotFound(PathBuf),
    /// Artifact schema does not match the schema in use.
    SchemaMismatch { expected: String, found: String },
    /// Column count of the input differs from the fitted width.
    ShapeMismatch { expected: usize, found: usize },
    EmptyDataset,
    ModelNotFitted,
    /// Training labels contain a single class.
    SingleClass(u8),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineError::MissingTargetColumn { primary, fallback } => write!(
                f,
                "No '{}' or '{}' column found in dataset; add a target column",
                primary, fallback
            ),
            PipelineError::MissingFeatures(names) => write!(
                f,
                "Dataset is missing schema features: {}",
                names.join(", ")
            ),
            PipelineError::NoFeatures => {
                write!(f, "Dataset contains none of the schema features")
            }
            PipelineError::NonNumericColumn(name) => {
                write!(f, "Column '{}' is not numeric", name)
            }
            PipelineError::NonFiniteColumn(name) => {
                write!(f, "Column '{}' contains non-finite values", name)
            }
            PipelineError::MissingTargetValues { column, count } => write!(
                f,
                "Target column '{}' has {} missing values",
                column, count
            ),
            PipelineError::ArtifactNotFound(path) => {
                write!(f, "Artifact not found at: {}", path.display())
            }
            PipelineError::SchemaMismatch { expected, found } => write!(
                f,
                "Feature schema mismatch: expected {}, found {}",
                expected, found
            ),
            PipelineError::ShapeMismatch { expected, found } => write!(
                f,
                "Expected {} feature columns, got {}",
                expected, found
            ),
            PipelineError::EmptyDataset => write!(f, "Dataset has no rows"),
            PipelineError::ModelNotFitted => write!(f, "Model has not been fitted"),
            PipelineError::SingleClass(label) => write!(
                f,
                "Training labels contain only class {}; both classes are required",
                label
            ),
        }
    }
}

impl Error for PipelineError {}
