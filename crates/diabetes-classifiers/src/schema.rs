//! The fixed, ordered feature schema shared by training and inference.
//!
//! Training and serving must agree on the order below. Every persisted
//! artifact records the fingerprint of the feature list it was built with,
//! and loading rejects a fingerprint that does not match.

use std::collections::HashMap;

/// Raw user input: feature name → value.
pub type InputRow = HashMap<String, f32>;

/// One schema feature with the bounds the presentation layer clamps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    /// Accepts whole numbers only.
    pub integer: bool,
}

impl FeatureSpec {
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

pub const FEATURES: [FeatureSpec; 8] = [
    FeatureSpec {
        name: "Pregnancies",
        label: "Pregnancies",
        description: "Number of times pregnant",
        min: 0.0,
        max: 20.0,
        default: 2.0,
        integer: true,
    },
    FeatureSpec {
        name: "Glucose",
        label: "Glucose Level",
        description: "Plasma glucose two hours into an oral glucose tolerance test",
        min: 0.0,
        max: 250.0,
        default: 120.0,
        integer: true,
    },
    FeatureSpec {
        name: "BloodPressure",
        label: "Blood Pressure",
        description: "Diastolic blood pressure (mm Hg)",
        min: 0.0,
        max: 200.0,
        default: 70.0,
        integer: true,
    },
    FeatureSpec {
        name: "SkinThickness",
        label: "Skin Thickness",
        description: "Triceps skin fold thickness (mm)",
        min: 0.0,
        max: 100.0,
        default: 25.0,
        integer: true,
    },
    FeatureSpec {
        name: "Insulin",
        label: "Insulin Level",
        description: "Two-hour serum insulin (uU/ml)",
        min: 0.0,
        max: 900.0,
        default: 80.0,
        integer: true,
    },
    FeatureSpec {
        name: "BMI",
        label: "BMI (kg/m2)",
        description: "Body mass index, weight (kg) / height (m)^2",
        min: 0.0,
        max: 70.0,
        default: 25.0,
        integer: false,
    },
    FeatureSpec {
        name: "DiabetesPedigreeFunction",
        label: "Diabetes Pedigree Function",
        description: "Hereditary diabetes risk score",
        min: 0.0,
        max: 3.0,
        default: 0.5,
        integer: false,
    },
    FeatureSpec {
        name: "Age",
        label: "Age",
        description: "Age in years",
        min: 1.0,
        max: 120.0,
        default: 30.0,
        integer: true,
    },
];

/// Feature names in training order.
pub fn feature_order() -> Vec<String> {
    FEATURES.iter().map(|f| f.name.to_string()).collect()
}

pub fn feature_spec(name: &str) -> Option<&'static FeatureSpec> {
    FEATURES.iter().find(|f| f.name == name)
}

/// Input row holding every feature's default value.
pub fn default_inputs() -> InputRow {
    FEATURES
        .iter()
        .map(|f| (f.name.to_string(), f.default))
        .collect()
}

/// Reference patients in `FEATURES` order, shown next to the feature guide.
pub const SAMPLE_INPUTS: [[f32; 8]; 5] = [
    [2.0, 120.0, 70.0, 22.0, 85.0, 25.3, 0.45, 29.0],
    [5.0, 155.0, 82.0, 30.0, 130.0, 32.5, 1.20, 45.0],
    [1.0, 99.0, 64.0, 18.0, 60.0, 21.1, 0.35, 22.0],
    [3.0, 140.0, 90.0, 28.0, 100.0, 29.7, 0.90, 35.0],
    [0.0, 80.0, 75.0, 20.0, 50.0, 23.4, 0.25, 28.0],
];

pub fn sample_inputs() -> Vec<InputRow> {
    SAMPLE_INPUTS
        .iter()
        .map(|row| {
            FEATURES
                .iter()
                .zip(row)
                .map(|(f, &v)| (f.name.to_string(), v))
                .collect()
        })
        .collect()
}

/// Build a single ordered row from `values`.
///
/// Features absent from `values` become `NaN`; keys not in `schema` are
/// ignored. The result always has `schema.len()` elements.
pub fn build_input<S: AsRef<str>>(values: &InputRow, schema: &[S]) -> Vec<f32> {
    schema
        .iter()
        .map(|feat| values.get(feat.as_ref()).copied().unwrap_or(f32::NAN))
        .collect()
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Stable FNV-1a fingerprint of an ordered feature list, as 16 hex digits.
pub fn fingerprint<S: AsRef<str>>(names: &[S]) -> String {
    let mut hash = FNV_OFFSET;
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            hash ^= 0x1f;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        for byte in name.as_ref().bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    format!("{:016x}", hash)
}
