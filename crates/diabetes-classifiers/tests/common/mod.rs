#![allow(dead_code)]
use std::path::{Path, PathBuf};

use diabetes_classifiers::config::{ModelConfig, ModelType, TrainConfig};

pub const HEADER: [&str; 9] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DiabetesPedigreeFunction",
    "Age",
    "Outcome",
];

/// Deterministic noise in [0, 1).
fn noise(i: usize, k: usize) -> f32 {
    ((i * 7919 + k * 104_729) % 1000) as f32 / 1000.0
}

/// One balanced synthetic row per index; odd rows are diabetic.
pub fn synthetic_row(i: usize) -> Vec<String> {
    let label = (i % 2) as f32;
    vec![
        format!("{}", (i % 10) as f32 + 2.0 * label),
        format!("{:.0}", 95.0 + 45.0 * label + 40.0 * noise(i, 1) - 20.0),
        format!("{:.0}", 62.0 + 15.0 * noise(i, 2)),
        format!("{:.0}", 20.0 + 5.0 * label + 10.0 * noise(i, 3)),
        format!("{:.0}", 80.0 + 60.0 * label + 50.0 * noise(i, 4)),
        format!("{:.1}", 27.0 + 6.0 * label + 8.0 * noise(i, 5)),
        format!("{:.3}", 0.3 + 0.3 * label + 0.4 * noise(i, 6)),
        format!("{:.0}", 25.0 + 15.0 * label + 20.0 * noise(i, 7)),
        format!("{}", label as u8),
    ]
}

/// CSV text with `n` balanced rows, optionally renaming or dropping columns.
pub fn synthetic_csv(n: usize, rename: &[(&str, &str)], drop: &[&str]) -> String {
    let keep: Vec<usize> = (0..HEADER.len())
        .filter(|&c| !drop.contains(&HEADER[c]))
        .collect();
    let header: Vec<&str> = keep
        .iter()
        .map(|&c| {
            rename
                .iter()
                .find(|(from, _)| *from == HEADER[c])
                .map(|(_, to)| *to)
                .unwrap_or(HEADER[c])
        })
        .collect();

    let mut out = header.join(",");
    out.push('\n');
    for i in 0..n {
        let row = synthetic_row(i);
        let cells: Vec<&str> = keep.iter().map(|&c| row[c].as_str()).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn small_forest() -> ModelConfig {
    ModelConfig::new(ModelType::RandomForest {
        n_estimators: 25,
        max_depth: Some(8),
        min_samples_split: 2,
        min_samples_leaf: 1,
    })
}

/// Training config writing its artifacts under `dir/models`.
pub fn train_config(dir: &Path, data: &Path) -> TrainConfig {
    let _ = env_logger::builder().is_test(true).try_init();
    TrainConfig {
        data_path: data.to_path_buf(),
        model_dir: dir.join("models"),
        model: small_forest(),
        ..TrainConfig::default()
    }
}
