use anyhow::Result;
use std::fmt::Write;
use std::path::Path;

use diabetes_classifiers::schema::{feature_order, fingerprint, FEATURES, SAMPLE_INPUTS};

pub fn validate_tsv_or_csv_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let pb = path.as_ref();

    let ext = pb
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    match ext.as_deref() {
        Some("tsv") | Some("csv") => {}
        _ => anyhow::bail!("File must have a .tsv or .csv extension: {}", pb.display()),
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", pb.display());
    }

    Ok(())
}

/// Column headers for the sample table, in `FEATURES` order.
const SAMPLE_HEADERS: [&str; 8] = ["Preg", "Glucose", "BP", "Skin", "Insulin", "BMI", "DPF", "Age"];

/// Plain-text table of the feature schema, its input bounds, a few sample
/// inputs and the fingerprint stored in artifacts.
pub fn render_schema() -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<26} {:>8} {:>8} {:>8}  {}",
        "feature", "min", "max", "default", "description"
    );
    for f in FEATURES.iter() {
        let _ = writeln!(
            out,
            "{:<26} {:>8} {:>8} {:>8}  {}",
            f.name, f.min, f.max, f.default, f.description
        );
    }

    let _ = writeln!(out, "\nSample inputs:");
    for header in SAMPLE_HEADERS.iter() {
        let _ = write!(out, "{:>8}", header);
    }
    let _ = writeln!(out);
    for row in SAMPLE_INPUTS.iter() {
        for value in row.iter() {
            let _ = write!(out, "{:>8}", value);
        }
        let _ = writeln!(out);
    }

    let _ = write!(out, "\nSchema fingerprint: {}", fingerprint(&feature_order()));
    out
}
