//! diabetes-classifiers: predictive-health classification of diabetes risk.
//!
//! The crate loads a tabular dataset, fits a standard scaler and a binary
//! classifier (random forest or GBDT) on a fixed feature schema, evaluates
//! on a stratified hold-out split and persists both as JSON artifacts.
//! [`inference::Predictor`] reloads the pair and scores one input row at a
//! time.
pub mod artifacts;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod inference;
pub mod io;
pub mod math;
pub mod metrics;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod schema;
pub mod training;
