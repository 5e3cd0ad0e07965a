//! Small dense containers used throughout the crate.
//!
//! `Array2` stores row-major samples × features, `Array1` holds labels and
//! per-row scores. Both stay dependency-free so the scaler, the models and the
//! metrics can share them without pulling a linear-algebra crate.
pub mod matrix;
pub mod vector;

pub use matrix::{Array2, ShapeError};
pub use vector::Array1;
