//! HTML training report.
pub mod plots;
pub mod report;

pub use report::training_report;
