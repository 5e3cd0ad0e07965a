pub mod classifier_trait;
pub mod factory;
pub mod gbdt;
pub mod random_forest;

pub use classifier_trait::{ClassifierModel, ModelState};
pub use factory::build_model;

/// Probability at or above which a row is labelled 1.
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Label a class-1 probability with [`DECISION_THRESHOLD`].
pub fn label_for(probability: f32) -> u8 {
    u8::from(probability >= DECISION_THRESHOLD)
}
