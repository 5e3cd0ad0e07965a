pub mod input;

use anyhow::Result;

use diabetes_classifiers::inference::{predictor, Prediction};

use crate::predict::input::PredictArgs;

/// Score the form input against the persisted artifacts and print the risk
/// message.
pub fn run_prediction(args: &PredictArgs) -> Result<Prediction> {
    let predictor = predictor(&args.config.artifact_paths(), (&args.config).into())?;
    let prediction = predictor.predict(&args.values)?;
    log::debug!(
        "{} predicted label {} with p = {:.4}",
        predictor.model_name(),
        prediction.label,
        prediction.probability
    );
    println!("{}", prediction);
    Ok(prediction)
}
