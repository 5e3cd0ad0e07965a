use plotly::common::{DashType, Line, Mode};
use plotly::layout::{Axis, BarMode, Layout};
use plotly::{Histogram, Plot, Scatter};

/// ROC curve of the held-out partition with the chance diagonal.
pub fn plot_roc_curve(curve: &[(f64, f64)], auc: Option<f64>, title: &str) -> Plot {
    let (fpr, tpr): (Vec<f64>, Vec<f64>) = curve.iter().copied().unzip();
    let name = match auc {
        Some(auc) => format!("ROC (AUC = {:.3})", auc),
        None => "ROC".to_string(),
    };

    let roc = Scatter::new(fpr, tpr).mode(Mode::Lines).name(&name);
    let chance = Scatter::new(vec![0.0, 1.0], vec![0.0, 1.0])
        .mode(Mode::Lines)
        .name("Chance")
        .line(Line::new().color("grey").dash(DashType::Dash));

    let mut plot = Plot::new();
    plot.add_trace(roc);
    plot.add_trace(chance);
    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("False positive rate"))
            .y_axis(Axis::new().title("True positive rate")),
    );
    plot
}

/// Overlaid histograms of predicted probabilities split by true label.
pub fn plot_probability_histogram(probabilities: &[f32], labels: &[u8], title: &str) -> Plot {
    assert_eq!(
        probabilities.len(),
        labels.len(),
        "probabilities and labels must have the same length"
    );

    let (positives, negatives): (Vec<(f32, u8)>, Vec<(f32, u8)>) = probabilities
        .iter()
        .copied()
        .zip(labels.iter().copied())
        .partition(|(_, label)| *label == 1);

    let trace_pos = Histogram::new(positives.into_iter().map(|(p, _)| p).collect())
        .name("Diabetes")
        .opacity(0.6);
    let trace_neg = Histogram::new(negatives.into_iter().map(|(p, _)| p).collect())
        .name("No diabetes")
        .opacity(0.6);

    let mut plot = Plot::new();
    plot.add_trace(trace_neg);
    plot.add_trace(trace_pos);
    plot.set_layout(
        Layout::new()
            .title(title)
            .bar_mode(BarMode::Overlay)
            .x_axis(Axis::new().title("Predicted probability"))
            .y_axis(Axis::new().title("Count")),
    );
    plot
}
