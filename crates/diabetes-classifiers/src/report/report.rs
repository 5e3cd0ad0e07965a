use anyhow::Result;
use maud::{html, PreEscaped, DOCTYPE};

use crate::config::TrainConfig;
use crate::report::plots::{plot_probability_histogram, plot_roc_curve};
use crate::training::TrainingOutcome;

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

const STYLE: &str = "
body { font-family: sans-serif; margin: 2rem auto; max-width: 960px; }
table { border-collapse: collapse; margin-bottom: 1rem; }
th, td { border: 1px solid #ccc; padding: 4px 10px; text-align: right; }
th { background-color: #1E3A8A; color: white; }
.code-container { background-color: #f5f5f5; padding: 10px; border-radius: 5px;
  overflow-x: auto; font-family: monospace; white-space: pre-wrap; }
";

/// Render the training report as a standalone HTML page.
pub fn training_report(outcome: &TrainingOutcome, config: &TrainConfig) -> Result<String> {
    let metrics = &outcome.metrics;
    let roc = plot_roc_curve(&metrics.roc_curve, metrics.roc_auc, "ROC curve (held-out set)")
        .to_inline_html(Some("roc-curve"));
    let histogram = plot_probability_histogram(
        &outcome.test_probabilities,
        &outcome.test_labels,
        "Predicted probability by true label",
    )
    .to_inline_html(Some("probability-histogram"));
    let config_json = serde_json::to_string_pretty(config)?;
    let (macro_p, macro_r, macro_f1) = metrics.report.macro_avg();
    let (weighted_p, weighted_r, weighted_f1) = metrics.report.weighted_avg();

    let markup = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Diabetes classifier training report" }
                script src=(PLOTLY_JS) {}
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { "Diabetes classifier training report" }
                p {
                    "Generated " (chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
                    " | model " (outcome.model.name())
                    " | target '" (outcome.target_column) "'"
                    " | " (outcome.n_train) " train / " (outcome.n_test) " test rows"
                }
                @if !outcome.missing_features.is_empty() {
                    p {
                        strong { "Missing schema features: " }
                        (outcome.missing_features.join(", "))
                    }
                }

                h2 { "Held-out metrics" }
                table {
                    tr { th { "Accuracy" } td { (format!("{:.4}", metrics.accuracy)) } }
                    tr {
                        th { "ROC AUC" }
                        td {
                            @match metrics.roc_auc {
                                Some(auc) => { (format!("{:.4}", auc)) }
                                None => { "undefined" }
                            }
                        }
                    }
                }

                h2 { "Classification report" }
                table {
                    tr {
                        th { "" } th { "precision" } th { "recall" } th { "f1-score" }
                        th { "support" }
                    }
                    @for (label, c) in metrics.report.classes.iter().enumerate() {
                        tr {
                            th { (label) }
                            td { (format!("{:.2}", c.precision)) }
                            td { (format!("{:.2}", c.recall)) }
                            td { (format!("{:.2}", c.f1)) }
                            td { (c.support) }
                        }
                    }
                    tr {
                        th { "macro avg" }
                        td { (format!("{:.2}", macro_p)) }
                        td { (format!("{:.2}", macro_r)) }
                        td { (format!("{:.2}", macro_f1)) }
                        td { (metrics.report.total_support()) }
                    }
                    tr {
                        th { "weighted avg" }
                        td { (format!("{:.2}", weighted_p)) }
                        td { (format!("{:.2}", weighted_r)) }
                        td { (format!("{:.2}", weighted_f1)) }
                        td { (metrics.report.total_support()) }
                    }
                }

                h2 { "Confusion matrix" }
                table {
                    tr { th { "" } th { "Pred 0" } th { "Pred 1" } }
                    @for t in 0..2 {
                        tr {
                            th { "True " (t) }
                            td { (metrics.confusion.get(t, 0)) }
                            td { (metrics.confusion.get(t, 1)) }
                        }
                    }
                }

                h2 { "ROC curve" }
                (PreEscaped(roc))
                (PreEscaped(histogram))

                h2 { "Configuration" }
                div class="code-container" {
                    pre { code { (config_json) } }
                }
            }
        }
    };

    Ok(markup.into_string())
}
