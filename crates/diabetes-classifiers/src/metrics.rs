//! Held-out evaluation metrics for the binary classifier.
//!
//! Accuracy, ROC-AUC (Mann-Whitney with averaged tie ranks), a 2×2 confusion
//! matrix and an sklearn-style per-class precision/recall/F1 report.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fraction of matching labels. Returns 0 for empty input.
pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len(), "labels and predictions must have equal lengths");
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Area under the ROC curve for class-1 `scores`.
///
/// `None` when only one class is present, the curve is undefined there.
pub fn roc_auc(y_true: &[u8], scores: &[f32]) -> Option<f64> {
    assert_eq!(y_true.len(), scores.len(), "labels and scores must have equal lengths");
    let n = y_true.len();
    let n_pos = y_true.iter().filter(|&&t| t == 1).count() as f64;
    let n_neg = n as f64 - n_pos;
    if n_pos == 0.0 || n_neg == 0.0 {
        return None;
    }

    let mut idx: Vec<usize> = (0..n).collect();
    idx.sort_by(|&i, &j| scores[i].total_cmp(&scores[j]));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && scores[idx[j]] == scores[idx[i]] {
            j += 1;
        }
        let avg_rank = (i + j - 1) as f64 / 2.0 + 1.0;
        for k in i..j {
            ranks[idx[k]] = avg_rank;
        }
        i = j;
    }

    let sum_ranks_pos: f64 = (0..n).filter(|&i| y_true[i] == 1).map(|i| ranks[i]).sum();
    Some((sum_ranks_pos - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

/// ROC curve points `(false positive rate, true positive rate)`, one per
/// distinct score threshold, from (0, 0) to (1, 1).
pub fn roc_curve(y_true: &[u8], scores: &[f32]) -> Vec<(f64, f64)> {
    assert_eq!(y_true.len(), scores.len(), "labels and scores must have equal lengths");
    let n_pos = y_true.iter().filter(|&&t| t == 1).count() as f64;
    let n_neg = y_true.len() as f64 - n_pos;
    if n_pos == 0.0 || n_neg == 0.0 {
        return Vec::new();
    }

    let mut idx: Vec<usize> = (0..y_true.len()).collect();
    idx.sort_by(|&i, &j| scores[j].total_cmp(&scores[i]));

    let mut points = vec![(0.0, 0.0)];
    let (mut tp, mut fp) = (0.0, 0.0);
    for (pos, &i) in idx.iter().enumerate() {
        if y_true[i] == 1 {
            tp += 1.0;
        } else {
            fp += 1.0;
        }
        let last_of_threshold = idx
            .get(pos + 1)
            .map_or(true, |&next| scores[next] != scores[i]);
        if last_of_threshold {
            points.push((fp / n_neg, tp / n_pos));
        }
    }
    points
}

/// Binary confusion matrix, `counts[true][predicted]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Self {
        assert_eq!(y_true.len(), y_pred.len(), "labels and predictions must have equal lengths");
        let mut counts = [[0usize; 2]; 2];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            counts[t.min(1) as usize][p.min(1) as usize] += 1;
        }
        ConfusionMatrix { counts }
    }

    pub fn get(&self, true_label: usize, predicted: usize) -> usize {
        self.counts[true_label][predicted]
    }

    pub fn true_positives(&self, class: usize) -> usize {
        self.counts[class][class]
    }

    pub fn false_positives(&self, class: usize) -> usize {
        self.counts[1 - class][class]
    }

    pub fn false_negatives(&self, class: usize) -> usize {
        self.counts[class][1 - class]
    }

    pub fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    pub fn total(&self) -> usize {
        self.support(0) + self.support(1)
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>8} {:>7} {:>7}", "", "Pred 0", "Pred 1")?;
        for t in 0..2 {
            writeln!(
                f,
                "{:>8} {:>7} {:>7}",
                format!("True {}", t),
                self.counts[t][0],
                self.counts[t][1]
            )?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision/recall/F1 with macro and weighted averages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
}

impl ClassificationReport {
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let class = |c: usize| {
            let tp = cm.true_positives(c) as f64;
            let fp = cm.false_positives(c) as f64;
            let fn_ = cm.false_negatives(c) as f64;
            let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
            let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                precision,
                recall,
                f1,
                support: cm.support(c),
            }
        };
        let total = cm.total();
        let accuracy = if total == 0 {
            0.0
        } else {
            (cm.true_positives(0) + cm.true_positives(1)) as f64 / total as f64
        };
        ClassificationReport {
            classes: [class(0), class(1)],
            accuracy,
        }
    }

    pub fn total_support(&self) -> usize {
        self.classes.iter().map(|c| c.support).sum()
    }

    /// Unweighted mean of (precision, recall, f1) over the classes.
    pub fn macro_avg(&self) -> (f64, f64, f64) {
        let n = self.classes.len() as f64;
        let sum = |f: fn(&ClassMetrics) -> f64| self.classes.iter().map(f).sum::<f64>() / n;
        (sum(|c| c.precision), sum(|c| c.recall), sum(|c| c.f1))
    }

    /// Support-weighted mean of (precision, recall, f1).
    pub fn weighted_avg(&self) -> (f64, f64, f64) {
        let total = self.total_support() as f64;
        if total == 0.0 {
            return (0.0, 0.0, 0.0);
        }
        let sum = |f: fn(&ClassMetrics) -> f64| {
            self.classes
                .iter()
                .map(|c| f(c) * c.support as f64)
                .sum::<f64>()
                / total
        };
        (sum(|c| c.precision), sum(|c| c.recall), sum(|c| c.f1))
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (label, c) in self.classes.iter().enumerate() {
            writeln!(
                f,
                "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        let total = self.total_support();
        writeln!(
            f,
            "{:>12} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, total
        )?;
        let (p, r, f1) = self.macro_avg();
        writeln!(
            f,
            "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
            "macro avg", p, r, f1, total
        )?;
        let (p, r, f1) = self.weighted_avg();
        writeln!(
            f,
            "{:>12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
            "weighted avg", p, r, f1, total
        )
    }
}

/// Everything the training run reports on the held-out partition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub roc_auc: Option<f64>,
    pub report: ClassificationReport,
    pub confusion: ConfusionMatrix,
    pub roc_curve: Vec<(f64, f64)>,
}

impl EvaluationMetrics {
    pub fn evaluate(y_true: &[u8], y_pred: &[u8], scores: &[f32]) -> Self {
        let confusion = ConfusionMatrix::from_predictions(y_true, y_pred);
        EvaluationMetrics {
            accuracy: accuracy(y_true, y_pred),
            roc_auc: roc_auc(y_true, scores),
            report: ClassificationReport::from_confusion(&confusion),
            confusion,
            roc_curve: roc_curve(y_true, scores),
        }
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        match self.roc_auc {
            Some(auc) => writeln!(f, "ROC AUC: {:.4}", auc)?,
            None => writeln!(f, "ROC AUC: undefined (single class in test set)")?,
        }
        writeln!(f)?;
        write!(f, "{}", self.report)?;
        writeln!(f)?;
        writeln!(f, "Confusion matrix:")?;
        write!(f, "{}", self.confusion)
    }
}
