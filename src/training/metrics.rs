//! Classifier evaluation metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Accuracy and per-class report from the most recent training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    /// Fraction of correct predictions on the test partition
    pub accuracy: f64,
    /// Per-class precision/recall/F1/support plus macro and weighted
    /// averages, shaped like a standard classification report
    pub report: serde_json::Value,
}

impl EvalReport {
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        Self {
            accuracy: accuracy_score(y_true, y_pred),
            report: classification_report(y_true, y_pred),
        }
    }
}

/// Fraction of exactly-matching predictions
pub fn accuracy_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t.to_bits() == p.to_bits())
        .count();
    correct as f64 / y_true.len() as f64
}

/// Distinct labels present in either vector, ascending
fn class_labels(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Vec<f64> {
    let mut labels: Vec<f64> = y_true.iter().chain(y_pred.iter()).copied().collect();
    labels.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    labels.dedup();
    labels
}

/// Integer-coded labels render without a fractional part, mirroring how
/// encoded class labels read in the report keys ("0", "1", ...).
fn format_label(label: f64) -> String {
    if label.fract() == 0.0 {
        format!("{}", label as i64)
    } else {
        label.to_string()
    }
}

/// Predicted-vs-actual counts. Returns the label order and the matrix;
/// `matrix[actual][predicted]`.
pub fn confusion_matrix(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> (Vec<f64>, Vec<Vec<u64>>) {
    let labels = class_labels(y_true, y_pred);
    // Labels are compared bit-exactly; class values close together must not
    // collapse into one bucket
    let index = |v: f64| {
        labels
            .iter()
            .position(|&l| l.to_bits() == v.to_bits())
            .unwrap_or(0)
    };

    let n = labels.len();
    let mut matrix = vec![vec![0u64; n]; n];
    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        matrix[index(*t)][index(*p)] += 1;
    }

    (labels, matrix)
}

/// Per-class precision, recall, F1 and support, plus `accuracy`,
/// `macro avg` and `weighted avg` entries, in the shape of the standard
/// dict-style classification report.
pub fn classification_report(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> serde_json::Value {
    let (labels, matrix) = confusion_matrix(y_true, y_pred);
    let n = labels.len();
    let total: u64 = matrix.iter().flatten().sum();

    let mut report = serde_json::Map::new();
    let mut macro_p = 0.0;
    let mut macro_r = 0.0;
    let mut macro_f = 0.0;
    let mut weighted_p = 0.0;
    let mut weighted_r = 0.0;
    let mut weighted_f = 0.0;

    for (i, &label) in labels.iter().enumerate() {
        let tp = matrix[i][i] as f64;
        let support: u64 = matrix[i].iter().sum();
        let predicted: u64 = (0..n).map(|r| matrix[r][i]).sum();

        let precision = if predicted > 0 { tp / predicted as f64 } else { 0.0 };
        let recall = if support > 0 { tp / support as f64 } else { 0.0 };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        macro_p += precision;
        macro_r += recall;
        macro_f += f1;
        let weight = support as f64 / total.max(1) as f64;
        weighted_p += precision * weight;
        weighted_r += recall * weight;
        weighted_f += f1 * weight;

        report.insert(
            format_label(label),
            json!({
                "precision": precision,
                "recall": recall,
                "f1-score": f1,
                "support": support,
            }),
        );
    }

    let n_f = n.max(1) as f64;
    report.insert("accuracy".to_string(), json!(accuracy_score(y_true, y_pred)));
    report.insert(
        "macro avg".to_string(),
        json!({
            "precision": macro_p / n_f,
            "recall": macro_r / n_f,
            "f1-score": macro_f / n_f,
            "support": total,
        }),
    );
    report.insert(
        "weighted avg".to_string(),
        json!({
            "precision": weighted_p,
            "recall": weighted_r,
            "f1-score": weighted_f,
            "support": total,
        }),
    );

    serde_json::Value::Object(report)
}
