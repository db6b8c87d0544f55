//! Logistic regression, binary and one-vs-rest multiclass

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Logistic regression classifier trained by gradient descent.
///
/// Binary problems fit a single set of weights; problems with more than two
/// classes fit one binary model per class (one-vs-rest) and predict the
/// class with the highest score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// One weight vector per class for multiclass, a single entry for binary
    weights: Vec<Array1<f64>>,
    /// One bias per weight vector
    biases: Vec<f64>,
    /// Distinct class labels in ascending order
    classes: Vec<f64>,
    /// L2 regularization strength
    pub alpha: f64,
    /// Maximum gradient-descent iterations
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    /// Learning rate
    pub learning_rate: f64,
    /// Whether model is fitted
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            weights: Vec::new(),
            biases: Vec::new(),
            classes: Vec::new(),
            alpha: 0.01,
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.1,
            is_fitted: false,
        }
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set learning rate
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Fit one binary weight vector: targets are 1.0 for the positive class
    /// and 0.0 otherwise.
    fn fit_binary(&self, x: &Array2<f64>, y: &Array1<f64>) -> (Array1<f64>, f64) {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        let mut weights = Array1::zeros(n_features);
        let mut bias = 0.0;

        let lr = self.learning_rate;
        let alpha = self.alpha;

        for _iter in 0..self.max_iter {
            let linear = x.dot(&weights) + bias;
            let predictions = Self::sigmoid(&linear);

            let errors = &predictions - y;
            let dw = (x.t().dot(&errors) / n_samples as f64) + (alpha * &weights);
            let db = errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - lr * dw;
            bias -= lr * db;
        }

        (weights, bias)
    }

    /// Fit the model to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(PipelineError::ValidationError(
                "cannot fit on an empty training set".to_string(),
            ));
        }

        let mut classes: Vec<f64> = y.iter().copied().collect();
        classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        classes.dedup();

        if classes.len() < 2 {
            return Err(PipelineError::ValidationError(
                "training target has a single class".to_string(),
            ));
        }

        self.weights.clear();
        self.biases.clear();

        if classes.len() == 2 {
            // Binary: positive class is the larger label
            let positive = classes[1];
            let targets = y.mapv(|v| if v == positive { 1.0 } else { 0.0 });
            let (w, b) = self.fit_binary(x, &targets);
            self.weights.push(w);
            self.biases.push(b);
        } else {
            // One-vs-rest
            for &class in &classes {
                let targets = y.mapv(|v| if v == class { 1.0 } else { 0.0 });
                let (w, b) = self.fit_binary(x, &targets);
                self.weights.push(w);
                self.biases.push(b);
            }
        }

        self.classes = classes;
        self.is_fitted = true;
        Ok(self)
    }

    /// Per-class scores: a single positive-class probability column for
    /// binary, one column per class for multiclass.
    fn decision_scores(&self, x: &Array2<f64>) -> Result<Vec<Array1<f64>>> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        Ok(self
            .weights
            .iter()
            .zip(self.biases.iter())
            .map(|(w, &b)| Self::sigmoid(&(x.dot(w) + b)))
            .collect())
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scores = self.decision_scores(x)?;

        if self.classes.len() == 2 {
            let positive = self.classes[1];
            let negative = self.classes[0];
            Ok(scores[0].mapv(|p| if p >= 0.5 { positive } else { negative }))
        } else {
            let n = x.nrows();
            let predictions: Vec<f64> = (0..n)
                .map(|i| {
                    let best = scores
                        .iter()
                        .enumerate()
                        .max_by(|(_, a), (_, b)| {
                            a[i].partial_cmp(&b[i]).unwrap_or(std::cmp::Ordering::Equal)
                        })
                        .map(|(idx, _)| idx)
                        .unwrap_or(0);
                    self.classes[best]
                })
                .collect();
            Ok(Array1::from_vec(predictions))
        }
    }

    /// Get accuracy score
    pub fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let y_pred = self.predict(x)?;
        let correct = y_pred
            .iter()
            .zip(y.iter())
            .filter(|(pred, actual)| pred.to_bits() == actual.to_bits())
            .count();
        Ok(correct as f64 / y.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_binary_separable() {
        let x = array![
            [0.0, 0.1],
            [0.2, 0.0],
            [0.1, 0.2],
            [2.0, 2.1],
            [2.2, 1.9],
            [1.9, 2.0],
        ];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        let mut model = LogisticRegression::new().with_max_iter(2000);
        model.fit(&x, &y).unwrap();

        let accuracy = model.score(&x, &y).unwrap();
        assert!(accuracy > 0.9, "accuracy too low: {}", accuracy);
    }

    #[test]
    fn test_binary_preserves_original_labels() {
        // Labels 1/2 rather than 0/1 — predictions must use the same values
        let x = array![[0.0], [0.1], [5.0], [5.1]];
        let y = array![1.0, 1.0, 2.0, 2.0];

        let mut model = LogisticRegression::new().with_max_iter(2000);
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        for p in preds.iter() {
            assert!(*p == 1.0 || *p == 2.0);
        }
    }

    #[test]
    fn test_multiclass_one_vs_rest() {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [5.0, 0.0],
            [5.1, 0.1],
            [0.0, 5.0],
            [0.1, 5.1],
        ];
        let y = array![0.0, 0.0, 1.0, 1.0, 2.0, 2.0];

        let mut model = LogisticRegression::new().with_max_iter(2000);
        model.fit(&x, &y).unwrap();

        let accuracy = model.score(&x, &y).unwrap();
        assert!(accuracy > 0.8, "accuracy too low: {}", accuracy);
    }

    #[test]
    fn test_single_class_target_rejected() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0, 1.0];

        let mut model = LogisticRegression::new();
        assert!(model.fit(&x, &y).is_err());
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = LogisticRegression::new();
        let x = array![[1.0, 2.0]];
        assert!(model.predict(&x).is_err());
    }
}
