//! Model training module
//!
//! Provides the two supported classifiers (logistic regression and a Gini
//! decision tree), the seeded train/test splitter, and evaluation metrics.

mod decision_tree;
mod linear_models;
mod metrics;
mod split;

pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use linear_models::LogisticRegression;
pub use metrics::{accuracy_score, classification_report, confusion_matrix, EvalReport};
pub use split::{train_test_split, TrainTestSplit};

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// The two supported model choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    Logistic,
    Tree,
}

impl ModelKind {
    /// Parse a client-supplied model name: case-insensitive, trimmed,
    /// closed set.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "logistic" => Some(ModelKind::Logistic),
            "tree" => Some(ModelKind::Tree),
            _ => None,
        }
    }
}

/// A trained classifier held in the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FittedModel {
    Logistic(LogisticRegression),
    Tree(DecisionTree),
}

impl FittedModel {
    /// Fit the chosen model kind on the training partition
    pub fn fit(kind: ModelKind, x: &Array2<f64>, y: &Array1<f64>) -> Result<Self> {
        match kind {
            ModelKind::Logistic => {
                let mut model = LogisticRegression::new().with_max_iter(2000);
                model.fit(x, y)?;
                Ok(FittedModel::Logistic(model))
            }
            ModelKind::Tree => {
                let mut model = DecisionTree::new_classifier();
                model.fit(x, y)?;
                Ok(FittedModel::Tree(model))
            }
        }
    }

    /// Predict class labels
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            FittedModel::Logistic(model) => model.predict(x),
            FittedModel::Tree(model) => model.predict(x),
        }
    }
}

/// Extract named columns from a DataFrame into a row-major `Array2<f64>`.
pub fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let series = df
                .column(col_name)
                .map_err(|_| PipelineError::ColumnNotFound(col_name.clone()))?;
            let series_f64 = series
                .cast(&DataType::Float64)
                .map_err(|e| PipelineError::DataError(e.to_string()))?;
            let values: Vec<f64> = series_f64
                .f64()
                .map_err(|e| PipelineError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}

/// Split a working table into a feature matrix and a target vector. The last
/// column is always the target, by position.
pub fn features_and_target(df: &DataFrame) -> Result<(Array2<f64>, Array1<f64>)> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let (target_name, feature_names) = names
        .split_last()
        .ok_or_else(|| PipelineError::DataError("table has no columns".to_string()))?;

    let x = columns_to_array2(df, feature_names)?;

    let y: Array1<f64> = df
        .column(target_name)
        .map_err(|_| PipelineError::ColumnNotFound(target_name.clone()))?
        .cast(&DataType::Float64)
        .map_err(|e| PipelineError::DataError(e.to_string()))?
        .f64()
        .map_err(|e| PipelineError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();

    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!(ModelKind::parse("logistic"), Some(ModelKind::Logistic));
        assert_eq!(ModelKind::parse("  TREE "), Some(ModelKind::Tree));
        assert_eq!(ModelKind::parse("svm"), None);
    }

    #[test]
    fn test_features_and_target_uses_last_column() {
        let df = DataFrame::new(vec![
            Series::new("f1".into(), &[1.0, 2.0]).into(),
            Series::new("f2".into(), &[3.0, 4.0]).into(),
            Series::new("y".into(), &[0i64, 1]).into(),
        ])
        .unwrap();

        let (x, y) = features_and_target(&df).unwrap();
        assert_eq!(x.shape(), &[2, 2]);
        assert_eq!(y.to_vec(), vec![0.0, 1.0]);
        assert_eq!(x[[1, 1]], 4.0);
    }
}
