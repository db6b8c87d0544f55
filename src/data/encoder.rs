//! Categorical label encoding

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps each distinct categorical value in a column to a dense integer code.
///
/// Values are string-cast before fitting; nulls encode as the `"null"`
/// category. Codes are assigned in lexicographic order of the distinct
/// values, so the mapping is stable for a given column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelEncoder {
    mapping: BTreeMap<String, i64>,
    is_fitted: bool,
}

impl LabelEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the mapping over the string-cast values of a series.
    pub fn fit(&mut self, series: &Series) -> Result<&mut Self> {
        let ca = series
            .cast(&DataType::String)
            .map_err(|e| PipelineError::DataError(e.to_string()))?
            .str()
            .map_err(|e| PipelineError::DataError(e.to_string()))?
            .clone();

        let mut values: Vec<String> = ca
            .into_iter()
            .map(|opt| opt.map(|s| s.to_string()).unwrap_or_else(|| "null".to_string()))
            .collect();
        values.sort();
        values.dedup();

        self.mapping = values
            .into_iter()
            .enumerate()
            .map(|(code, value)| (value, code as i64))
            .collect();
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform a series into its integer codes. The output keeps the
    /// input's column name so it can replace the column in place.
    pub fn transform(&self, series: &Series) -> Result<Series> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let ca = series
            .cast(&DataType::String)
            .map_err(|e| PipelineError::DataError(e.to_string()))?
            .str()
            .map_err(|e| PipelineError::DataError(e.to_string()))?
            .clone();

        let codes: Vec<i64> = ca
            .into_iter()
            .map(|opt| {
                let key = opt.map(|s| s.to_string()).unwrap_or_else(|| "null".to_string());
                self.mapping.get(&key).copied().ok_or_else(|| {
                    PipelineError::DataError(format!("unseen category: {}", key))
                })
            })
            .collect::<Result<Vec<i64>>>()?;

        Ok(Series::new(series.name().clone(), codes))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, series: &Series) -> Result<Series> {
        self.fit(series)?;
        self.transform(series)
    }

    /// Recover the original value for a code
    pub fn inverse(&self, code: i64) -> Option<&str> {
        self.mapping
            .iter()
            .find(|(_, &c)| c == code)
            .map(|(value, _)| value.as_str())
    }

    /// Number of distinct categories seen during fit
    pub fn n_categories(&self) -> usize {
        self.mapping.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_dense_and_sorted() {
        let series = Series::new("c".into(), &["b", "a", "b", "c"]);
        let mut encoder = LabelEncoder::new();
        let codes = encoder.fit_transform(&series).unwrap();

        let ca = codes.i64().unwrap();
        let values: Vec<i64> = ca.into_iter().map(|v| v.unwrap()).collect();
        assert_eq!(values, vec![1, 0, 1, 2]);
        assert_eq!(encoder.n_categories(), 3);
    }

    #[test]
    fn test_nulls_become_their_own_category() {
        let series = Series::new("c".into(), &[Some("x"), None, Some("y")]);
        let mut encoder = LabelEncoder::new();
        let codes = encoder.fit_transform(&series).unwrap();

        assert_eq!(codes.null_count(), 0);
        assert_eq!(encoder.n_categories(), 3);
        assert!(encoder.inverse(0).is_some());
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let series = Series::new("c".into(), &["a"]);
        let encoder = LabelEncoder::new();
        assert!(encoder.transform(&series).is_err());
    }

    #[test]
    fn test_inverse_roundtrip() {
        let series = Series::new("c".into(), &["low", "high", "mid"]);
        let mut encoder = LabelEncoder::new();
        encoder.fit(&series).unwrap();

        for value in ["low", "high", "mid"] {
            let code = *encoder.mapping.get(value).unwrap();
            assert_eq!(encoder.inverse(code), Some(value));
        }
    }
}
