//! Feature scaling implementations

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The two supported scaling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleMethod {
    /// Standardization (z-score): (x - mean) / std
    Standard,
    /// Min-Max normalization into [0, 1]: (x - min) / (max - min)
    MinMax,
}

impl ScaleMethod {
    /// Parse a client-supplied method name. Anything outside the closed set
    /// is rejected at the boundary.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "standard" => Some(ScaleMethod::Standard),
            "minmax" => Some(ScaleMethod::MinMax),
            _ => None,
        }
    }
}

/// Parameters for a fitted column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    center: f64, // mean or min
    scale: f64,  // std or range
}

/// Feature scaler fitted per column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    method: ScaleMethod,
    params: HashMap<String, ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    pub fn new(method: ScaleMethod) -> Self {
        Self {
            method,
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the named columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| PipelineError::ColumnNotFound(col_name.to_string()))?;
            let series = column.as_materialized_series();

            let params = self.compute_params(series)?;
            self.params.insert(col_name.to_string(), params);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data, overwriting each fitted column in place.
    /// Builds all replacement columns first, then applies them in one pass.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .filter_map(|(col_name, params)| {
                df.column(col_name).ok().map(|column| {
                    let series = column.as_materialized_series();
                    self.scale_series(series, params)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result
                .with_column(scaled)
                .map_err(|e| PipelineError::DataError(e.to_string()))?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    fn compute_params(&self, series: &Series) -> Result<ScalerParams> {
        let ca = series
            .cast(&DataType::Float64)
            .map_err(|e| PipelineError::DataError(e.to_string()))?
            .f64()
            .map_err(|e| PipelineError::DataError(e.to_string()))?
            .clone();

        match self.method {
            ScaleMethod::Standard => {
                let mean = ca.mean().unwrap_or(0.0);
                let std = ca.std(0).unwrap_or(1.0);
                Ok(ScalerParams {
                    center: mean,
                    scale: if std == 0.0 { 1.0 } else { std },
                })
            }
            ScaleMethod::MinMax => {
                let min = ca.min().unwrap_or(0.0);
                let max = ca.max().unwrap_or(1.0);
                let range = max - min;
                Ok(ScalerParams {
                    center: min,
                    scale: if range == 0.0 { 1.0 } else { range },
                })
            }
        }
    }

    fn scale_series(&self, series: &Series, params: &ScalerParams) -> Result<Series> {
        let ca = series
            .cast(&DataType::Float64)
            .map_err(|e| PipelineError::DataError(e.to_string()))?
            .f64()
            .map_err(|e| PipelineError::DataError(e.to_string()))?
            .clone();

        let scaled: Float64Chunked = ca
            .into_iter()
            .map(|opt| opt.map(|v| (v - params.center) / params.scale))
            .collect();

        Ok(scaled.with_name(series.name().clone()).into_series())
    }
}
