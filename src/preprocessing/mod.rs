//! Feature scaling for the working table

mod scaler;

pub use scaler::{ScaleMethod, Scaler};

use crate::error::Result;
use polars::prelude::*;

/// Numeric columns of the working table that are eligible for scaling: every
/// primitively numeric column except the last one, which is always the
/// target regardless of its dtype.
pub fn scalable_columns(df: &DataFrame) -> Vec<String> {
    let width = df.width();
    df.get_columns()
        .iter()
        .take(width.saturating_sub(1))
        .filter(|col| col.dtype().is_primitive_numeric())
        .map(|col| col.name().to_string())
        .collect()
}

/// Fit the chosen scaler on the eligible columns and overwrite them in
/// place. Returns the transformed frame and the scaled column names; an
/// empty list means there was nothing to scale.
pub fn scale_features(df: &DataFrame, method: ScaleMethod) -> Result<(DataFrame, Vec<String>)> {
    let columns = scalable_columns(df);
    if columns.is_empty() {
        return Ok((df.clone(), columns));
    }

    let names: Vec<&str> = columns.iter().map(|s| s.as_str()).collect();
    let mut scaler = Scaler::new(method);
    let scaled = scaler.fit_transform(df, &names)?;
    Ok((scaled, columns))
}
