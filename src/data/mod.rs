//! Data ingestion module
//!
//! Parses uploaded CSV/Excel files into Polars DataFrames and prepares the
//! working table: drops configured denylist columns and label-encodes every
//! non-numeric column to dense integer codes.

mod encoder;
mod loader;

pub use encoder::LabelEncoder;
pub use loader::{parse_table, records_preview, TableFormat};

use crate::error::Result;
use polars::prelude::*;
use std::collections::HashMap;

/// Build the working table from a freshly ingested frame: drop denylist
/// columns if present, then replace each string column with its integer
/// codes. Returns the encoded frame and the per-column encoders.
pub fn encode_categoricals(
    df: &DataFrame,
    drop_columns: &[String],
) -> Result<(DataFrame, HashMap<String, LabelEncoder>)> {
    let mut working = df.clone();

    for name in drop_columns {
        if working.get_column_names().iter().any(|c| c.as_str() == name) {
            working = working.drop(name)?;
        }
    }

    let categorical: Vec<String> = working
        .get_columns()
        .iter()
        .filter(|col| col.dtype() == &DataType::String)
        .map(|col| col.name().to_string())
        .collect();

    let mut encoders = HashMap::new();
    for name in &categorical {
        let series = working.column(name)?.as_materialized_series().clone();
        let mut encoder = LabelEncoder::new();
        let codes = encoder.fit_transform(&series)?;
        working.with_column(codes)?;
        encoders.insert(name.clone(), encoder);
    }

    Ok((working, encoders))
}

/// Keep only rows with no missing value in any column.
pub fn drop_incomplete_rows(df: &DataFrame) -> Result<DataFrame> {
    let mut mask = BooleanChunked::full("complete".into(), true, df.height());
    for col in df.get_columns() {
        mask = &mask & &col.as_materialized_series().is_not_null();
    }
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        DataFrame::new(vec![
            Series::new("Name".into(), &["a", "b", "c"]).into(),
            Series::new("color".into(), &["red", "blue", "red"]).into(),
            Series::new("value".into(), &[1.0, 2.0, 3.0]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_denylist_column_dropped() {
        let (working, _) = encode_categoricals(&sample_df(), &["Name".to_string()]).unwrap();
        assert_eq!(working.width(), 2);
        assert!(!working.get_column_names().iter().any(|c| c.as_str() == "Name"));
    }

    #[test]
    fn test_categoricals_become_integer_codes() {
        let (working, encoders) =
            encode_categoricals(&sample_df(), &["Name".to_string()]).unwrap();

        let color = working.column("color").unwrap();
        assert!(color.dtype().is_primitive_numeric());
        assert!(encoders.contains_key("color"));
        // Numeric column untouched, no encoder fitted for it
        assert!(!encoders.contains_key("value"));
        assert_eq!(encoders.len(), 1);
    }

    #[test]
    fn test_incomplete_rows_are_dropped() {
        let df = DataFrame::new(vec![
            Series::new("a".into(), &[Some(1.0), None, Some(3.0)]).into(),
            Series::new("b".into(), &[Some(1i64), Some(2), None]).into(),
        ])
        .unwrap();

        let clean = drop_incomplete_rows(&df).unwrap();
        assert_eq!(clean.height(), 1);
    }

    #[test]
    fn test_missing_denylist_entry_is_ignored() {
        let (working, _) = encode_categoricals(&sample_df(), &["Cabin".to_string()]).unwrap();
        assert_eq!(working.width(), 3);
    }
}
