//! Uploaded-file parsing: CSV via Polars, Excel via calamine

use crate::error::{PipelineError, Result};
use calamine::{Data, Reader, Xls, Xlsx};
use polars::prelude::*;
use std::io::Cursor;

/// Accepted upload formats, detected from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Excel,
}

impl TableFormat {
    /// Detect the format from a filename. Only the delimited-text and
    /// spreadsheet families are accepted.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".csv") {
            Some(TableFormat::Csv)
        } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            Some(TableFormat::Excel)
        } else {
            None
        }
    }
}

/// Parse uploaded bytes into a DataFrame, dispatching on the file extension.
pub fn parse_table(filename: &str, data: &[u8]) -> Result<DataFrame> {
    match TableFormat::from_filename(filename) {
        Some(TableFormat::Csv) => read_csv(data),
        Some(TableFormat::Excel) => read_excel(filename, data),
        None => Err(PipelineError::UnsupportedFormat(
            "Only CSV, XLS, XLSX allowed".to_string(),
        )),
    }
}

fn read_csv(data: &[u8]) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(1000))
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(data))
        .finish()?;
    Ok(df)
}

fn read_excel(filename: &str, data: &[u8]) -> Result<DataFrame> {
    let rows: Vec<Vec<Data>> = if filename.to_lowercase().ends_with(".xls") {
        let mut workbook: Xls<_> = Xls::new(Cursor::new(data))
            .map_err(|e| PipelineError::DataError(e.to_string()))?;
        sheet_rows(&mut workbook)?
    } else {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))
            .map_err(|e| PipelineError::DataError(e.to_string()))?;
        sheet_rows(&mut workbook)?
    };

    rows_to_dataframe(&rows)
}

fn sheet_rows<RS, R>(workbook: &mut R) -> Result<Vec<Vec<Data>>>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PipelineError::DataError("workbook has no sheets".to_string()))?
        .map_err(|e| PipelineError::DataError(e.to_string()))?;
    Ok(range.rows().map(|r| r.to_vec()).collect())
}

/// Build a DataFrame from raw sheet cells: first row is the header, each
/// column's type is inferred from its cells (all-numeric -> Float64,
/// all-bool -> Boolean, anything else -> String).
fn rows_to_dataframe(rows: &[Vec<Data>]) -> Result<DataFrame> {
    let header = rows
        .first()
        .ok_or_else(|| PipelineError::DataError("sheet is empty".to_string()))?;

    let n_cols = header.len();
    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("column_{}", i),
            other => cell_to_string(other),
        })
        .collect();

    let body = &rows[1..];
    let mut columns: Vec<Column> = Vec::with_capacity(n_cols);

    for (j, name) in names.iter().enumerate() {
        let cells: Vec<&Data> = body
            .iter()
            .map(|row| row.get(j).unwrap_or(&Data::Empty))
            .collect();

        let all_numeric = cells
            .iter()
            .all(|c| matches!(c, Data::Float(_) | Data::Int(_) | Data::Empty));
        let all_bool = cells
            .iter()
            .all(|c| matches!(c, Data::Bool(_) | Data::Empty));

        let series = if all_numeric {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|c| match c {
                    Data::Float(v) => Some(*v),
                    Data::Int(v) => Some(*v as f64),
                    _ => None,
                })
                .collect();
            Series::new(name.as_str().into(), values)
        } else if all_bool {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|c| match c {
                    Data::Bool(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.as_str().into(), values)
        } else {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|c| match c {
                    Data::Empty => None,
                    other => Some(cell_to_string(other)),
                })
                .collect();
            Series::new(name.as_str().into(), values)
        };

        columns.push(series.into());
    }

    Ok(DataFrame::new(columns)?)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(v) => {
            if v.fract() == 0.0 {
                format!("{}", *v as i64)
            } else {
                v.to_string()
            }
        }
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{:?}", e),
        Data::Empty => String::new(),
    }
}

/// Convert the first `n` rows of a frame to JSON records, one object per row
/// keyed by column name. Used for the upload preview of the original table.
pub fn records_preview(df: &DataFrame, n: usize) -> Vec<serde_json::Value> {
    let head = df.head(Some(n));
    let columns = head.get_columns();

    (0..head.height())
        .map(|i| {
            let mut record = serde_json::Map::new();
            for col in columns {
                record.insert(col.name().to_string(), anyvalue_to_json(col.get(i)));
            }
            serde_json::Value::Object(record)
        })
        .collect()
}

fn anyvalue_to_json(value: PolarsResult<AnyValue>) -> serde_json::Value {
    match value {
        Ok(AnyValue::Float64(v)) => serde_json::json!(v),
        Ok(AnyValue::Float32(v)) => serde_json::json!(v),
        Ok(AnyValue::Int64(v)) => serde_json::json!(v),
        Ok(AnyValue::Int32(v)) => serde_json::json!(v),
        Ok(AnyValue::String(v)) => serde_json::json!(v),
        Ok(AnyValue::StringOwned(v)) => serde_json::json!(v.to_string()),
        Ok(AnyValue::Boolean(v)) => serde_json::json!(v),
        Ok(AnyValue::Null) => serde_json::Value::Null,
        Ok(other) => serde_json::json!(format!("{:?}", other)),
        Err(_) => serde_json::Value::Null,
    }
}
