//! Request handlers for the pipeline endpoints
//!
//! Every handler computes its result first and commits to the session only
//! on success; a failed step leaves the session exactly as it was.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::data::{
    drop_incomplete_rows, encode_categoricals, parse_table, records_preview, TableFormat,
};
use crate::preprocessing::{scalable_columns, scale_features, ScaleMethod};
use crate::training::{
    confusion_matrix, features_and_target, train_test_split, EvalReport, FittedModel, ModelKind,
};
use crate::visualization::confusion_matrix_data_uri;

use super::error::{Result, ServerError};
use super::state::AppState;

const PREVIEW_ROWS: usize = 5;

fn require_dataset(working: &Option<polars::prelude::DataFrame>) -> Result<polars::prelude::DataFrame> {
    working
        .clone()
        .ok_or_else(|| ServerError::BadRequest("Upload a dataset first!".to_string()))
}

/// POST /upload — ingest a CSV or Excel file and start a fresh session
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        if let Some(file_name) = field.file_name() {
            let file_name = file_name.to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(e.to_string()))?;
            file = Some((file_name, data.to_vec()));
            break;
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| ServerError::BadRequest("No file field in request".to_string()))?;

    if TableFormat::from_filename(&file_name).is_none() {
        return Err(ServerError::BadRequest(
            "Only CSV, XLS, XLSX allowed".to_string(),
        ));
    }

    info!(file = %file_name, bytes = data.len(), "Received upload");

    let df = parse_table(&file_name, &data)
        .map_err(|e| ServerError::BadRequest(format!("Reading failed: {}", e)))?;

    if df.width() < 2 {
        return Err(ServerError::BadRequest(
            "Dataset must have at least 2 columns.".to_string(),
        ));
    }

    let (working, encoders) = encode_categoricals(&df, &state.config.drop_columns)?;

    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|c| c.to_string())
        .collect();
    let preview = records_preview(&df, PREVIEW_ROWS);
    let (rows, cols) = df.shape();

    let mut session = state.session.write().await;
    session.replace_dataset(df, working, encoders);

    info!(rows, cols, "Dataset ingested");
    Ok(Json(json!({
        "filename": file_name,
        "rows": rows,
        "cols": cols,
        "columns": columns,
        "preview": preview,
    })))
}

#[derive(Debug, Deserialize)]
pub struct PreprocessRequest {
    pub method: String,
}

/// POST /preprocess — scale the numeric feature columns in place
pub async fn preprocess(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreprocessRequest>,
) -> Result<Json<Value>> {
    let mut session = state.session.write().await;
    let working = require_dataset(&session.working)?;

    let method = ScaleMethod::parse(&req.method)
        .ok_or_else(|| ServerError::BadRequest("method must be standard or minmax".to_string()))?;

    if scalable_columns(&working).is_empty() {
        return Ok(Json(json!({ "status": "no_numeric_columns" })));
    }

    let (scaled, scaled_columns) =
        scale_features(&working, method).map_err(|e| ServerError::Internal(e.to_string()))?;

    session.working = Some(scaled);
    session.invalidate_split();

    info!(method = ?method, n_columns = scaled_columns.len(), "Scaling applied");
    Ok(Json(json!({
        "status": "preprocessing_applied",
        "scaled_columns": scaled_columns,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SplitRequest {
    pub test_size: f64,
}

/// POST /split — drop incomplete rows and split into train/test partitions
pub async fn split(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SplitRequest>,
) -> Result<Json<Value>> {
    let mut session = state.session.write().await;
    let working = require_dataset(&session.working)?;

    let clean = drop_incomplete_rows(&working)?;
    if clean.height() < 2 {
        return Err(ServerError::BadRequest(
            "Not enough data after dropping NaNs.".to_string(),
        ));
    }

    let (x, y) = features_and_target(&clean)?;
    let split = train_test_split(&x, &y, req.test_size)
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    let (train_rows, test_rows) = (split.train_rows(), split.test_rows());
    session.split = Some(split);
    session.invalidate_model();

    info!(train_rows, test_rows, test_size = req.test_size, "Dataset split");
    Ok(Json(json!({
        "status": "split_done",
        "train_rows": train_rows,
        "test_rows": test_rows,
    })))
}

#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    pub model: String,
}

/// POST /train — fit the chosen classifier and evaluate on the test partition
pub async fn train(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TrainRequest>,
) -> Result<Json<Value>> {
    let mut session = state.session.write().await;
    require_dataset(&session.working)?;
    let split = session
        .split
        .clone()
        .ok_or_else(|| ServerError::BadRequest("Split the dataset first".to_string()))?;

    let kind = ModelKind::parse(&req.model)
        .ok_or_else(|| ServerError::BadRequest("Model must be logistic or tree".to_string()))?;

    let model = FittedModel::fit(kind, &split.x_train, &split.y_train)
        .map_err(|e| ServerError::Internal(format!("Training failed: {}", e)))?;
    let y_pred = model
        .predict(&split.x_test)
        .map_err(|e| ServerError::Internal(format!("Training failed: {}", e)))?;

    let report = EvalReport::compute(&split.y_test, &y_pred);

    // Plot failure does not invalidate the trained model
    let (_, matrix) = confusion_matrix(&split.y_test, &y_pred);
    let image = match confusion_matrix_data_uri(&matrix) {
        Ok(uri) => Some(uri),
        Err(e) => {
            warn!(error = %e, "Confusion matrix rendering failed");
            None
        }
    };

    let accuracy = report.accuracy;
    let response = json!({
        "status": "model_trained",
        "accuracy": accuracy,
        "report": report.report,
        "confusion_matrix_base64": image.clone(),
    });

    session.model = Some(model);
    session.last_metrics = Some(report);
    session.last_confusion_image = image;

    info!(model = ?kind, accuracy, "Model trained");
    Ok(Json(response))
}

/// POST /reset — unconditionally clear the session
pub async fn reset(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.session.write().await.clear();
    info!("Session reset");
    Json(json!({ "status": "reset_done" }))
}

/// GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
