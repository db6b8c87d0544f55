//! Error types for the server

use crate::error::PipelineError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

/// Precondition and validation failures are the client's fault; everything
/// that blows up inside a library call is reported as an internal error with
/// the message forwarded.
impl From<PipelineError> for ServerError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::ValidationError(_)
            | PipelineError::UnsupportedFormat(_)
            | PipelineError::ColumnNotFound(_) => ServerError::BadRequest(err.to_string()),
            _ => ServerError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({ "detail": detail }));
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: ServerError =
            PipelineError::ValidationError("bad input".to_string()).into();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }

    #[test]
    fn test_computation_maps_to_internal() {
        let err: ServerError =
            PipelineError::ComputationError("diverged".to_string()).into();
        assert!(matches!(err, ServerError::Internal(_)));
    }
}
