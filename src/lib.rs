//! Tabflow - No-code tabular ML pipeline server
//!
//! Holds a single in-memory session that walks a tabular dataset through a
//! fixed sequence of steps:
//!
//! 1. Ingest a CSV or Excel file (categoricals are label-encoded on ingest)
//! 2. Scale numeric feature columns (standard or min-max)
//! 3. Split into train/test partitions (stratified with fallback)
//! 4. Fit a classifier (logistic regression or decision tree)
//! 5. Inspect accuracy, a per-class report, and a confusion-matrix image
//!
//! # Modules
//!
//! - [`data`] - File ingestion and categorical label encoding
//! - [`preprocessing`] - Feature scaling
//! - [`training`] - Models, train/test splitting, evaluation metrics
//! - [`visualization`] - Confusion-matrix heat-map rendering
//! - [`server`] - HTTP server with REST API

// Core error handling
pub mod error;

// Data ingestion and encoding
pub mod data;

// Preprocessing
pub mod preprocessing;

// Model training and evaluation
pub mod training;

// Confusion-matrix rendering
pub mod visualization;

// HTTP service
pub mod server;

pub use error::{PipelineError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{PipelineError, Result};

    pub use crate::data::{LabelEncoder, TableFormat};

    pub use crate::preprocessing::{ScaleMethod, Scaler};

    pub use crate::training::{
        train_test_split, DecisionTree, EvalReport, FittedModel, LogisticRegression, ModelKind,
        TrainTestSplit,
    };

    pub use crate::server::{create_router, AppState, ServerConfig};
}
