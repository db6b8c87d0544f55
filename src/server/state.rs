//! Application state management

use polars::prelude::*;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::data::LabelEncoder;
use crate::training::{EvalReport, FittedModel, TrainTestSplit};

use super::ServerConfig;

/// The single in-memory pipeline session. Each step reads the state the
/// previous step committed; downstream state is invalidated whenever an
/// upstream step reruns.
#[derive(Default)]
pub struct Session {
    /// Ingested table, unmodified
    pub raw: Option<DataFrame>,
    /// Denylist columns dropped, categoricals encoded, numerics possibly scaled
    pub working: Option<DataFrame>,
    /// Fitted per-column label encoders from the last upload
    pub encoders: HashMap<String, LabelEncoder>,
    pub split: Option<TrainTestSplit>,
    pub model: Option<FittedModel>,
    pub last_metrics: Option<EvalReport>,
    /// Confusion-matrix PNG as a data URI; absent when rendering failed
    pub last_confusion_image: Option<String>,
}

impl Session {
    /// Forget everything
    pub fn clear(&mut self) {
        *self = Session::default();
    }

    /// A new dataset replaces the whole session
    pub fn replace_dataset(
        &mut self,
        raw: DataFrame,
        working: DataFrame,
        encoders: HashMap<String, LabelEncoder>,
    ) {
        self.clear();
        self.raw = Some(raw);
        self.working = Some(working);
        self.encoders = encoders;
    }

    /// Drop everything derived from the current split
    pub fn invalidate_model(&mut self) {
        self.model = None;
        self.last_metrics = None;
        self.last_confusion_image = None;
    }

    /// Drop everything derived from the current working table
    pub fn invalidate_split(&mut self) {
        self.split = None;
        self.invalidate_model();
    }
}

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub session: RwLock<Session>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            session: RwLock::new(Session::default()),
        }
    }
}
