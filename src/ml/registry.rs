//! Session registry: one independent pipeline per training session.
//!
//! The map of sessions sits behind a `parking_lot` lock that is held only
//! long enough to clone an `Arc`. Each pipeline has its own async lock, so
//! sessions never wait on each other's locks. Training is CPU-bound and runs
//! inline in the calling task; on a current-thread runtime one session's
//! `fit` still holds up every other task until it finishes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::info;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, VeracityError};
use crate::ml::classifier::ModelType;
use crate::ml::config::PipelineConfig;
use crate::ml::pipeline::{Pipeline, Prediction, TrainingReport};
use crate::ml::types::LabeledText;

/// Identifier of a training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for SessionId {
    type Err = VeracityError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(SessionId)
            .map_err(|e| VeracityError::parse_failure(format!("invalid session id '{s}': {e}")))
    }
}

/// A pipeline shared between tasks.
pub type SharedPipeline = Arc<tokio::sync::RwLock<Pipeline>>;

/// Registry of live training sessions.
///
/// # Examples
///
/// ```
/// use veracity::ml::classifier::ModelType;
/// use veracity::ml::config::PipelineConfig;
/// use veracity::ml::registry::SessionRegistry;
///
/// let registry = SessionRegistry::new();
/// let id = registry.open(ModelType::Knn, PipelineConfig::default()).unwrap();
/// assert!(registry.get(&id).is_ok());
/// registry.close(&id).unwrap();
/// assert!(registry.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SharedPipeline>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with a fresh pipeline and return its id.
    pub fn open(&self, model_type: ModelType, config: PipelineConfig) -> Result<SessionId> {
        let pipeline = Pipeline::new(model_type, config)?;
        let id = SessionId::new();
        self.sessions
            .write()
            .insert(id, Arc::new(tokio::sync::RwLock::new(pipeline)));
        info!("opened session {id} for {model_type}");
        Ok(id)
    }

    /// Look up a session.
    pub fn get(&self, id: &SessionId) -> Result<SharedPipeline> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| VeracityError::not_found(format!("session {id}")))
    }

    /// Remove a session. Tasks still holding its pipeline keep it alive.
    pub fn close(&self, id: &SessionId) -> Result<()> {
        match self.sessions.write().remove(id) {
            Some(_) => {
                info!("closed session {id}");
                Ok(())
            }
            None => Err(VeracityError::not_found(format!("session {id}"))),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Ids of every open session, sorted.
    pub fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.read().keys().copied().collect();
        ids.sort();
        ids
    }

    /// Run a full load/fit/evaluate cycle in one session.
    pub async fn train(&self, id: &SessionId, records: Vec<LabeledText>) -> Result<TrainingReport> {
        let pipeline = self.get(id)?;
        let mut pipeline = pipeline.write().await;
        pipeline.train_and_evaluate(records).await
    }

    /// Predict with one session's model.
    pub async fn predict(&self, id: &SessionId, text: &str) -> Result<Prediction> {
        let pipeline = self.get(id)?;
        let pipeline = pipeline.read().await;
        pipeline.predict(text)
    }
}
