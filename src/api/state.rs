use std::sync::Arc;

use crate::dataset::{DatasetCache, MergedDataset};
use crate::error::AppResult;
use crate::services::{ChatProvider, QuestionAnswerer, SessionStore};

/// Shared application state
///
/// The dataset is immutable once loaded; only the session store takes a write lock.
#[derive(Clone)]
pub struct AppState {
    pub datasets: DatasetCache,
    pub sessions: SessionStore,
    pub answerer: QuestionAnswerer,
}

impl AppState {
    pub fn new(datasets: DatasetCache, provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            datasets,
            sessions: SessionStore::new(),
            answerer: QuestionAnswerer::new(provider),
        }
    }

    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    pub async fn dataset(&self) -> AppResult<Arc<MergedDataset>> {
        self.datasets.get().await
    }
}
