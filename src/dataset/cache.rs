use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::error::{AppError, AppResult};

use super::{DataSources, MergedDataset};

/// Process-wide memo for the merged dataset
///
/// The first call reads both sources; every later call hands out the same
/// `Arc`. A failed load is not memoized, so the caller decides whether to retry
/// or abort. Clones share one cell.
#[derive(Clone)]
pub struct DatasetCache {
    sources: Option<DataSources>,
    cell: Arc<OnceCell<Arc<MergedDataset>>>,
}

impl DatasetCache {
    pub fn new(sources: DataSources) -> Self {
        Self {
            sources: Some(sources),
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// Already-built dataset with no backing files
    pub fn from_dataset(dataset: MergedDataset) -> Self {
        Self {
            sources: None,
            cell: Arc::new(OnceCell::new_with(Some(Arc::new(dataset)))),
        }
    }

    pub async fn get(&self) -> AppResult<Arc<MergedDataset>> {
        self.cell
            .get_or_try_init(|| async {
                let sources = self.sources.clone().ok_or_else(|| {
                    AppError::Internal("dataset cache has no sources".to_string())
                })?;
                // csv parsing is blocking file I/O
                let dataset = tokio::task::spawn_blocking(move || MergedDataset::load(&sources))
                    .await
                    .map_err(|e| AppError::Internal(e.to_string()))??;
                Ok::<_, AppError>(Arc::new(dataset))
            })
            .await
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}
