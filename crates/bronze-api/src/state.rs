//! Application state.

use std::path::PathBuf;
use std::sync::Arc;

use crate::store::{FsSourceRepo, SourceRepo};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub source_repo: Arc<dyn SourceRepo>,
}

impl AppState {
    pub fn new(source_repo: Arc<dyn SourceRepo>) -> Self {
        Self { source_repo }
    }

    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FsSourceRepo::new(dir)))
    }
}
