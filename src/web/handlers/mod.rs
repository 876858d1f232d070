//! API handlers for the HTTP API.

pub mod file;

pub use file::*;

use std::sync::Arc;

use crate::config::FilesConfig;
use crate::file::{BlobStore, FileService};
use crate::Database;

/// Shared database reference.
pub type SharedDatabase = Arc<Database>;

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Metadata store.
    pub db: SharedDatabase,
    /// Blob store.
    pub storage: Arc<dyn BlobStore>,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
    /// Accepted MIME types (empty accepts all).
    pub allowed_mime_types: Vec<String>,
}

impl AppState {
    /// Create a new application state with default upload limits.
    pub fn new(db: SharedDatabase, storage: Arc<dyn BlobStore>) -> Self {
        Self {
            db,
            storage,
            max_upload_size: crate::file::DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: Vec::new(),
        }
    }

    /// Apply upload limits from configuration.
    pub fn with_files_config(mut self, files: &FilesConfig) -> Self {
        self.max_upload_size = files.max_upload_size_bytes();
        self.allowed_mime_types = files.allowed_mime_types.clone();
        self
    }

    /// Build a file service over this state.
    pub fn file_service(&self) -> FileService<'_> {
        FileService::new(&self.db, self.storage.as_ref())
            .with_max_file_size(self.max_upload_size)
            .with_allowed_mime_types(&self.allowed_mime_types)
    }
}
