//! File management module for Cabinet.
//!
//! This module provides the file lifecycle:
//! - Blob storage with UUID naming
//! - File and folder metadata
//! - Visibility and ownership rules
//! - Upload, read, download, delete and folder reassignment

mod folder;
mod metadata;
mod policy;
mod resolver;
mod service;
mod storage;

pub use folder::{Folder, FolderRepository, NewFolder};
pub use metadata::{FileMetadata, FileRepository, NewFile};
pub use policy::{can_mutate, can_read, Principal};
pub use resolver::FolderResolver;
pub use service::{
    CleanupWarning, DeleteOutcome, DownloadTicket, FileService, FileView, UploadRequest,
};
pub use storage::{BlobReader, BlobStore, FileStorage, StoredBlob};

/// Maximum length for filename (in characters).
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Maximum length for file description (in characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Default maximum file size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
