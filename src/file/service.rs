//! File service for Cabinet.
//!
//! This module orchestrates the file lifecycle:
//! - Upload: validate, store the blob, then record the metadata
//! - Read / download with visibility checks
//! - Delete: best-effort blob removal, then metadata removal
//! - Folder reassignment with owner-scoped folder validation

use std::fmt;

use tracing::{debug, info, warn};

use crate::db::{Database, UserRepository};
use crate::{CabinetError, Result};

use super::folder::{Folder, FolderRepository};
use super::metadata::{FileMetadata, FileRepository, NewFile};
use super::policy::{can_mutate, can_read, Principal};
use super::resolver::FolderResolver;
use super::storage::{BlobReader, BlobStore};
use super::{DEFAULT_MAX_FILE_SIZE, MAX_DESCRIPTION_LENGTH, MAX_FILENAME_LENGTH};

/// Request data for a file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Name supplied by the uploader.
    pub filename: String,
    /// File content.
    pub content: Vec<u8>,
    /// MIME type declared by the client, if any.
    pub mime_type: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Visibility flag.
    pub is_public: bool,
    /// Folder the uploader asked for.
    pub folder_id: Option<i64>,
}

impl UploadRequest {
    /// Create a private, unfiled upload request.
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
            mime_type: None,
            description: None,
            is_public: false,
            folder_id: None,
        }
    }

    /// Set the declared MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the visibility flag.
    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    /// Request a folder.
    pub fn with_folder(mut self, folder_id: Option<i64>) -> Self {
        self.folder_id = folder_id;
        self
    }
}

/// A readable file together with owner-only folder context.
#[derive(Debug, Clone)]
pub struct FileView {
    /// The file record.
    pub file: FileMetadata,
    /// Whether the principal owns the file.
    pub is_owner: bool,
    /// The folder the file is filed under (owner only).
    pub folder: Option<Folder>,
    /// The direct parent of that folder (owner only).
    pub parent_folder: Option<Folder>,
    /// All of the owner's folders (owner only, empty otherwise).
    pub owner_folders: Vec<Folder>,
}

/// What a download needs to stream the content.
#[derive(Debug, Clone)]
pub struct DownloadTicket {
    /// Blob location.
    pub location: String,
    /// Original filename, for the content disposition.
    pub filename: String,
    /// MIME type.
    pub mime_type: String,
    /// Recorded size in bytes.
    pub size: i64,
}

/// Degraded cleanup observed while deleting a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupWarning {
    /// The blob layer reported an error; the blob may be orphaned.
    BlobRemovalFailed { location: String, reason: String },
    /// The blob was already gone.
    BlobMissing { location: String },
}

impl CleanupWarning {
    /// Stable identifier for the kind of warning, without blob details.
    pub fn kind(&self) -> &'static str {
        match self {
            CleanupWarning::BlobRemovalFailed { .. } => "blob_removal_failed",
            CleanupWarning::BlobMissing { .. } => "blob_missing",
        }
    }
}

impl fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupWarning::BlobRemovalFailed { location, reason } => {
                write!(f, "failed to remove blob {location}: {reason}")
            }
            CleanupWarning::BlobMissing { location } => {
                write!(f, "blob {location} was already missing")
            }
        }
    }
}

/// Result of a delete. The metadata record is always gone once this is returned.
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    /// The record that was deleted.
    pub file: FileMetadata,
    /// Cleanup problems that did not stop the delete.
    pub warnings: Vec<CleanupWarning>,
}

impl DeleteOutcome {
    /// Whether the blob was removed without trouble.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// File lifecycle manager.
///
/// The metadata store and blob store are owned by the caller and passed in.
pub struct FileService<'a> {
    db: &'a Database,
    storage: &'a dyn BlobStore,
    max_file_size: u64,
    allowed_mime_types: Vec<String>,
}

impl<'a> FileService<'a> {
    /// Create a new FileService.
    pub fn new(db: &'a Database, storage: &'a dyn BlobStore) -> Self {
        Self {
            db,
            storage,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: Vec::new(),
        }
    }

    /// Set the maximum accepted upload size in bytes.
    pub fn with_max_file_size(mut self, max_size: u64) -> Self {
        self.max_file_size = max_size;
        self
    }

    /// Restrict uploads to the given MIME types (`type/*` wildcards allowed).
    ///
    /// An empty list accepts any type.
    pub fn with_allowed_mime_types(mut self, types: &[String]) -> Self {
        self.allowed_mime_types = types.iter().map(|t| t.to_ascii_lowercase()).collect();
        self
    }

    /// Upload a file.
    ///
    /// The principal must be an authenticated user that exists. A requested
    /// folder that is missing or owned by someone else is dropped and the file
    /// is created unfiled.
    pub async fn create(
        &self,
        principal: &Principal,
        request: &UploadRequest,
    ) -> Result<FileMetadata> {
        let owner_id = principal
            .user_id()
            .ok_or_else(|| CabinetError::Auth("login required to upload".to_string()))?;
        if UserRepository::new(self.db.pool())
            .get_by_id(owner_id)
            .await?
            .is_none()
        {
            debug!(owner_id, "upload by unknown user");
            return Err(CabinetError::Auth("unknown user".to_string()));
        }

        let original_name = normalize_filename(&request.filename)?;
        let description = self.validate_description(request.description.as_deref())?;
        self.validate_size(request.content.len() as u64)?;
        let mime_type = self.resolve_mime_type(&original_name, request.mime_type.as_deref())?;

        let folder_id = FolderResolver::new(self.db.pool())
            .resolve_or_clear(owner_id, request.folder_id)
            .await?;

        let blob = self.storage.store(&request.content, &original_name)?;

        let mut new_file = NewFile::new(&blob, &original_name, mime_type, owner_id)
            .with_public(request.is_public)
            .with_folder(folder_id);
        if let Some(desc) = description {
            new_file = new_file.with_description(desc);
        }

        let file = match FileRepository::new(self.db.pool()).create(&new_file).await {
            Ok(file) => file,
            Err(e) => {
                // Metadata insert failed after the blob was written.
                match self.storage.remove(&blob.location) {
                    Ok(_) => debug!(location = %blob.location, "removed blob after failed insert"),
                    Err(cleanup) => warn!(
                        location = %blob.location,
                        error = %cleanup,
                        "orphaned blob after failed insert"
                    ),
                }
                return Err(e);
            }
        };

        info!(
            file_id = file.id,
            owner_id,
            folder_id = ?file.folder_id,
            size = file.size,
            "file uploaded"
        );
        Ok(file)
    }

    /// Read a file.
    ///
    /// Files the principal may not read are reported as not found.
    pub async fn read(&self, principal: &Principal, file_id: i64) -> Result<FileView> {
        let file = self.fetch_readable(principal, file_id).await?;

        if !can_mutate(principal, &file) {
            return Ok(FileView {
                file,
                is_owner: false,
                folder: None,
                parent_folder: None,
                owner_folders: Vec::new(),
            });
        }

        let folder_repo = FolderRepository::new(self.db.pool());
        let owner_folders = folder_repo.list_by_owner(file.user_id).await?;
        let folder = file
            .folder_id
            .and_then(|id| owner_folders.iter().find(|f| f.id == id).cloned());
        let parent_folder = match &folder {
            Some(folder) => folder_repo.get_parent(folder).await?,
            None => None,
        };

        Ok(FileView {
            file,
            is_owner: true,
            folder,
            parent_folder,
            owner_folders,
        })
    }

    /// Authorize a download.
    ///
    /// Same visibility rule as [`read`](Self::read). The blob itself is not
    /// checked here; a missing blob surfaces when it is opened.
    pub async fn download(&self, principal: &Principal, file_id: i64) -> Result<DownloadTicket> {
        let file = self.fetch_readable(principal, file_id).await?;

        Ok(DownloadTicket {
            location: file.location,
            filename: file.original_name,
            mime_type: file.mime_type,
            size: file.size,
        })
    }

    /// Open the blob behind a download ticket.
    pub fn open(&self, ticket: &DownloadTicket) -> Result<BlobReader> {
        self.storage.open(&ticket.location)
    }

    /// Delete a file.
    ///
    /// Phase one removes the blob; failures are recorded as warnings and do
    /// not stop phase two, which removes the metadata record. A crash between
    /// the phases can orphan a blob but never leaves a record without its
    /// delete having been attempted.
    pub async fn delete(&self, principal: &Principal, file_id: i64) -> Result<DeleteOutcome> {
        let file = self.fetch_mutable(principal, file_id).await?;
        let mut warnings = Vec::new();

        match self.storage.remove(&file.location) {
            Ok(true) => {}
            Ok(false) => {
                warn!(file_id, location = %file.location, "blob already missing on delete");
                warnings.push(CleanupWarning::BlobMissing {
                    location: file.location.clone(),
                });
            }
            Err(e) => {
                warn!(file_id, location = %file.location, error = %e, "failed to remove blob");
                warnings.push(CleanupWarning::BlobRemovalFailed {
                    location: file.location.clone(),
                    reason: e.to_string(),
                });
            }
        }

        if !FileRepository::new(self.db.pool()).delete(file_id).await? {
            // Lost a race with another delete.
            return Err(CabinetError::NotFound("file".to_string()));
        }

        info!(file_id, owner_id = file.user_id, clean = warnings.is_empty(), "file deleted");
        Ok(DeleteOutcome { file, warnings })
    }

    /// Move a file into a folder, or unfile it with `None`.
    ///
    /// The folder must belong to the file's owner; otherwise nothing is changed.
    pub async fn reassign_folder(
        &self,
        principal: &Principal,
        file_id: i64,
        folder_id: Option<i64>,
    ) -> Result<FileMetadata> {
        let file = self.fetch_mutable(principal, file_id).await?;

        let folder_id = FolderResolver::new(self.db.pool())
            .resolve_or_fail(file.user_id, folder_id)
            .await?;

        let updated = FileRepository::new(self.db.pool())
            .update_folder(file_id, folder_id)
            .await?
            .ok_or_else(|| CabinetError::NotFound("file".to_string()))?;

        info!(file_id, from = ?file.folder_id, to = ?updated.folder_id, "file folder reassigned");
        Ok(updated)
    }

    /// List public files, most recent first.
    pub async fn list_public(&self) -> Result<Vec<FileMetadata>> {
        FileRepository::new(self.db.pool()).list_public().await
    }

    /// List the principal's own files, most recent first.
    pub async fn list_owned(&self, principal: &Principal) -> Result<Vec<FileMetadata>> {
        let owner_id = principal
            .user_id()
            .ok_or_else(|| CabinetError::Auth("login required".to_string()))?;
        FileRepository::new(self.db.pool())
            .list_by_owner(owner_id)
            .await
    }

    async fn fetch_readable(&self, principal: &Principal, file_id: i64) -> Result<FileMetadata> {
        let file = self.fetch(file_id).await?;
        if !can_read(principal, &file) {
            debug!(file_id, ?principal, "private file concealed");
            return Err(CabinetError::NotFound("file".to_string()));
        }
        Ok(file)
    }

    async fn fetch_mutable(&self, principal: &Principal, file_id: i64) -> Result<FileMetadata> {
        let file = self.fetch(file_id).await?;
        if !can_mutate(principal, &file) {
            debug!(file_id, ?principal, "mutation by non-owner concealed");
            return Err(CabinetError::NotFound("file".to_string()));
        }
        Ok(file)
    }

    async fn fetch(&self, file_id: i64) -> Result<FileMetadata> {
        FileRepository::new(self.db.pool())
            .get_by_id(file_id)
            .await?
            .ok_or_else(|| CabinetError::NotFound("file".to_string()))
    }

    fn validate_description(&self, description: Option<&str>) -> Result<Option<String>> {
        let Some(desc) = description.map(str::trim).filter(|d| !d.is_empty()) else {
            return Ok(None);
        };
        if desc.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(CabinetError::Validation(format!(
                "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }
        Ok(Some(desc.to_string()))
    }

    fn validate_size(&self, size: u64) -> Result<()> {
        if size > self.max_file_size {
            let max_mb = self.max_file_size / 1024 / 1024;
            return Err(CabinetError::Validation(format!(
                "file too large (max {max_mb}MB)"
            )));
        }
        Ok(())
    }

    fn resolve_mime_type(&self, filename: &str, declared: Option<&str>) -> Result<String> {
        let mime_type = declared
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| {
                mime_guess::from_path(filename)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });

        if self.allowed_mime_types.is_empty() || mime_allowed(&self.allowed_mime_types, &mime_type)
        {
            Ok(mime_type)
        } else {
            Err(CabinetError::Validation(format!(
                "file type not allowed: {mime_type}"
            )))
        }
    }
}

/// Whether `mime_type` matches an entry of `allowed` (`*/*` and `type/*` supported).
fn mime_allowed(allowed: &[String], mime_type: &str) -> bool {
    let essence = mime_type.split(';').next().unwrap_or(mime_type).trim();
    allowed.iter().any(|pattern| match pattern.strip_suffix("/*") {
        Some("*") => true,
        Some(prefix) => essence
            .split_once('/')
            .is_some_and(|(top, _)| top == prefix),
        None => pattern == essence,
    })
}

/// Keep only the last path segment of a client-supplied filename.
fn normalize_filename(filename: &str) -> Result<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>();
    let base = base.trim();

    if base.is_empty() || base == "." || base == ".." {
        return Err(CabinetError::Validation("filename is required".to_string()));
    }
    if base.chars().count() > MAX_FILENAME_LENGTH {
        return Err(CabinetError::Validation(format!(
            "filename must be at most {MAX_FILENAME_LENGTH} characters"
        )));
    }
    Ok(base.to_string())
}
