//! File metadata types and repository for Cabinet.

use sqlx::SqlitePool;

use super::storage::StoredBlob;
use crate::{CabinetError, Result};

const FILE_COLUMNS: &str = "id, stored_name, original_name, mime_type, size, location, \
                            description, is_public, user_id, folder_id, created_at";

/// Metadata record for an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FileMetadata {
    /// Unique file ID.
    pub id: i64,
    /// Filename on the blob store (UUID.ext, unique).
    pub stored_name: String,
    /// Name supplied by the uploader.
    pub original_name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Blob location.
    pub location: String,
    /// Optional description.
    pub description: Option<String>,
    /// Readable by anyone when true, by the owner only otherwise.
    pub is_public: bool,
    /// Owning user ID.
    pub user_id: i64,
    /// Folder this file is filed under (None = unfiled).
    pub folder_id: Option<i64>,
    /// When the file was uploaded.
    pub created_at: String,
}

impl FileMetadata {
    /// Whether the file is filed under a folder.
    pub fn is_filed(&self) -> bool {
        self.folder_id.is_some()
    }
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub stored_name: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub location: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub user_id: i64,
    pub folder_id: Option<i64>,
}

impl NewFile {
    /// Create a private, unfiled record for a stored blob.
    pub fn new(
        blob: &StoredBlob,
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
        user_id: i64,
    ) -> Self {
        Self {
            stored_name: blob.stored_name.clone(),
            original_name: original_name.into(),
            mime_type: mime_type.into(),
            size: blob.size as i64,
            location: blob.location.clone(),
            description: None,
            is_public: false,
            user_id,
            folder_id: None,
        }
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

    /// Set the folder.
    pub fn with_folder(mut self, folder_id: Option<i64>) -> Self {
        self.folder_id = folder_id;
        self
    }
}

/// Repository for file metadata.
///
/// Every mutation touches exactly one row by ID, which is the only
/// concurrency guard between requests.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new file record.
    pub async fn create(&self, file: &NewFile) -> Result<FileMetadata> {
        let result = sqlx::query(
            "INSERT INTO files (stored_name, original_name, mime_type, size, location,
                                description, is_public, user_id, folder_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&file.stored_name)
        .bind(&file.original_name)
        .bind(&file.mime_type)
        .bind(file.size)
        .bind(&file.location)
        .bind(&file.description)
        .bind(file.is_public)
        .bind(file.user_id)
        .bind(file.folder_id)
        .execute(self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CabinetError::NotFound("file".to_string()))
    }

    /// Get a file by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileMetadata>> {
        let file = sqlx::query_as::<_, FileMetadata>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(file)
    }

    /// List public files, most recent first.
    pub async fn list_public(&self) -> Result<Vec<FileMetadata>> {
        let files = sqlx::query_as::<_, FileMetadata>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE is_public = 1
             ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(files)
    }

    /// List files owned by a user, most recent first.
    pub async fn list_by_owner(&self, user_id: i64) -> Result<Vec<FileMetadata>> {
        let files = sqlx::query_as::<_, FileMetadata>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE user_id = ?
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(files)
    }

    /// Set or clear the folder of a file.
    ///
    /// Returns the updated record, or None if the file no longer exists.
    pub async fn update_folder(
        &self,
        id: i64,
        folder_id: Option<i64>,
    ) -> Result<Option<FileMetadata>> {
        let result = sqlx::query("UPDATE files SET folder_id = ? WHERE id = ?")
            .bind(folder_id)
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Delete a file record by ID.
    ///
    /// Returns true if a record was deleted, false if not found.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
