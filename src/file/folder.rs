//! Folder types and repository for Cabinet.

use sqlx::SqlitePool;

use crate::{CabinetError, Result};

/// A folder owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Folder {
    /// Unique folder ID.
    pub id: i64,
    /// Folder name.
    pub name: String,
    /// Owning user ID.
    pub user_id: i64,
    /// Parent folder ID (None for top-level folders).
    pub parent_id: Option<i64>,
    /// When the folder was created.
    pub created_at: String,
}

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    /// Folder name.
    pub name: String,
    /// Owning user ID.
    pub user_id: i64,
    /// Parent folder ID.
    pub parent_id: Option<i64>,
}

impl NewFolder {
    /// Create a new top-level folder owned by `user_id`.
    pub fn new(name: impl Into<String>, user_id: i64) -> Self {
        Self {
            name: name.into(),
            user_id,
            parent_id: None,
        }
    }

    /// Set the parent folder.
    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Repository for folder operations.
pub struct FolderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new folder.
    ///
    /// A parent folder, when given, must belong to the same owner.
    pub async fn create(&self, folder: &NewFolder) -> Result<Folder> {
        if folder.name.trim().is_empty() {
            return Err(CabinetError::Validation(
                "folder name must not be empty".to_string(),
            ));
        }
        if let Some(parent_id) = folder.parent_id {
            if self.get_owned(parent_id, folder.user_id).await?.is_none() {
                return Err(CabinetError::Validation(
                    "parent folder not found".to_string(),
                ));
            }
        }

        let result = sqlx::query("INSERT INTO folders (name, user_id, parent_id) VALUES (?, ?, ?)")
            .bind(&folder.name)
            .bind(folder.user_id)
            .bind(folder.parent_id)
            .execute(self.pool)
            .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CabinetError::NotFound("folder".to_string()))
    }

    /// Get a folder by ID regardless of owner.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            "SELECT id, name, user_id, parent_id, created_at FROM folders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(folder)
    }

    /// Get a folder by ID, scoped to its owner.
    ///
    /// Returns `None` both when the folder does not exist and when it belongs
    /// to someone else.
    pub async fn get_owned(&self, id: i64, user_id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(
            "SELECT id, name, user_id, parent_id, created_at
             FROM folders WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(folder)
    }

    /// Get the direct parent of a folder.
    ///
    /// Only one level is looked up; the parent chain is not walked.
    pub async fn get_parent(&self, folder: &Folder) -> Result<Option<Folder>> {
        match folder.parent_id {
            Some(parent_id) => self.get_owned(parent_id, folder.user_id).await,
            None => Ok(None),
        }
    }

    /// List all folders owned by a user, ordered by name.
    pub async fn list_by_owner(&self, user_id: i64) -> Result<Vec<Folder>> {
        let folders = sqlx::query_as::<_, Folder>(
            "SELECT id, name, user_id, parent_id, created_at
             FROM folders WHERE user_id = ? ORDER BY name COLLATE NOCASE, id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(folders)
    }
}
