//! Folder reference validation for file assignment.
//!
//! A file may only be filed under a folder owned by the file's owner. The two
//! entry points differ on what happens when the requested folder cannot be
//! used: uploads silently fall back to unfiled, explicit moves fail.

use sqlx::SqlitePool;
use tracing::debug;

use super::folder::FolderRepository;
use crate::{CabinetError, Result};

/// Resolves requested folder IDs against the requesting owner's folders.
pub struct FolderResolver<'a> {
    folders: FolderRepository<'a>,
}

impl<'a> FolderResolver<'a> {
    /// Create a resolver over the given pool.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            folders: FolderRepository::new(pool),
        }
    }

    /// Resolve for the upload path.
    ///
    /// Returns `None` when no folder was requested, or when the folder does
    /// not exist or belongs to another user.
    pub async fn resolve_or_clear(
        &self,
        owner_id: i64,
        requested: Option<i64>,
    ) -> Result<Option<i64>> {
        let Some(folder_id) = requested else {
            return Ok(None);
        };

        match self.folders.get_owned(folder_id, owner_id).await? {
            Some(folder) => Ok(Some(folder.id)),
            None => {
                debug!(
                    owner_id,
                    folder_id, "requested folder not usable, uploading unfiled"
                );
                Ok(None)
            }
        }
    }

    /// Resolve for the explicit reassignment path.
    ///
    /// `None` requested means "unfile" and resolves to `Ok(None)`. A folder
    /// that does not exist or belongs to another user is a validation error.
    pub async fn resolve_or_fail(
        &self,
        owner_id: i64,
        requested: Option<i64>,
    ) -> Result<Option<i64>> {
        let Some(folder_id) = requested else {
            return Ok(None);
        };

        self.folders
            .get_owned(folder_id, owner_id)
            .await?
            .map(|folder| Some(folder.id))
            .ok_or_else(|| CabinetError::Validation("selected folder not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::file::NewFolder;
    use crate::Database;

    async fn setup() -> (Database, i64, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let users = UserRepository::new(db.pool());
        let alice = users
            .create(&NewUser::new("alice@example.com", "Alice", "hash"))
            .await
            .unwrap()
            .id;
        let bob = users
            .create(&NewUser::new("bob@example.com", "Bob", "hash"))
            .await
            .unwrap()
            .id;
        let folder = FolderRepository::new(db.pool())
            .create(&NewFolder::new("Alice's", alice))
            .await
            .unwrap()
            .id;
        (db, alice, bob, folder)
    }

    #[tokio::test]
    async fn test_resolve_or_clear() {
        let (db, alice, bob, folder) = setup().await;
        let resolver = FolderResolver::new(db.pool());

        assert_eq!(resolver.resolve_or_clear(alice, None).await.unwrap(), None);
        assert_eq!(
            resolver.resolve_or_clear(alice, Some(folder)).await.unwrap(),
            Some(folder)
        );
        assert_eq!(resolver.resolve_or_clear(bob, Some(folder)).await.unwrap(), None);
        assert_eq!(resolver.resolve_or_clear(alice, Some(9999)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolve_or_fail() {
        let (db, alice, bob, folder) = setup().await;
        let resolver = FolderResolver::new(db.pool());

        assert_eq!(resolver.resolve_or_fail(alice, None).await.unwrap(), None);
        assert_eq!(
            resolver.resolve_or_fail(alice, Some(folder)).await.unwrap(),
            Some(folder)
        );
        assert!(matches!(
            resolver.resolve_or_fail(bob, Some(folder)).await,
            Err(CabinetError::Validation(_))
        ));
        assert!(matches!(
            resolver.resolve_or_fail(alice, Some(9999)).await,
            Err(CabinetError::Validation(_))
        ));
    }
}
