//! User repository for Cabinet.

use sqlx::SqlitePool;

use super::user::{NewUser, User};
use crate::{CabinetError, Result};

/// Repository for user records.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// Fails with a validation error if the email is already registered
    /// (compared case-insensitively).
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        if self.email_exists(&new_user.email).await? {
            return Err(CabinetError::Validation(format!(
                "email already registered: {}",
                new_user.email
            )));
        }

        let result = sqlx::query("INSERT INTO users (email, name, password) VALUES (?, ?, ?)")
            .bind(&new_user.email)
            .bind(&new_user.name)
            .bind(&new_user.password)
            .execute(self.pool)
            .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CabinetError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, password, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, password, created_at
             FROM users WHERE email = ? COLLATE NOCASE",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Check if an email is already registered (case-insensitive).
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = ? COLLATE NOCASE)")
                .bind(email)
                .fetch_one(self.pool)
                .await?;
        Ok(exists.0)
    }
}
