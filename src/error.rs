//! Error types for Cabinet.

use thiserror::Error;

/// Common error type for Cabinet.
#[derive(Error, Debug)]
pub enum CabinetError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error from the blob layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation requires an authenticated principal.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found, or not visible to the principal.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl CabinetError {
    /// Whether this error originates in the metadata store or the blob layer.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            CabinetError::Database(_) | CabinetError::DatabaseConnection(_) | CabinetError::Io(_)
        )
    }
}

impl From<sqlx::Error> for CabinetError {
    fn from(e: sqlx::Error) -> Self {
        CabinetError::Database(e.to_string())
    }
}

/// Result type alias for Cabinet operations.
pub type Result<T> = std::result::Result<T, CabinetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error_display() {
        let err = CabinetError::NotFound("file".to_string());
        assert_eq!(err.to_string(), "file not found");
    }

    #[test]
    fn test_validation_error_display() {
        let err = CabinetError::Validation("selected folder not found".to_string());
        assert_eq!(
            err.to_string(),
            "validation error: selected folder not found"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "blob missing");
        let err: CabinetError = io_err.into();
        assert!(matches!(err, CabinetError::Io(_)));
        assert!(err.to_string().contains("blob missing"));
    }

    #[test]
    fn test_store_failure_classification() {
        assert!(CabinetError::Database("locked".into()).is_store_failure());
        assert!(CabinetError::DatabaseConnection("refused".into()).is_store_failure());
        assert!(CabinetError::Io(std::io::Error::other("disk")).is_store_failure());

        assert!(!CabinetError::NotFound("file".into()).is_store_failure());
        assert!(!CabinetError::Validation("bad".into()).is_store_failure());
        assert!(!CabinetError::Auth("login".into()).is_store_failure());
    }
}
