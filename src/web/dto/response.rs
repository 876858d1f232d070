//! Response DTOs for the HTTP API.

use serde::Serialize;

use crate::datetime::to_rfc3339;
use crate::file::{CleanupWarning, DeleteOutcome, FileMetadata, FileView, Folder};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// File metadata in responses.
///
/// Storage details (stored name, location) are never exposed.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub id: i64,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub description: Option<String>,
    pub is_public: bool,
    pub owner_id: i64,
    pub folder_id: Option<i64>,
    pub created_at: String,
}

impl From<FileMetadata> for FileResponse {
    fn from(file: FileMetadata) -> Self {
        Self {
            id: file.id,
            filename: file.original_name,
            mime_type: file.mime_type,
            size: file.size,
            description: file.description,
            is_public: file.is_public,
            owner_id: file.user_id,
            folder_id: file.folder_id,
            created_at: to_rfc3339(&file.created_at),
        }
    }
}

/// Folder in responses.
#[derive(Debug, Serialize)]
pub struct FolderResponse {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub created_at: String,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            parent_id: folder.parent_id,
            created_at: to_rfc3339(&folder.created_at),
        }
    }
}

/// File detail, with folder context for the owner.
#[derive(Debug, Serialize)]
pub struct FileDetailResponse {
    pub file: FileResponse,
    pub is_owner: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<FolderResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_folder: Option<FolderResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub folders: Vec<FolderResponse>,
}

impl From<FileView> for FileDetailResponse {
    fn from(view: FileView) -> Self {
        Self {
            file: view.file.into(),
            is_owner: view.is_owner,
            folder: view.folder.map(Into::into),
            parent_folder: view.parent_folder.map(Into::into),
            folders: view.owner_folders.into_iter().map(Into::into).collect(),
        }
    }
}

/// Delete result.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: i64,
    pub deleted: bool,
    /// Kinds of cleanup problems that did not prevent the delete.
    pub warnings: Vec<&'static str>,
}

impl From<DeleteOutcome> for DeleteResponse {
    fn from(outcome: DeleteOutcome) -> Self {
        Self {
            id: outcome.file.id,
            deleted: true,
            warnings: outcome.warnings.iter().map(CleanupWarning::kind).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file() -> FileMetadata {
        FileMetadata {
            id: 3,
            stored_name: "abcd.txt".to_string(),
            original_name: "notes.txt".to_string(),
            mime_type: "text/plain".to_string(),
            size: 12,
            location: "ab/abcd.txt".to_string(),
            description: Some("notes".to_string()),
            is_public: true,
            user_id: 1,
            folder_id: None,
            created_at: "2024-01-15 10:30:00".to_string(),
        }
    }

    #[test]
    fn test_file_response_hides_storage_details() {
        let json = serde_json::to_value(FileResponse::from(sample_file())).unwrap();

        assert_eq!(json["filename"], "notes.txt");
        assert_eq!(json["owner_id"], 1);
        assert_eq!(json["created_at"], "2024-01-15T10:30:00Z");
        assert!(json.get("location").is_none());
        assert!(json.get("stored_name").is_none());
    }

    #[test]
    fn test_detail_response_omits_owner_context_for_others() {
        let view = FileView {
            file: sample_file(),
            is_owner: false,
            folder: None,
            parent_folder: None,
            owner_folders: Vec::new(),
        };
        let json = serde_json::to_value(FileDetailResponse::from(view)).unwrap();

        assert_eq!(json["is_owner"], false);
        assert!(json.get("folder").is_none());
        assert!(json.get("folders").is_none());
    }

    #[test]
    fn test_delete_response_warnings() {
        let outcome = DeleteOutcome {
            file: sample_file(),
            warnings: vec![
                CleanupWarning::BlobMissing {
                    location: "ab/abcd.txt".to_string(),
                },
                CleanupWarning::BlobRemovalFailed {
                    location: "ab/abcd.txt".to_string(),
                    reason: "permission denied (os error 13)".to_string(),
                },
            ],
        };
        let resp = DeleteResponse::from(outcome);

        assert!(resp.deleted);
        assert_eq!(resp.warnings, vec!["blob_missing", "blob_removal_failed"]);

        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("ab/abcd.txt"));
        assert!(!json.contains("os error"));
    }
}
