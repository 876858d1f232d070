//! Request DTOs for the HTTP API.

use serde::Deserialize;

/// Folder reassignment request.
///
/// `{"folder_id": null}` (or an empty body object) unfiles the file.
#[derive(Debug, Default, Deserialize)]
pub struct FolderAssignmentRequest {
    /// Target folder ID.
    #[serde(default)]
    pub folder_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_assignment_request() {
        let req: FolderAssignmentRequest = serde_json::from_str(r#"{"folder_id": 3}"#).unwrap();
        assert_eq!(req.folder_id, Some(3));

        let req: FolderAssignmentRequest = serde_json::from_str(r#"{"folder_id": null}"#).unwrap();
        assert_eq!(req.folder_id, None);

        let req: FolderAssignmentRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.folder_id, None);
    }
}
