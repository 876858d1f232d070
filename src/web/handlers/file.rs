//! File handlers for the HTTP API.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::file::UploadRequest;
use crate::web::dto::{
    ApiResponse, DeleteResponse, FileDetailResponse, FileResponse, FolderAssignmentRequest,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, CurrentPrincipal};

/// Plain `filename` parameter: printable ASCII only, no quotes or backslashes.
fn ascii_fallback(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            ' '..='~' => c,
            _ => '_',
        })
        .collect()
}

/// `Content-Disposition` for a download of `filename`.
///
/// When the stored name cannot be sent as is, the header carries an ASCII
/// fallback plus the exact name as an RFC 5987 `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    let fallback = ascii_fallback(filename);
    if fallback == filename {
        format!("attachment; filename=\"{fallback}\"")
    } else {
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            urlencoding::encode(filename)
        )
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Upload exceeds the size limit")
    } else {
        tracing::debug!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

fn parse_folder_id(value: &str) -> Result<Option<i64>, ApiError> {
    let value = value.trim();
    if value.is_empty() || value == "null" {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| ApiError::bad_request("Invalid folder_id"))
}

/// GET /api/files - List public files.
pub async fn list_public_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state.file_service().list_public().await?;
    Ok(Json(ApiResponse::new(
        files.into_iter().map(FileResponse::from).collect(),
    )))
}

/// GET /api/files/mine - List the caller's files.
pub async fn list_my_files(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state.file_service().list_owned(&user.principal()).await?;
    Ok(Json(ApiResponse::new(
        files.into_iter().map(FileResponse::from).collect(),
    )))
}

/// POST /api/files - Upload a file.
///
/// Request body: multipart/form-data with a "file" field and optional
/// "description", "is_public" and "folder_id" fields.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let mut filename: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;
    let mut mime_type: Option<String> = None;
    let mut description: Option<String> = None;
    let mut is_public = false;
    let mut folder_id: Option<i64> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                mime_type = field.content_type().map(|s| s.to_string());
                content = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
            }
            "description" => {
                description = Some(field.text().await.map_err(multipart_error)?);
            }
            "is_public" => {
                is_public = parse_flag(&field.text().await.map_err(multipart_error)?);
            }
            "folder_id" => {
                folder_id = parse_folder_id(&field.text().await.map_err(multipart_error)?)?;
            }
            _ => {}
        }
    }

    let filename = filename.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let content = content.ok_or_else(|| ApiError::bad_request("No file content"))?;

    let mut request = UploadRequest::new(filename, content)
        .with_public(is_public)
        .with_folder(folder_id);
    // octet-stream counts as undeclared.
    if let Some(mime) = mime_type.filter(|m| m != "application/octet-stream") {
        request = request.with_mime_type(mime);
    }
    if let Some(desc) = description {
        request = request.with_description(desc);
    }

    let file = state
        .file_service()
        .create(&user.principal(), &request)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(file.into()))))
}

/// GET /api/files/:id - Get file metadata.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<FileDetailResponse>>, ApiError> {
    let view = state.file_service().read(&principal, file_id).await?;
    Ok(Json(ApiResponse::new(view.into())))
}

/// GET /api/files/:id/download - Download file content.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(file_id): Path<i64>,
) -> Result<Response<Body>, ApiError> {
    let service = state.file_service();
    let ticket = service.download(&principal, file_id).await?;
    let content = service.open(&ticket)?.into_bytes()?;

    let response = Response::builder()
        .header(header::CONTENT_TYPE, &ticket.mime_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&ticket.filename),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}

/// DELETE /api/files/:id - Delete a file.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<DeleteResponse>>, ApiError> {
    let outcome = state
        .file_service()
        .delete(&principal, file_id)
        .await?;
    Ok(Json(ApiResponse::new(outcome.into())))
}

/// PUT /api/files/:id/folder - Move a file into a folder, or unfile it.
pub async fn assign_folder(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(file_id): Path<i64>,
    Json(req): Json<FolderAssignmentRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state
        .file_service()
        .reassign_folder(&principal, file_id, req.folder_id)
        .await?;
    Ok(Json(ApiResponse::new(file.into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_header_simple_ascii() {
        let result = content_disposition_header("document.txt");
        assert_eq!(result, "attachment; filename=\"document.txt\"");
    }

    #[test]
    fn test_content_disposition_header_non_ascii() {
        let result = content_disposition_header("résumé.pdf");
        assert_eq!(
            result,
            "attachment; filename=\"r_sum_.pdf\"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"
        );
    }

    #[test]
    fn test_content_disposition_header_double_quote() {
        let result = content_disposition_header("test\"file.txt");
        assert!(result.contains("filename=\"test_file.txt\""));
        assert!(result.contains("%22"));
    }

    #[test]
    fn test_content_disposition_header_control_characters() {
        let result = content_disposition_header("file\"\r\nX-Evil: header\r\n\r\n<script>.txt");
        assert!(!result.contains('\r'));
        assert!(!result.contains('\n'));
        assert!(result.starts_with("attachment; filename="));
    }

    #[test]
    fn test_ascii_fallback() {
        assert_eq!(ascii_fallback("plain name.txt"), "plain name.txt");
        assert_eq!(ascii_fallback("a\\b\tc.txt"), "a_b_c.txt");
        assert_eq!(ascii_fallback("日本.txt"), "__.txt");
    }

    #[test]
    fn test_parse_flag() {
        for value in ["1", "true", "TRUE", " on ", "yes"] {
            assert!(parse_flag(value), "{value}");
        }
        for value in ["", "0", "false", "off", "nope"] {
            assert!(!parse_flag(value), "{value}");
        }
    }

    #[test]
    fn test_parse_folder_id() {
        assert_eq!(parse_folder_id("").unwrap(), None);
        assert_eq!(parse_folder_id("null").unwrap(), None);
        assert_eq!(parse_folder_id(" 42 ").unwrap(), Some(42));
        assert!(parse_folder_id("abc").is_err());
    }
}
