//! Certificate file routes

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use roster_storage::NewFile;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::auth::RequireAuth;
use super::types::{FileResponse, UploadResponse};

/// Multipart field that carries the certificate payload
const UPLOAD_FIELD: &str = "certificate";

/// POST /api/files/upload
async fn upload_file(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload: Option<NewFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or(UPLOAD_FIELD).to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Read error: {}", e)))?;

        upload = Some(NewFile {
            original_name,
            content_type,
            data,
            owner_account_id: user.id.clone(),
        });
        break;
    }

    let upload = upload
        .ok_or_else(|| ApiError::Validation(format!("Field '{}' is required", UPLOAD_FIELD)))?;

    debug!(
        "Upload from account {}: {} ({} bytes)",
        user.id,
        upload.original_name,
        upload.data.len()
    );

    let outcome = state.files.store(upload).await?;

    let message = if outcome.duplicate {
        info!("Upload deduplicated onto {}", outcome.file_name);
        "File already exists"
    } else {
        info!("Stored file {}", outcome.file_name);
        "File uploaded successfully"
    };
    metrics::counter!("roster_uploads_total").increment(1);

    Ok(Json(UploadResponse {
        file_name: outcome.file_name,
        original_name: outcome.original_name,
        size: outcome.size,
        is_duplicate: outcome.duplicate,
        message: message.to_string(),
    }))
}

/// GET /api/files
async fn list_files(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<FileResponse>>, ApiError> {
    let files = if user.role.is_admin() {
        state.files.list_all().await?
    } else {
        state.files.list_for_owner(&user.id).await?
    };

    Ok(Json(files.into_iter().map(FileResponse::from).collect()))
}

/// GET /api/files/{filename}
///
/// Any authenticated account may download by exact name; deduplication
/// hands out names first stored under another owner, so downloads are not
/// owner-scoped.
async fn download_file(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let (data, meta) = state
        .files
        .retrieve(&filename)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("File: {}", filename)))?;

    // Header-safe download name
    let download_name = meta.original_name.replace(['"', '\r', '\n'], "");

    Ok((
        [
            (header::CONTENT_TYPE, meta.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download_name),
            ),
        ],
        data,
    )
        .into_response())
}

/// DELETE /api/files/{filename}
async fn delete_file(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state.files.delete(&filename).await?;

    if deleted {
        info!("Deleted file {}", filename);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("File: {}", filename)))
    }
}

/// Create file routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/files/upload", post(upload_file))
        .route("/api/files", get(list_files))
        .route("/api/files/{filename}", get(download_file))
        .route("/api/files/{filename}", delete(delete_file))
}
