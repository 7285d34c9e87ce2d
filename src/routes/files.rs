//! Image upload and download endpoints
//!
//! - `POST /upload` - multipart form with a `file` field (JPG/PNG only)
//! - `GET /download/{key}` - stream a stored object back to the caller

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use crate::models::{AppState, UploadResponse};
use crate::storage::{content_type_for, file_extension, is_allowed_extension};
use crate::types::{AppError, AppResult};

/// Largest accepted file, matching the form size cap.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

// Room for boundaries and part headers on top of the file itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

const FILE_FIELD: &str = "file";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + FORM_OVERHEAD_BYTES)),
        )
        .route("/download/{key}", get(download_file))
        .with_state(state)
}

struct FileUpload {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

/// POST /upload
async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let mut multipart =
        multipart.map_err(|e| AppError::BadRequest(format!("Failed to parse form: {}", e.body_text())))?;

    let upload = read_file_field(&mut multipart)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Missing form field: '{}'", FILE_FIELD)))?;

    info!(
        filename = %upload.filename,
        size = upload.data.len(),
        "Upload received"
    );

    let stored = state
        .store
        .put(upload.data, &upload.filename, upload.content_type.as_deref())
        .await
        .map_err(|e| AppError::storage("upload object", e))?;

    info!(key = %stored.key, "Upload stored");

    Ok(Json(UploadResponse {
        object_name: stored.key,
        url: stored.url,
    }))
}

/// Pull the `file` part out of the form. The extension is checked from the
/// part headers before any bytes are read.
async fn read_file_field(multipart: &mut Multipart) -> AppResult<Option<FileUpload>> {
    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        match file_extension(&filename) {
            Some(ext) if is_allowed_extension(ext) => {}
            _ => {
                return Err(AppError::BadRequest(
                    "Only JPG/PNG images are supported".to_string(),
                ))
            }
        }

        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(form_error)?;
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds {} bytes",
                MAX_UPLOAD_BYTES
            )));
        }

        return Ok(Some(FileUpload {
            filename,
            content_type,
            data,
        }));
    }

    Ok(None)
}

fn form_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(format!("Failed to parse form: {}", err.body_text()))
    }
}

/// GET /download/{key}
async fn download_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Response> {
    let object = state
        .store
        .get(&key)
        .await
        .map_err(|e| AppError::storage("download object", e))?;

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&content_type_for(&key)) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(object.bytes.len()));
    if let Some(value) = object
        .last_modified
        .as_deref()
        .and_then(|lm| HeaderValue::from_str(lm).ok())
    {
        headers.insert(header::LAST_MODIFIED, value);
    }

    Ok((StatusCode::OK, headers, object.bytes).into_response())
}
