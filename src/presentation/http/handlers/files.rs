//! File Handlers
//!
//! - `POST /upload_file` - Store an upload and announce it to the room
//! - `GET /download_file/{file_id}` - Download under the original name

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, HeaderValue},
    response::Response,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use validator::Validate;

use crate::application::services::FileUpload;
use crate::presentation::http::extractors::FormData;
use crate::presentation::websocket::{FileKind, FileNotice, JoinPath, OutboundEvent};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
    pub file_url: String,
}

pub async fn upload_file(
    State(state): State<AppState>,
    mut form: FormData,
) -> Result<Json<UploadResponse>, AppError> {
    let target = JoinPath {
        room: form.require_text("room")?,
        username: form.require_text("username")?,
    };
    target.validate().map_err(validation_error)?;
    let file = form.take_file("file")?;

    let stored = state
        .files
        .upload(FileUpload {
            room: target.room.clone(),
            username: target.username.clone(),
            file_name: file.file_name,
            data: file.data,
        })
        .await?;

    let notice = OutboundEvent::File(FileNotice {
        kind: FileKind::File,
        username: target.username,
        room: target.room.clone(),
        file_name: stored.file_name.clone(),
        file_id: stored.file_id.clone(),
        file_url: stored.file_url.clone(),
        timestamp: Utc::now(),
    });
    state.engine.broadcast_notice(&target.room, notice).await;

    Ok(Json(UploadResponse {
        file_id: stored.file_id,
        filename: stored.file_name,
        file_url: stored.file_url,
    }))
}

/// Streams the file from disk; range and conditional requests are honoured.
pub async fn download_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    let download = state.files.download(&file_id).await?;
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        header_safe_name(&download.file_name)
    ))
    .map_err(|e| AppError::Internal(e.to_string()))?;

    let mut response = match ServeFile::new(&download.path).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    };
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok(response)
}

/// Printable ASCII only; quotes and anything else become `_`.
fn header_safe_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
