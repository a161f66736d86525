//! File Service
//!
//! Stores uploads under generated IDs and resolves downloads back to the
//! name the uploader used.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::infrastructure::storage::DiskFileStore;
use crate::shared::error::AppError;

/// Public URL prefix the upload directory is served under.
pub const UPLOAD_URL_PREFIX: &str = "/static/uploads";

/// An upload as received from the client.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub room: String,
    pub username: String,
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Where an upload ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub file_id: String,
    pub file_name: String,
    pub file_url: String,
}

/// A stored file ready to be streamed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub path: PathBuf,
}

pub struct FileService {
    store: Arc<DiskFileStore>,
}

impl FileService {
    pub fn new(store: Arc<DiskFileStore>) -> Self {
        Self { store }
    }

    pub async fn upload(&self, upload: FileUpload) -> Result<StoredUpload, AppError> {
        if upload.file_name.trim().is_empty() {
            return Err(AppError::Validation("file name must not be empty".into()));
        }

        let file_id = format!("{}{}", Uuid::new_v4().simple(), extension_of(&upload.file_name));
        self.store
            .store(&file_id, &upload.file_name, &upload.data)
            .await?;

        tracing::info!(
            room = %upload.room,
            username = %upload.username,
            file_id = %file_id,
            bytes = upload.data.len(),
            "File uploaded"
        );

        Ok(StoredUpload {
            file_url: format!("{}/{}", UPLOAD_URL_PREFIX, file_id),
            file_id,
            file_name: upload.file_name,
        })
    }

    pub async fn download(&self, file_id: &str) -> Result<Download, AppError> {
        if !is_plain_id(file_id) {
            return Err(AppError::BadRequest("invalid file id".into()));
        }

        let path = self
            .store
            .locate(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".into()))?;
        let file_name = self
            .store
            .original_name(file_id)
            .await
            .unwrap_or_else(|| file_id.to_string());

        Ok(Download { file_name, path })
    }
}

/// `.ext` of a client file name, limited to alphanumerics; empty when absent.
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

// IDs are generated by `upload`; anything that could walk out of the
// upload directory is rejected.
fn is_plain_id(file_id: &str) -> bool {
    !file_id.is_empty()
        && file_id != crate::infrastructure::storage::FILE_MAP_NAME
        && !file_id.contains(['/', '\\'])
        && !file_id.contains("..")
}
