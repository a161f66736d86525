//! Disk storage for uploaded files.
//!
//! Files are written flat into the upload directory under generated IDs.
//! The original file names are kept in `file_map.json` next to them so
//! downloads can be served under the name the uploader used.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::Mutex;

/// Name of the ID → original file name index inside the upload directory.
pub const FILE_MAP_NAME: &str = "file_map.json";

/// Disk-backed upload store.
#[derive(Debug)]
pub struct DiskFileStore {
    base_dir: PathBuf,
    // Serializes read-modify-write cycles on the name index
    index_lock: Mutex<()>,
}

impl DiskFileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            index_lock: Mutex::new(()),
        }
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.base_dir).await
    }

    /// Write a file and record its original name.
    pub async fn store(&self, file_id: &str, original_name: &str, data: &[u8]) -> std::io::Result<()> {
        self.ensure_dir().await?;
        let full = self.base_dir.join(file_id);
        tokio::fs::write(&full, data).await?;

        let _guard = self.index_lock.lock().await;
        let mut names = self.read_index().await;
        names.insert(file_id.to_string(), original_name.to_string());
        let encoded = serde_json::to_vec(&names).map_err(std::io::Error::other)?;
        tokio::fs::write(self.base_dir.join(FILE_MAP_NAME), encoded).await?;

        tracing::debug!(path = %full.display(), bytes = data.len(), "File stored");
        Ok(())
    }

    /// Path of a stored file. Returns `None` when it does not exist.
    pub async fn locate(&self, file_id: &str) -> std::io::Result<Option<PathBuf>> {
        let full = self.base_dir.join(file_id);
        match tokio::fs::metadata(&full).await {
            Ok(meta) if meta.is_file() => Ok(Some(full)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Original name of a stored file, if the index knows it.
    pub async fn original_name(&self, file_id: &str) -> Option<String> {
        let _guard = self.index_lock.lock().await;
        self.read_index().await.remove(file_id)
    }

    /// A missing or corrupt index is treated as empty.
    async fn read_index(&self) -> HashMap<String, String> {
        match tokio::fs::read(self.base_dir.join(FILE_MAP_NAME)).await {
            Ok(raw) => serde_json::from_slice(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring unreadable file index");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        }
    }
}
