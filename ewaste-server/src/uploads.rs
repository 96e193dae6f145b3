//! Image upload storage.
//!
//! Files land in the configured directory as `<unix_millis>-<name>` and are
//! referenced from listings as `/uploads/<file>`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::io::AsyncWriteExt;

/// URL prefix the upload directory is served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

const MAX_NAME_ATTEMPTS: i128 = 16;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes uploaded images below one directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Store `bytes` and return the public reference, e.g.
    /// `/uploads/1700000000000-laptop.jpg`.
    pub async fn save(
        &self,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        let name = sanitize_file_name(original_name.unwrap_or_default());
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;

        // Two uploads of the same name in the same millisecond take the next free slot.
        let mut attempt = 0;
        loop {
            let file_name = format!("{}-{name}", millis + attempt);
            let path = self.dir.join(&file_name);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    tracing::debug!(path = %path.display(), size = bytes.len(), "Upload stored");
                    return Ok(format!("{UPLOADS_ROUTE}/{file_name}"));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_NAME_ATTEMPTS => {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Reduce a client supplied file name to a safe single path component.
fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
