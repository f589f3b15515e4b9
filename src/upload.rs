//! Transient upload storage
//!
//! Each request streams its file into a uniquely named file under the upload
//! directory. The file is owned by a [`TempUpload`] guard and removed when the
//! guard is dropped, so every exit path of a handler cleans up after itself.

use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::formats::input_extension;
use crate::types::{AppError, AppResult};

#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    /// Reserve a fresh, empty file in `dir`.
    pub async fn create(dir: &Path) -> AppResult<(Self, File)> {
        fs::create_dir_all(dir).await?;
        let path = dir.join(Uuid::new_v4().simple().to_string());
        let guard = Self { path };
        let file = File::create(&guard.path).await?;
        Ok((guard, file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// Drop cannot await, so removal is a single synchronous unlink on the
// current worker thread.
impl Drop for TempUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temporary upload {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove temporary upload {}: {}", self.path.display(), e),
        }
    }
}

/// One upload-and-convert request, alive for the duration of the handler.
#[derive(Debug)]
pub struct ConversionRequest {
    pub upload: TempUpload,
    pub original_filename: String,
    pub input_format: String,
    pub output_format: String,
}

impl ConversionRequest {
    /// Read the `file` and `format` fields, storing the file under `upload_dir`.
    ///
    /// A missing file wins over a missing or bad format; the format itself is
    /// checked later against the active policy.
    pub async fn from_multipart(mut multipart: Multipart, upload_dir: &Path) -> AppResult<Self> {
        let mut upload: Option<(TempUpload, String)> = None;
        let mut output_format: Option<String> = None;

        while let Some(mut field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("file") if upload.is_none() => {
                    let Some(filename) = field
                        .file_name()
                        .map(str::to_string)
                        .filter(|name| !name.is_empty())
                    else {
                        continue;
                    };

                    let (guard, mut file) = TempUpload::create(upload_dir).await?;
                    let mut size = 0usize;
                    while let Some(chunk) = field.chunk().await? {
                        size += chunk.len();
                        file.write_all(&chunk).await?;
                    }
                    file.flush().await?;

                    debug!("Stored upload {:?} ({} bytes) at {}", filename, size, guard.path().display());
                    upload = Some((guard, filename));
                }
                Some("format") => {
                    output_format = Some(field.text().await?.trim().to_string());
                }
                _ => {}
            }
        }

        let (upload, original_filename) = upload.ok_or(AppError::MissingFile)?;

        Ok(Self {
            input_format: input_extension(&original_filename),
            upload,
            original_filename,
            output_format: output_format.unwrap_or_default(),
        })
    }

    pub fn path(&self) -> &Path {
        self.upload.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let (guard, mut file) = TempUpload::create(dir.path()).await.unwrap();
        file.write_all(b"payload").await.unwrap();
        drop(file);

        let path = guard.path().to_path_buf();
        assert!(path.exists());

        drop(guard);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_drop_after_external_removal_is_silent() {
        let dir = TempDir::new().unwrap();
        let (guard, file) = TempUpload::create(dir.path()).await.unwrap();
        drop(file);

        std::fs::remove_file(guard.path()).unwrap();
        drop(guard);
    }

    #[tokio::test]
    async fn test_guards_do_not_interfere() {
        let dir = TempDir::new().unwrap();
        let (first, _f1) = TempUpload::create(dir.path()).await.unwrap();
        let (second, _f2) = TempUpload::create(dir.path()).await.unwrap();
        assert_ne!(first.path(), second.path());

        let second_path = second.path().to_path_buf();
        drop(first);
        assert!(second_path.exists());

        drop(second);
        assert!(!second_path.exists());
    }

    #[tokio::test]
    async fn test_creates_missing_upload_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("uploads").join("incoming");
        let (guard, _file) = TempUpload::create(&nested).await.unwrap();
        assert!(guard.path().starts_with(&nested));
        assert!(nested.is_dir());
    }
}
