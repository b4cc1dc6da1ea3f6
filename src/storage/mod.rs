// Upload/output persistence
// One file per request: uploads are named from the sanitized client id plus
// label, outputs from object name plus lens slug. Nothing here is garbage
// collected; files accumulate until an operator clears the directories.

use base64::{engine::general_purpose, Engine};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::errors::StorageError;
use crate::sanitize::sanitize_slug;

static MIME_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"image/([a-zA-Z0-9.+-]+)").unwrap());

/// Maximum client-id slug length used in upload filenames.
const CLIENT_ID_SLUG_MAX: usize = 20;

/// A persisted upload: where it landed on disk and how callers can fetch it.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub public_url: String,
}

/// Filesystem layout for uploaded photos and generated overlays.
#[derive(Debug, Clone)]
pub struct Storage {
    upload_dir: PathBuf,
    output_dir: PathBuf,
    public_base_url: String,
}

impl Storage {
    pub fn new(
        upload_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create both directories; called once at startup.
    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        for dir in [&self.upload_dir, &self.output_dir] {
            std::fs::create_dir_all(dir).map_err(|e| StorageError::WriteFailed {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        info!(
            "Storage ready: uploads={} outputs={}",
            self.upload_dir.display(),
            self.output_dir.display()
        );
        Ok(())
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Decode a base64 image payload (optionally with a `data:image/...;base64,`
    /// header), save it under the uploads directory, and return the path plus
    /// the externally reachable URL.
    pub fn persist_upload(
        &self,
        image_base64: &str,
        client_object_id: &str,
        label: &str,
    ) -> Result<StoredUpload, StorageError> {
        if image_base64.is_empty() {
            return Err(StorageError::MissingImagePayload);
        }

        let (header, encoded) = match image_base64.split_once(',') {
            Some((header, encoded)) => (header, encoded),
            None => ("", image_base64),
        };

        let binary = general_purpose::STANDARD.decode(encoded.trim())?;
        let extension = infer_extension(header);

        let id_slug: String = sanitize_slug(client_object_id, "object")
            .chars()
            .take(CLIENT_ID_SLUG_MAX)
            .collect();
        let label_slug = sanitize_slug(label, "object");
        let filename = format!("{}_{}.{}", id_slug, label_slug, extension);
        let path = self.upload_dir.join(&filename);

        std::fs::write(&path, &binary).map_err(|e| StorageError::WriteFailed {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(StoredUpload {
            path,
            public_url: format!("{}/uploads/{}", self.public_base_url, filename),
        })
    }

    /// Path and public URL of a previously uploaded `<object>.png`, for the
    /// re-annotate endpoint. Missing file is an input error.
    pub fn existing_upload(&self, object_name: &str) -> Result<StoredUpload, StorageError> {
        let filename = format!("{}.png", object_name);
        let path = self.upload_dir.join(&filename);
        if !path.exists() {
            return Err(StorageError::UploadNotFound(object_name.to_string()));
        }
        Ok(StoredUpload {
            public_url: format!("{}/uploads/{}", self.public_base_url, filename),
            path,
        })
    }

    /// Read a generated overlay back and base64-encode it for transport.
    pub fn encode_file_base64(&self, path: &Path) -> Result<String, StorageError> {
        if !path.exists() {
            return Err(StorageError::MissingOverlay(path.display().to_string()));
        }
        let bytes = std::fs::read(path).map_err(|e| StorageError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(general_purpose::STANDARD.encode(bytes))
    }
}

/// Extension from a data-URL header; jpeg is normalized to jpg, default png.
fn infer_extension(header: &str) -> String {
    let extension = MIME_EXTENSION
        .captures(header)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "png".to_string());
    extension.replace("jpeg", "jpg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine};

    fn storage(dir: &Path) -> Storage {
        Storage::new(
            dir.join("uploads"),
            dir.join("outputs"),
            "http://127.0.0.1:5050/",
        )
    }

    #[test]
    fn test_infer_extension() {
        assert_eq!(infer_extension("data:image/png;base64"), "png");
        assert_eq!(infer_extension("data:image/jpeg;base64"), "jpg");
        assert_eq!(infer_extension("data:image/webp;base64"), "webp");
        assert_eq!(infer_extension(""), "png");
    }

    #[test]
    fn test_persist_upload_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = storage(tmp.path());
        storage.ensure_dirs().unwrap();

        let payload = general_purpose::STANDARD.encode(b"fake image bytes");
        let stored = storage
            .persist_upload(&format!("data:image/png;base64,{}", payload), "abc-123", "Water Bottle")
            .unwrap();

        assert!(stored.path.exists());
        assert!(stored
            .public_url
            .ends_with("/uploads/abc-123_Water-Bottle.png"));
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"fake image bytes");
    }

    #[test]
    fn test_persist_upload_without_header_and_long_id() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = storage(tmp.path());
        storage.ensure_dirs().unwrap();

        let payload = general_purpose::STANDARD.encode(b"x");
        let long_id = "a".repeat(64);
        let stored = storage.persist_upload(&payload, &long_id, "cup").unwrap();

        let filename = stored.path.file_name().unwrap().to_str().unwrap();
        assert_eq!(filename, format!("{}_cup.png", "a".repeat(20)));
    }

    #[test]
    fn test_persist_upload_rejects_bad_input() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = storage(tmp.path());
        storage.ensure_dirs().unwrap();

        assert!(matches!(
            storage.persist_upload("", "id", "cup"),
            Err(StorageError::MissingImagePayload)
        ));
        assert!(matches!(
            storage.persist_upload("not-valid-base64!!!", "id", "cup"),
            Err(StorageError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_existing_upload_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = storage(tmp.path());
        storage.ensure_dirs().unwrap();

        assert!(matches!(
            storage.existing_upload("ghost"),
            Err(StorageError::UploadNotFound(_))
        ));
    }

    #[test]
    fn test_encode_file_base64() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = storage(tmp.path());
        storage.ensure_dirs().unwrap();

        let path = storage.output_dir().join("cup_math.png");
        std::fs::write(&path, b"overlay").unwrap();
        let encoded = storage.encode_file_base64(&path).unwrap();
        assert_eq!(
            general_purpose::STANDARD.decode(encoded).unwrap(),
            b"overlay"
        );

        assert!(matches!(
            storage.encode_file_base64(Path::new("missing.png")),
            Err(StorageError::MissingOverlay(_))
        ));
    }
}
