//! File storage abstraction for uploaded documents and resources.
//!
//! Business logic talks to the [`FileStorage`] trait; [`LocalFileStorage`]
//! writes under a base directory and serves files from a public URL prefix.
//!
//! # Example
//!
//! ```ignore
//! use scolaris_core::file_storage::{FileStorage, LocalFileStorage, UploadKind};
//!
//! let storage = LocalFileStorage::new(PathBuf::from("./storage/uploads"), "/uploads".into(), 10 << 20);
//! let key = UploadKind::Document.storage_key("Relevé de notes.pdf", chrono::Utc::now())?;
//! storage.save(&key, &bytes).await?;
//! let url = storage.get_url(&key)?;
//! ```

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use chrono::{DateTime, Utc};
use tokio::fs;

pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

pub trait FileStorage: Send + Sync {
    /// Stores `content` under `key` and returns the key.
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String>;

    /// Removes the object. Missing objects are not an error.
    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;

    fn get_url(&self, key: &str) -> Result<String, StorageError>;
}

#[derive(Debug)]
pub enum StorageError {
    InvalidFileSize { max_bytes: usize },
    InvalidExtension { received: String, allowed: Vec<String> },
    IoError(std::io::Error),
    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFileSize { max_bytes } => {
                write!(f, "File exceeds maximum size of {} bytes", max_bytes)
            }
            Self::InvalidExtension { received, allowed } => write!(
                f,
                "File type not allowed: '{}'. Allowed types: {}",
                received,
                allowed.join(", ")
            ),
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::InvalidKey(msg) => write!(f, "Invalid storage key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// What an upload is for; decides the key prefix and accepted extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Document,
    Resource,
}

const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "png", "jpg", "jpeg"];
const RESOURCE_EXTENSIONS: &[&str] = &["pdf", "docx", "png", "jpg", "jpeg", "xlsx", "pptx"];

impl UploadKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Document => "documents",
            Self::Resource => "resources",
        }
    }

    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Document => DOCUMENT_EXTENSIONS,
            Self::Resource => RESOURCE_EXTENSIONS,
        }
    }

    /// Returns the lowercased extension if it is accepted for this kind.
    pub fn validate_extension(self, filename: &str) -> Result<String, StorageError> {
        let ext = file_extension(filename).unwrap_or_default();
        if self.allowed_extensions().contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(StorageError::InvalidExtension {
                received: ext,
                allowed: self
                    .allowed_extensions()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            })
        }
    }

    /// `<prefix>/<millis>-<sanitized name>`
    pub fn storage_key(self, filename: &str, now: DateTime<Utc>) -> Result<String, StorageError> {
        self.validate_extension(filename)?;
        Ok(format!(
            "{}/{}-{}",
            self.prefix(),
            now.timestamp_millis(),
            sanitize_filename(filename)
        ))
    }
}

pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Replaces every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    // a name made only of dots would produce a traversal segment
    if cleaned.chars().all(|c| c == '.') {
        "file".to_string()
    } else {
        cleaned.replace("..", "_")
    }
}

#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
    max_file_size: usize,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String, max_file_size: usize) -> Self {
        Self {
            base_dir,
            base_url,
            max_file_size,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with '/'".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.'))
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String> {
        Box::pin(async move {
            Self::validate_key(key)?;

            if content.len() > self.max_file_size {
                return Err(StorageError::InvalidFileSize {
                    max_bytes: self.max_file_size,
                });
            }

            let file_path = self.base_dir.join(key);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&file_path, content).await?;

            Ok(key.to_string())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            Self::validate_key(key)?;

            match fs::remove_file(self.base_dir.join(key)).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn storage(dir: &Path) -> LocalFileStorage {
        LocalFileStorage::new(dir.to_path_buf(), "/uploads/".to_string(), 16)
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("scolaris-{}-{}", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_validate_key() {
        assert!(LocalFileStorage::validate_key("documents/1700000000000-cv.pdf").is_ok());
        assert!(LocalFileStorage::validate_key("../../../etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("/etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("..\\windows\\system32").is_err());
        assert!(LocalFileStorage::validate_key("documents/a b.pdf").is_err());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Relevé de notes.pdf"), "Relev__de_notes.pdf");
        assert_eq!(sanitize_filename("../../secret.pdf"), "secret.pdf");
        assert_eq!(sanitize_filename("C:\\tmp\\cv final.docx"), "cv_final.docx");
        assert_eq!(sanitize_filename(".."), "file");
    }

    #[test]
    fn test_extension_allow_lists() {
        assert_eq!(
            UploadKind::Document.validate_extension("Scan.JPG").unwrap(),
            "jpg"
        );
        assert!(UploadKind::Document.validate_extension("grades.xlsx").is_err());
        assert!(UploadKind::Resource.validate_extension("grades.xlsx").is_ok());
        assert!(UploadKind::Resource.validate_extension("slides.pptx").is_ok());
        assert!(UploadKind::Resource.validate_extension("script.sh").is_err());
        assert!(UploadKind::Resource.validate_extension("noextension").is_err());
    }

    #[test]
    fn test_storage_key_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let key = UploadKind::Resource
            .storage_key("cours 1.pptx", now)
            .unwrap();
        assert_eq!(key, format!("resources/{}-cours_1.pptx", now.timestamp_millis()));
        assert!(LocalFileStorage::validate_key(&key).is_ok());
    }

    #[test]
    fn test_get_url_trims_trailing_slash() {
        let s = storage(Path::new("./unused"));
        assert_eq!(
            s.get_url("documents/a.pdf").unwrap(),
            "/uploads/documents/a.pdf"
        );
    }

    #[tokio::test]
    async fn test_save_and_delete_roundtrip_on_disk() {
        let dir = temp_dir("save");
        let s = storage(&dir);

        let key = s.save("documents/a.pdf", b"%PDF-1.4").await.unwrap();
        assert_eq!(key, "documents/a.pdf");
        assert!(dir.join("documents/a.pdf").exists());

        s.delete("documents/a.pdf").await.unwrap();
        assert!(!dir.join("documents/a.pdf").exists());
        // deleting twice is fine
        s.delete("documents/a.pdf").await.unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_save_rejects_oversized_content() {
        let dir = temp_dir("size");
        let s = storage(&dir);
        let err = s.save("documents/big.pdf", &[0u8; 32]).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidFileSize { max_bytes: 16 }));
    }
}
