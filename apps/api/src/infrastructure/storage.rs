// Object storage for uploaded images
//
// Objects live under `<root>/<bucket>/<folder>/<uuid>.<ext>` and are served
// at `<public_base_url>/storage/<bucket>/<key>`.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),
    #[error("Invalid folder: {0}")]
    InvalidFolder(String),
    #[error("Invalid image URL format")]
    InvalidUrl,
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port for storing and removing public files
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` under a fresh key and returns the public URL
    async fn upload(
        &self,
        bucket: &str,
        folder: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError>;

    /// Removes the object behind a URL previously returned by `upload`
    async fn delete(&self, url: &str) -> Result<(), StorageError>;
}

/// Filesystem-backed object storage
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
    buckets: Vec<String>,
}

impl LocalObjectStorage {
    /// # Arguments
    /// * `root` - Directory holding one sub-directory per bucket
    /// * `public_base_url` - Origin the `/storage` route is served from
    /// * `buckets` - Known buckets; the first one is the fallback
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str, buckets: Vec<String>) -> Self {
        let buckets = if buckets.is_empty() {
            vec!["public".to_string()]
        } else {
            buckets
        };

        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            buckets,
        }
    }

    /// Known bucket name, or the fallback bucket for anything else
    pub fn resolve_bucket<'a>(&'a self, bucket: &'a str) -> &'a str {
        if self.buckets.iter().any(|b| b == bucket) {
            bucket
        } else {
            tracing::debug!(bucket, fallback = %self.buckets[0], "Unknown bucket, using fallback");
            &self.buckets[0]
        }
    }

    /// Splits a public URL back into bucket and object key
    pub fn parse_url(&self, url: &str) -> Result<(String, String), StorageError> {
        let parsed = Url::parse(url).map_err(|_| StorageError::InvalidUrl)?;
        let mut segments = parsed.path_segments().ok_or(StorageError::InvalidUrl)?;

        if segments.next() != Some("storage") {
            return Err(StorageError::InvalidUrl);
        }
        let bucket = segments
            .next()
            .filter(|b| self.buckets.iter().any(|known| known == b))
            .ok_or(StorageError::InvalidUrl)?
            .to_string();

        let key: Vec<&str> = segments.collect();
        if key.is_empty() || key.iter().any(|s| !is_safe_segment(s)) {
            return Err(StorageError::InvalidUrl);
        }

        Ok((bucket, key.join("/")))
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/storage/{}/{}", self.public_base_url, bucket, key)
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(
        &self,
        bucket: &str,
        folder: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let bucket = self.resolve_bucket(bucket);
        let folder = normalize_folder(folder)?;
        let ext = extension(file_name)?;
        let key = format!("{}/{}.{}", folder, Uuid::new_v4(), ext);

        let path = self.root.join(bucket).join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        tracing::info!(bucket, key = %key, size = bytes.len(), "Object stored");
        Ok(self.public_url(bucket, &key))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let (bucket, key) = self.parse_url(url)?;
        let path = self.root.join(&bucket).join(&key);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(bucket = %bucket, key = %key, "Object removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(bucket = %bucket, key = %key, "Object already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn normalize_folder(folder: &str) -> Result<String, StorageError> {
    let segments: Vec<&str> = folder.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() || !segments.iter().all(|s| is_safe_segment(s)) {
        return Err(StorageError::InvalidFolder(folder.to_string()));
    }
    Ok(segments.join("/"))
}

fn extension(file_name: &str) -> Result<String, StorageError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| (1..=10).contains(&e.len()) && e.chars().all(|c| c.is_ascii_alphanumeric()));

    ext.ok_or_else(|| StorageError::InvalidFileName(file_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(root: &Path) -> LocalObjectStorage {
        LocalObjectStorage::new(
            root,
            "http://localhost:3000/",
            vec!["public".to_string(), "avatars".to_string()],
        )
    }

    #[tokio::test]
    async fn upload_writes_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        let url = storage
            .upload("avatars", "users", "Me.PNG", b"png-bytes")
            .await
            .unwrap();

        assert!(url.starts_with("http://localhost:3000/storage/avatars/users/"));
        assert!(url.ends_with(".png"));

        let (bucket, key) = storage.parse_url(&url).unwrap();
        let stored = std::fs::read(dir.path().join(bucket).join(key)).unwrap();
        assert_eq!(stored, b"png-bytes");
    }

    #[tokio::test]
    async fn unknown_bucket_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let url = storage(dir.path())
            .upload("secret", "news", "a.jpg", b"x")
            .await
            .unwrap();
        assert!(url.contains("/storage/public/news/"));
    }

    #[tokio::test]
    async fn delete_removes_file_and_tolerates_missing_objects() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        let url = storage.upload("public", "news", "a.jpg", b"x").await.unwrap();

        storage.delete(&url).await.unwrap();
        let (bucket, key) = storage.parse_url(&url).unwrap();
        assert!(!dir.path().join(bucket).join(key).exists());

        storage.delete(&url).await.unwrap();
    }

    #[test]
    fn foreign_urls_are_rejected() {
        let storage = storage(Path::new("/tmp"));
        for url in [
            "not a url",
            "http://localhost:3000/images/a.png",
            "http://localhost:3000/storage/unknown/a.png",
            "http://localhost:3000/storage/public",
            "http://localhost:3000/storage/public/../etc/passwd",
        ] {
            assert!(
                matches!(storage.parse_url(url), Err(StorageError::InvalidUrl)),
                "{url}"
            );
        }
    }

    #[tokio::test]
    async fn invalid_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        assert!(matches!(
            storage.upload("public", "news", "noextension", b"x").await,
            Err(StorageError::InvalidFileName(_))
        ));
        assert!(matches!(
            storage.upload("public", "../up", "a.png", b"x").await,
            Err(StorageError::InvalidFolder(_))
        ));
    }
}
