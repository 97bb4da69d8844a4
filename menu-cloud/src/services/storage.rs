//! Object storage for uploaded images and generated QR codes
//!
//! Objects live under `{folder}/{file_name}`; `upload` returns the public
//! URL, `delete` takes that URL back.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` and return the object's public URL
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        folder: &str,
        file_name: &str,
    ) -> Result<String, BoxError>;

    /// Remove the object behind a URL previously returned by `upload`
    async fn delete(&self, url: &str) -> Result<(), BoxError>;
}

/// Join folder and file name into an object key, rejecting traversal
fn object_key(folder: &str, file_name: &str) -> Result<String, BoxError> {
    let key = format!("{}/{}", folder.trim_matches('/'), file_name.trim_matches('/'));
    let valid = key.split('/').all(|segment| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    });
    if !valid {
        return Err(format!("Invalid object key: {key}").into());
    }
    Ok(key)
}

/// Object key behind a public URL
fn key_from_url<'a>(base_url: &str, url: &'a str) -> Result<&'a str, BoxError> {
    let key = url
        .strip_prefix(base_url.trim_end_matches('/'))
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(|| format!("URL is not served by this storage: {url}"))?;
    if key.split('/').any(|s| s.is_empty() || s == "." || s == "..") {
        return Err(format!("Invalid object key in URL: {url}").into());
    }
    Ok(key)
}

// ── S3 ──

pub struct S3Storage {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
        folder: &str,
        file_name: &str,
    ) -> Result<String, BoxError> {
        let key = object_key(folder, file_name)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await?;
        tracing::info!(bucket = %self.bucket, key = %key, "Object uploaded to S3");
        Ok(format!("{}/{key}", self.public_base_url))
    }

    async fn delete(&self, url: &str) -> Result<(), BoxError> {
        let key = key_from_url(&self.public_base_url, url)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        tracing::info!(bucket = %self.bucket, key = %key, "Object deleted from S3");
        Ok(())
    }
}

// ── Local filesystem ──

/// Filesystem storage for development and tests
pub struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url: String = public_base_url.into();
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        _content_type: &str,
        folder: &str,
        file_name: &str,
    ) -> Result<String, BoxError> {
        let key = object_key(folder, file_name)?;
        let path = self.root.join(&key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), "Object written to local storage");
        Ok(format!("{}/{key}", self.public_base_url))
    }

    async fn delete(&self, url: &str) -> Result<(), BoxError> {
        let key = key_from_url(&self.public_base_url, url)?;
        tokio::fs::remove_file(self.root.join(key)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_reject_traversal() {
        assert_eq!(object_key("t1/qr", "menu.svg").unwrap(), "t1/qr/menu.svg");
        assert!(object_key("t1/../t2", "menu.svg").is_err());
        assert!(object_key("t1", "a b.png").is_err());
        assert!(object_key("", "x.png").is_err());
    }

    #[test]
    fn keys_come_back_from_urls() {
        assert_eq!(
            key_from_url("https://cdn.test/", "https://cdn.test/t1/qr/menu.svg").unwrap(),
            "t1/qr/menu.svg"
        );
        assert!(key_from_url("https://cdn.test", "https://other.test/t1/x.png").is_err());
        assert!(key_from_url("https://cdn.test", "https://cdn.test/t1/../x.png").is_err());
    }

    #[tokio::test]
    async fn local_upload_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:8080/uploads");

        let url = storage
            .upload(b"<svg/>".to_vec(), "image/svg+xml", "tenant-1/qr", "menu.svg")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8080/uploads/tenant-1/qr/menu.svg");
        let path = storage.root().join("tenant-1/qr/menu.svg");
        assert_eq!(std::fs::read(&path).unwrap(), b"<svg/>");

        storage.delete(&url).await.unwrap();
        assert!(!path.exists());
    }
}
