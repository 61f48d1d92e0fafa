use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;

use super::ObjectStore;
use crate::errors::Result;

#[derive(Clone, Deserialize)]
pub struct LocalConfig {
    /// Directory blobs are written into. Created on first write.
    pub directory: PathBuf,
    /// Route the directory is served under, e.g. `/files`. Must start with
    /// a slash; resolved URLs are path-based relative to the server itself.
    pub public_url: String,
}

impl LocalConfig {
    pub fn new_objects(&self) -> Local {
        Local {
            directory: self.directory.clone(),
            public_url: self.public_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Local-disk object store. Keys are generated by [`super::ObjectKey`] and
/// contain no path separators, so joining them onto the base directory is
/// safe.
#[derive(Clone)]
pub struct Local {
    directory: PathBuf,
    public_url: String,
}

impl Local {
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn public_url(&self) -> &str {
        &self.public_url
    }
}

#[async_trait]
impl ObjectStore for Local {
    async fn put(&self, key: &str, body: Bytes, _content_type: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.directory).await?;
        tokio::fs::write(self.directory.join(key), &body).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        tokio::fs::remove_file(self.directory.join(key)).await?;
        Ok(())
    }

    fn resolve(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path) -> Local {
        LocalConfig {
            directory: dir.to_path_buf(),
            public_url: "/files/".to_string(),
        }
        .new_objects()
    }

    #[tokio::test]
    async fn put_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir.path().join("objects"));

        store
            .put("abc-cat.png", Bytes::from_static(b"meow"), "image/png")
            .await
            .unwrap();
        let written = tokio::fs::read(dir.path().join("objects/abc-cat.png"))
            .await
            .unwrap();
        assert_eq!(written, b"meow");

        store.delete("abc-cat.png").await.unwrap();
        assert!(!dir.path().join("objects/abc-cat.png").exists());
    }

    #[tokio::test]
    async fn delete_of_missing_blob_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.delete("no-such-key").await.is_err());
    }

    #[test]
    fn resolve_builds_path_url_without_double_slash() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert_eq!(store.resolve("abc-cat.png"), "/files/abc-cat.png");
    }
}
