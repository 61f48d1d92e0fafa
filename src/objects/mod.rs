use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::errors::Result;

mod local;
pub use local::Local;
pub use local::LocalConfig;

mod s3;
pub use s3::S3Config;
pub use s3::S3;

/// Common interface over the backend object stores.
///
/// `put` and `delete` talk to the backend; `resolve` is pure string
/// construction and never touches the network. Implementations are cheap to
/// clone so they can be shared across request handlers.
#[async_trait]
pub trait ObjectStore: Clone + Send + Sync + 'static {
    /// Writes a blob under `key`. Key uniqueness is the caller's
    /// responsibility; see [`ObjectKey::generate`].
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<()>;

    /// Removes the blob under `key`. Callers in the deletion path treat a
    /// failure here as non-fatal.
    async fn delete(&self, key: &str) -> Result<()>;

    /// The publicly resolvable URL for `key`.
    fn resolve(&self, key: &str) -> String;
}

/// A collision-resistant object key: a random v4 UUID joined with the
/// sanitized original filename, so repeated uploads of `cat.png` never
/// collide while the key stays human-readable and keeps its extension.
pub struct ObjectKey(String);

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

impl ObjectKey {
    pub fn generate(filename: &str) -> Self {
        ObjectKey(format!("{}-{}", Uuid::new_v4(), sanitize(filename)))
    }
}

/// Strips directory components and anything outside `[A-Za-z0-9._-]` so the
/// key is safe as both a filesystem name and an S3 object key.
fn sanitize(filename: &str) -> String {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);
    let cleaned = UNSAFE_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cat.png", "cat.png")]
    #[case("my photo (1).png", "my_photo_1_.png")]
    #[case("../../etc/passwd", "passwd")]
    #[case("C:\\Users\\me\\dog.jpg", "dog.jpg")]
    #[case("", "file")]
    #[case("///", "file")]
    fn sanitizes_filenames(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn keys_preserve_extension() {
        let key = ObjectKey::generate("cat.png");
        assert!(key.as_ref().ends_with("-cat.png"));
    }

    #[test]
    fn keys_are_unique_for_identical_filenames() {
        let a = ObjectKey::generate("cat.png");
        let b = ObjectKey::generate("cat.png");
        assert_ne!(a.as_ref(), b.as_ref());
    }

    #[test]
    fn keys_never_contain_path_separators() {
        let key = ObjectKey::generate("../../../evil.sh");
        assert!(!key.as_ref().contains('/'));
        assert!(!key.as_ref().contains('\\'));
    }
}
