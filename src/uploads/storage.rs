use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// URL prefix under which stored files are served; also the prefix of
/// every `photo_path` saved in the database.
pub const PUBLIC_PREFIX: &str = "uploads";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub file_name: String,
    /// `uploads/<file_name>`, as persisted in `photo_path`.
    pub relative_path: String,
}

#[async_trait]
pub trait UploadStore: Send + Sync {
    async fn store(&self, original_name: &str, body: Bytes) -> anyhow::Result<StoredUpload>;
    /// `Ok(None)` when the file does not exist or the name is not a stored name.
    async fn open(&self, file_name: &str) -> anyhow::Result<Option<Bytes>>;
}

/// Reduce an untrusted client file name to `[A-Za-z0-9_.-]`, with no path
/// components. Accented letters fold to their ASCII base (NFKD, then
/// combining marks are dropped). May return an empty string.
pub fn sanitize_filename(name: &str) -> String {
    lazy_static! {
        static ref UNSAFE_RE: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
    }
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    UNSAFE_RE
        .replace_all(&joined, "")
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string()
}

pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Files kept flat in a single directory on local disk.
#[derive(Clone)]
pub struct LocalUploads {
    root: PathBuf,
}

impl LocalUploads {
    pub async fn new(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create upload dir {}", root.display()))?;
        debug!(root = %root.display(), "upload root ready");
        Ok(Self { root })
    }

    #[cfg(test)]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl UploadStore for LocalUploads {
    async fn store(&self, original_name: &str, body: Bytes) -> anyhow::Result<StoredUpload> {
        let mut file_name = sanitize_filename(original_name);
        if file_name.is_empty() {
            file_name = format!("upload-{}", Uuid::new_v4());
        }
        let path = self.root.join(&file_name);
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write upload {}", path.display()))?;
        info!(original = %original_name, stored = %file_name, bytes = body.len(), "upload stored");
        Ok(StoredUpload {
            relative_path: format!("{}/{}", PUBLIC_PREFIX, file_name),
            file_name,
        })
    }

    async fn open(&self, file_name: &str) -> anyhow::Result<Option<Bytes>> {
        if file_name.is_empty() || sanitize_filename(file_name) != file_name {
            debug!(file_name, "rejecting unsanitized upload name");
            return Ok(None);
        }
        let path = self.root.join(file_name);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read upload {}", path.display())),
        }
    }
}

#[cfg(test)]
mod storage_tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("photo.jpg"), "photo.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename("my cv photo.png"), "my_cv_photo.png");
        assert_eq!(sanitize_filename("résumé<1>.pdf"), "resume1.pdf");
        assert_eq!(sanitize_filename("résumé.png"), "resume.png");
        assert_eq!(sanitize_filename("Ångström ﬁle.jpg"), "Angstrom_file.jpg");
        assert_eq!(sanitize_filename("..."), "");
        assert_eq!(sanitize_filename(""), "");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.webp"), "image/webp");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn traversal_name_stays_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalUploads::new(dir.path().join("uploads")).await.unwrap();

        let stored = store
            .store("../../etc/passwd", Bytes::from_static(b"root:x:0:0"))
            .await
            .unwrap();
        assert_eq!(stored.file_name, "etc_passwd");
        assert_eq!(stored.relative_path, "uploads/etc_passwd");

        let on_disk = store.root().join("etc_passwd");
        assert!(on_disk.starts_with(store.root()));
        assert_eq!(std::fs::read(on_disk).unwrap(), b"root:x:0:0");
        assert!(!dir.path().join("etc").exists());
    }

    #[tokio::test]
    async fn empty_sanitized_name_gets_generated_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalUploads::new(dir.path()).await.unwrap();
        let stored = store.store("../..", Bytes::from_static(b"x")).await.unwrap();
        assert!(stored.file_name.starts_with("upload-"));
        assert!(store.root().join(&stored.file_name).exists());
    }

    #[tokio::test]
    async fn open_returns_stored_bytes_and_none_for_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalUploads::new(dir.path()).await.unwrap();
        store.store("me.png", Bytes::from_static(b"png")).await.unwrap();

        assert_eq!(store.open("me.png").await.unwrap().as_deref(), Some(&b"png"[..]));
        assert!(store.open("other.png").await.unwrap().is_none());
        assert!(store.open("../me.png").await.unwrap().is_none());
        assert!(store.open("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn store_surfaces_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalUploads::new(dir.path().join("uploads")).await.unwrap();
        std::fs::remove_dir(store.root()).unwrap();
        let err = store.store("a.png", Bytes::from_static(b"x")).await.unwrap_err();
        assert!(format!("{:#}", err).contains("write upload"));
    }
}
