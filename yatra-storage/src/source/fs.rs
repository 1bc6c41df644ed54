//! Filesystem content source rooted at the corpus directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use yatra_core::{StorageError, YatraResult};

use super::{ContentAddress, ContentSource, RawDocument};

/// Reads documents from `<root>/<path>` with non-blocking tokio file I/O.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ContentSource for FsContentSource {
    async fn fetch(&self, address: &ContentAddress) -> YatraResult<Option<RawDocument>> {
        let path = self.root.join(&address.path);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(RawDocument::new(address.path.clone(), bytes))),
            // A missing locale directory is as absent as a missing file.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Unavailable {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yatra_core::{ContentKey, Domain, Locale, Slug, YatraError};

    fn address(path: &str) -> ContentAddress {
        let key = ContentKey::detail(
            Domain::Festivals,
            Slug::new("diwali").unwrap(),
            Locale::english(),
        );
        ContentAddress::new(key, path)
    }

    #[tokio::test]
    async fn test_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("festivals/en/detail")).unwrap();
        std::fs::write(
            dir.path().join("festivals/en/detail/diwali.json"),
            br#"{"slug":"diwali"}"#,
        )
        .unwrap();

        let source = FsContentSource::new(dir.path());
        let raw = source
            .fetch(&address("festivals/en/detail/diwali.json"))
            .await
            .unwrap()
            .expect("document should exist");
        assert_eq!(raw.path, "festivals/en/detail/diwali.json");
        assert_eq!(raw.bytes, br#"{"slug":"diwali"}"#);
    }

    #[tokio::test]
    async fn test_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsContentSource::new(dir.path());
        let result = source
            .fetch(&address("festivals/fr/detail/diwali.json"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_path_is_store_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where a file is expected cannot be read as a document.
        std::fs::create_dir_all(dir.path().join("festivals/en/master.json")).unwrap();

        let source = FsContentSource::new(dir.path());
        let err = source
            .fetch(&address("festivals/en/master.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, YatraError::Storage(StorageError::Unavailable { .. })));
    }
}
