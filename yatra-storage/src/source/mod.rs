//! Content sources: the read-only boundary between resolution and storage.
//!
//! A [`ContentSource`] maps a [`ContentAddress`] to raw bytes, or to absence.
//! It knows nothing about locales, fallback, or caching. The one contract
//! that matters: `Ok(None)` means "no such document", and `Err` means "the
//! store could not answer". Resolution treats the two very differently.

pub mod fs;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use yatra_core::{compute_content_hash, ContentHash, ContentKey, YatraResult};

pub use fs::FsContentSource;
pub use memory::InMemoryContentSource;

/// A key together with the storage path its domain descriptor maps it to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentAddress {
    pub key: ContentKey,
    pub path: String,
}

impl ContentAddress {
    pub fn new(key: ContentKey, path: impl Into<String>) -> Self {
        Self {
            key,
            path: path.into(),
        }
    }
}

/// Bytes read from the store, before any parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub path: String,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }

    pub fn content_hash(&self) -> ContentHash {
        compute_content_hash(&self.bytes)
    }
}

/// Read-only source of raw documents.
///
/// Implementations must be cheap to call concurrently; the resolution cache
/// guarantees each address is read at most once, but different addresses
/// are read in parallel.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Read the document at `address`.
    ///
    /// Returns `Ok(None)` when no document exists there. Any other failure
    /// (permissions, I/O, a corrupt bundle) is an error.
    async fn fetch(&self, address: &ContentAddress) -> YatraResult<Option<RawDocument>>;
}

#[async_trait]
impl<S: ContentSource + ?Sized> ContentSource for Arc<S> {
    async fn fetch(&self, address: &ContentAddress) -> YatraResult<Option<RawDocument>> {
        (**self).fetch(address).await
    }
}
