//! In-memory content source for bundled corpora.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use yatra_core::{StorageError, YatraResult};

use super::{ContentAddress, ContentSource, RawDocument};

/// Path-keyed table of documents, filled before the resolver is built.
#[derive(Debug, Default)]
pub struct InMemoryContentSource {
    documents: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(path, bytes)` pairs, e.g. an `include_bytes!` table.
    pub fn from_documents<I, P, B>(documents: I) -> Self
    where
        I: IntoIterator<Item = (P, B)>,
        P: Into<String>,
        B: Into<Vec<u8>>,
    {
        let documents = documents
            .into_iter()
            .map(|(p, b)| (p.into(), b.into()))
            .collect();
        Self {
            documents: RwLock::new(documents),
        }
    }

    pub fn insert(&self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.documents
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), bytes.into());
    }

    pub fn insert_json(&self, path: impl Into<String>, value: &serde_json::Value) {
        self.insert(path, value.to_string());
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContentSource for InMemoryContentSource {
    async fn fetch(&self, address: &ContentAddress) -> YatraResult<Option<RawDocument>> {
        let documents = self.documents.read().map_err(|_| StorageError::Unavailable {
            path: address.path.clone(),
            reason: "document table lock poisoned".to_string(),
        })?;
        Ok(documents
            .get(&address.path)
            .map(|bytes| RawDocument::new(address.path.clone(), bytes.clone())))
    }
}
