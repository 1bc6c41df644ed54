//! Error types for Yatra operations
//!
//! Absence of content is NOT an error anywhere in this taxonomy: resolvers
//! return `Ok(None)` for it. Every variant here means something is broken.

use thiserror::Error;

use crate::identity::{ContentKey, Domain};

/// A located document could not be turned into its domain shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("Malformed document {key}: {reason}")]
    Malformed { key: ContentKey, reason: String },

    #[error("Document {key} declares slug {found}")]
    SlugMismatch { key: ContentKey, found: String },

    #[error("Document {key} lists card {slug} more than once")]
    DuplicateCard { key: ContentKey, slug: String },
}

/// The content store failed to read a document that may exist.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Content store unavailable for {path}: {reason}")]
    Unavailable { path: String, reason: String },
}

/// Caller input that cannot address any document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid locale: {value:?}")]
    InvalidLocale { value: String },

    #[error("Invalid slug: {value:?}")]
    InvalidSlug { value: String },

    #[error("Unknown domain: {value:?}")]
    UnknownDomain { value: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Cannot read configuration from {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Domain registry errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("No descriptor registered for domain {domain}")]
    NotRegistered { domain: Domain },

    #[error("Extension for {expected} read from a {found} document")]
    ExtensionMismatch { expected: Domain, found: Domain },
}

/// Master error type for all Yatra errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum YatraError {
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl YatraError {
    /// The document was found but could not be parsed or validated.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Content(_))
    }

    /// The store itself failed.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// The key that failed, when the error concerns one document.
    pub fn content_key(&self) -> Option<&ContentKey> {
        match self {
            Self::Content(ContentError::Malformed { key, .. })
            | Self::Content(ContentError::SlugMismatch { key, .. })
            | Self::Content(ContentError::DuplicateCard { key, .. }) => Some(key),
            _ => None,
        }
    }
}

/// Result type alias for Yatra operations.
pub type YatraResult<T> = Result<T, YatraError>;

// =============================================================================
// TESTS
// =============================================================================
