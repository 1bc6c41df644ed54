//! Yatra Core - Content Types
//!
//! Pure data structures for the localized content resolver. Every other crate
//! depends on this one. There is no I/O and no async here: just identifiers,
//! document shapes, the error taxonomy, and configuration.
//!
//! # Addressing
//!
//! A document is addressed by a [`ContentKey`]: `(domain, kind, slug, locale)`.
//! Master documents carry no slug; detail documents always carry one.

use sha2::{Digest, Sha256};

pub mod config;
pub mod document;
pub mod domains;
pub mod error;
pub mod identity;

pub use config::ResolverConfig;
pub use document::{
    CardSummary, ContentWarning, DetailDocument, Faq, HeroAssets, MasterDocument, Place,
    PropertySummary, SeoMetadata,
};
pub use domains::{
    CuisineDetails, DanceFormDetails, Dish, DomainExtension, FestivalDetails, ItineraryDay,
    RegionDetails, RoyalLuxuryDetails, SpiritualJourneyDetails, TrekDetails, TrekDifficulty,
};
pub use error::{
    ConfigError, ContentError, DomainError, StorageError, ValidationError, YatraError,
    YatraResult,
};
pub use identity::{ContentKey, DocumentKind, Domain, Locale, Slug};

/// Hex-encoded SHA-256 digest of raw document bytes.
pub type ContentHash = String;

/// Compute the SHA-256 content hash of a raw document.
pub fn compute_content_hash(content: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
