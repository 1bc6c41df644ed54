//! Yatra Storage - Content Sources and Resolution
//!
//! Turns `(domain, slug, locale)` requests into parsed, shared documents:
//! reads through a [`ContentSource`], parses via the domain's
//! [`DomainDescriptor`], falls back to the default locale on absence, and
//! memoizes every outcome in a single-flight [`ResolutionCache`].

pub mod cache;
pub mod descriptor;
pub mod fallback;
pub mod global;
pub mod resolver;
pub mod source;

// Re-export cache types for callers that inspect resolution behaviour
pub use cache::{CacheStats, Lookup, LookupSource, MemoPolicy, Outcome, ResolutionCache};

pub use descriptor::{
    parse_detail_json, parse_master_json, DetailParser, DomainDescriptor, DomainRegistry,
    MasterParser, PathTemplate,
};
pub use fallback::LocaleChain;
pub use resolver::{
    CachedDocument, Catalog, CatalogEntry, ContentResolver, Loaded, ResolvableDocument, Resolved,
};
pub use source::{ContentAddress, ContentSource, FsContentSource, InMemoryContentSource, RawDocument};
