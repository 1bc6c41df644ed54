//! Master and detail resolution over the cache, fallback chain, and store.
//!
//! Per request:
//!
//! ```text
//! requested key ── alias hit ──────────────────────────────► done
//!      │
//!      └─ miss ─► for locale in [requested, default]:
//!                     entry hit ─────────────────────────────► done
//!                     miss ─► store read
//!                               ├─ absent ─► next locale (or NotFound)
//!                               ├─ failure ─► error, no fallback
//!                               └─ bytes ─► parse ─► entry + alias ─► done
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use yatra_core::{
    CardSummary, ContentError, ContentHash, ContentKey, ContentWarning, DetailDocument,
    DocumentKind, Domain, DomainError, DomainExtension, Locale, MasterDocument, ResolverConfig,
    Slug, YatraResult,
};

use crate::cache::{CacheStats, LookupSource, MemoPolicy, Outcome, ResolutionCache};
use crate::descriptor::{DomainDescriptor, DomainRegistry};
use crate::fallback::LocaleChain;
use crate::source::{ContentSource, FsContentSource};

// ============================================================================
// CACHED VALUES
// ============================================================================

/// A parsed document as it sits in the cache, with load metadata.
#[derive(Debug)]
pub struct Loaded<T> {
    pub document: Arc<T>,
    /// Key the document was found under (the resolved locale).
    pub key: ContentKey,
    pub path: String,
    pub content_hash: ContentHash,
    pub loaded_at: DateTime<Utc>,
    pub warnings: Vec<ContentWarning>,
}

/// Cache value covering both document shapes.
#[derive(Debug, Clone)]
pub enum CachedDocument {
    Master(Arc<Loaded<MasterDocument>>),
    Detail(Arc<Loaded<DetailDocument>>),
}

impl CachedDocument {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Master(_) => DocumentKind::Master,
            Self::Detail(_) => DocumentKind::Detail,
        }
    }
}

/// A document shape the resolver knows how to parse and cache.
pub trait ResolvableDocument: Sized + Send + Sync + 'static {
    const KIND: DocumentKind;

    /// Parse raw bytes and run the shape's post-parse checks.
    fn parse(
        descriptor: &DomainDescriptor,
        key: &ContentKey,
        bytes: &[u8],
    ) -> YatraResult<(Self, Vec<ContentWarning>)>;

    fn into_cached(loaded: Arc<Loaded<Self>>) -> CachedDocument;

    fn from_cached(cached: &CachedDocument) -> Option<Arc<Loaded<Self>>>;
}

impl ResolvableDocument for MasterDocument {
    const KIND: DocumentKind = DocumentKind::Master;

    fn parse(
        descriptor: &DomainDescriptor,
        key: &ContentKey,
        bytes: &[u8],
    ) -> YatraResult<(Self, Vec<ContentWarning>)> {
        let mut document = descriptor.parse_master(key, bytes)?;
        if let Some(slug) = document.duplicate_card() {
            return Err(ContentError::DuplicateCard {
                key: key.clone(),
                slug: slug.to_string(),
            }
            .into());
        }
        let warnings = document.filter_order();
        Ok((document, warnings))
    }

    fn into_cached(loaded: Arc<Loaded<Self>>) -> CachedDocument {
        CachedDocument::Master(loaded)
    }

    fn from_cached(cached: &CachedDocument) -> Option<Arc<Loaded<Self>>> {
        match cached {
            CachedDocument::Master(loaded) => Some(Arc::clone(loaded)),
            CachedDocument::Detail(_) => None,
        }
    }
}

impl ResolvableDocument for DetailDocument {
    const KIND: DocumentKind = DocumentKind::Detail;

    fn parse(
        descriptor: &DomainDescriptor,
        key: &ContentKey,
        bytes: &[u8],
    ) -> YatraResult<(Self, Vec<ContentWarning>)> {
        Ok((descriptor.parse_detail(key, bytes)?, Vec::new()))
    }

    fn into_cached(loaded: Arc<Loaded<Self>>) -> CachedDocument {
        CachedDocument::Detail(loaded)
    }

    fn from_cached(cached: &CachedDocument) -> Option<Arc<Loaded<Self>>> {
        match cached {
            CachedDocument::Detail(loaded) => Some(Arc::clone(loaded)),
            CachedDocument::Master(_) => None,
        }
    }
}

// ============================================================================
// RESOLUTION RESULTS
// ============================================================================

/// A resolved document plus how it was resolved.
#[derive(Debug)]
pub struct Resolved<T> {
    loaded: Arc<Loaded<T>>,
    requested: ContentKey,
    source: LookupSource,
}

impl<T> Clone for Resolved<T> {
    fn clone(&self) -> Self {
        Self {
            loaded: Arc::clone(&self.loaded),
            requested: self.requested.clone(),
            source: self.source,
        }
    }
}

impl<T> Resolved<T> {
    /// The shared, immutable document.
    pub fn document(&self) -> &Arc<T> {
        &self.loaded.document
    }

    pub fn into_document(self) -> Arc<T> {
        Arc::clone(&self.loaded.document)
    }

    pub fn requested_locale(&self) -> &Locale {
        self.requested.locale()
    }

    pub fn resolved_locale(&self) -> &Locale {
        self.loaded.key.locale()
    }

    pub fn resolved_key(&self) -> &ContentKey {
        &self.loaded.key
    }

    pub fn used_fallback(&self) -> bool {
        self.requested_locale() != self.resolved_locale()
    }

    pub fn warnings(&self) -> &[ContentWarning] {
        &self.loaded.warnings
    }

    pub fn path(&self) -> &str {
        &self.loaded.path
    }

    pub fn content_hash(&self) -> &str {
        &self.loaded.content_hash
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded.loaded_at
    }

    /// How the requested key was answered by the cache.
    pub fn source(&self) -> LookupSource {
        self.source
    }
}

impl Resolved<DetailDocument> {
    /// The detail's long-form fields as `T`, which must be the view of this
    /// document's domain.
    pub fn extension<T: DomainExtension>(&self) -> YatraResult<T> {
        let found = self.resolved_key().domain();
        if T::DOMAIN != found {
            return Err(DomainError::ExtensionMismatch {
                expected: T::DOMAIN,
                found,
            }
            .into());
        }
        self.document().extension::<T>().map_err(|e| {
            ContentError::Malformed {
                key: self.resolved_key().clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// One card of a catalog together with its detail document.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub card: CardSummary,
    pub detail: Resolved<DetailDocument>,
}

/// A master document with every card's detail resolved, in display order.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub master: Resolved<MasterDocument>,
    pub entries: Vec<CatalogEntry>,
    /// Cards whose detail document is absent in every fallback locale.
    pub warnings: Vec<ContentWarning>,
}

impl Catalog {
    /// Master warnings followed by catalog warnings.
    pub fn all_warnings(&self) -> Vec<ContentWarning> {
        self.master
            .warnings()
            .iter()
            .chain(self.warnings.iter())
            .cloned()
            .collect()
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Generic resolver for every content domain.
///
/// `Ok(None)` means the document is absent in the requested locale and in
/// the fallback locale. Every `Err` means something is broken: a malformed
/// document, a failing store, or a domain with no descriptor.
pub struct ContentResolver {
    source: Arc<dyn ContentSource>,
    registry: DomainRegistry,
    config: ResolverConfig,
    cache: Arc<ResolutionCache<CachedDocument>>,
}

impl ContentResolver {
    /// Resolver over `source`, with a descriptor for every domain.
    pub fn new(source: Arc<dyn ContentSource>, config: ResolverConfig) -> YatraResult<Self> {
        config.validate()?;
        Ok(Self {
            source,
            registry: DomainRegistry::standard(&config),
            cache: Arc::new(ResolutionCache::new(MemoPolicy::from_config(&config))),
            config,
        })
    }

    /// Resolver over the filesystem corpus at `config.content_root`.
    pub fn from_config(config: ResolverConfig) -> YatraResult<Self> {
        let source = Arc::new(FsContentSource::new(config.content_root.clone()));
        Self::new(source, config)
    }

    /// Replace the descriptor registry.
    pub fn with_registry(mut self, registry: DomainRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Add or replace one domain's descriptor.
    pub fn register(&mut self, descriptor: DomainDescriptor) {
        self.registry.register(descriptor);
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    pub fn supported_locales(&self) -> &[Locale] {
        &self.config.supported_locales
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every cached entry. Production code never needs this; tests use
    /// it to isolate cases sharing one resolver.
    pub fn clear(&self) {
        self.cache.clear();
    }

    // === Public API ===

    /// Master catalog for `domain` in `locale`, or `None` when absent.
    pub async fn get_master(
        &self,
        domain: Domain,
        locale: &Locale,
    ) -> YatraResult<Option<Arc<MasterDocument>>> {
        Ok(self
            .resolve_master(domain, locale)
            .await?
            .map(Resolved::into_document))
    }

    /// Detail document for `slug`, or `None` when absent.
    pub async fn get_detail(
        &self,
        domain: Domain,
        slug: &Slug,
        locale: &Locale,
    ) -> YatraResult<Option<Arc<DetailDocument>>> {
        Ok(self
            .resolve_detail(domain, slug, locale)
            .await?
            .map(Resolved::into_document))
    }

    /// Like [`ContentResolver::get_master`], with resolution metadata.
    pub async fn resolve_master(
        &self,
        domain: Domain,
        locale: &Locale,
    ) -> YatraResult<Option<Resolved<MasterDocument>>> {
        self.resolve(ContentKey::master(domain, locale.clone())).await
    }

    /// Like [`ContentResolver::get_detail`], with resolution metadata.
    pub async fn resolve_detail(
        &self,
        domain: Domain,
        slug: &Slug,
        locale: &Locale,
    ) -> YatraResult<Option<Resolved<DetailDocument>>> {
        self.resolve(ContentKey::detail(domain, slug.clone(), locale.clone()))
            .await
    }

    /// Master catalog plus every card's detail, in display order.
    ///
    /// Details are resolved concurrently. A card without a detail document
    /// is skipped with a warning; the first malformed or unreadable detail
    /// fails the whole catalog.
    pub async fn resolve_catalog(
        &self,
        domain: Domain,
        locale: &Locale,
    ) -> YatraResult<Option<Catalog>> {
        let Some(master) = self.resolve_master(domain, locale).await? else {
            return Ok(None);
        };

        let cards: Vec<CardSummary> = master
            .document()
            .ordered_cards()
            .into_iter()
            .cloned()
            .collect();
        let details = try_join_all(
            cards
                .iter()
                .map(|card| self.resolve_detail(domain, &card.slug, locale)),
        )
        .await?;

        let mut entries = Vec::with_capacity(cards.len());
        let mut warnings = Vec::new();
        for (card, detail) in cards.into_iter().zip(details) {
            match detail {
                Some(detail) => entries.push(CatalogEntry { card, detail }),
                None => {
                    tracing::warn!(
                        domain = %domain,
                        locale = %locale,
                        slug = %card.slug,
                        "catalog card has no detail document"
                    );
                    warnings.push(ContentWarning::MissingDetail {
                        slug: card.slug.to_string(),
                    });
                }
            }
        }

        Ok(Some(Catalog {
            master,
            entries,
            warnings,
        }))
    }

    // === Internals ===

    async fn resolve<D: ResolvableDocument>(
        &self,
        requested: ContentKey,
    ) -> YatraResult<Option<Resolved<D>>> {
        let descriptor = self.registry.get(requested.domain())?;
        let cache = Arc::clone(&self.cache);
        let source = Arc::clone(&self.source);
        let walk_key = requested.clone();

        let lookup = self
            .cache
            .resolve(&requested, move || async move {
                let chain = LocaleChain::new(
                    walk_key.locale().clone(),
                    descriptor.default_locale().clone(),
                );
                chain
                    .walk(|locale| {
                        load_exact::<D>(&cache, &source, &descriptor, walk_key.with_locale(locale))
                    })
                    .await
            })
            .await;

        match lookup.source {
            LookupSource::Hit => tracing::debug!(key = %requested, "resolution cache hit"),
            LookupSource::Coalesced => {
                tracing::debug!(key = %requested, "joined in-flight resolution")
            }
            LookupSource::Loaded => {}
        }

        let Some(cached) = lookup.value? else {
            tracing::debug!(key = %requested, "not found in any fallback locale");
            return Ok(None);
        };
        let loaded = D::from_cached(&cached).ok_or_else(|| ContentError::Malformed {
            key: requested.clone(),
            reason: format!("expected {} document, cache holds {}", D::KIND, cached.kind()),
        })?;

        Ok(Some(Resolved {
            loaded,
            requested,
            source: lookup.source,
        }))
    }
}

/// Load exactly `key` through the cache's entry table.
async fn load_exact<D: ResolvableDocument>(
    cache: &ResolutionCache<CachedDocument>,
    source: &Arc<dyn ContentSource>,
    descriptor: &Arc<DomainDescriptor>,
    key: ContentKey,
) -> Outcome<CachedDocument> {
    let source = Arc::clone(source);
    let descriptor = Arc::clone(descriptor);
    let read_key = key.clone();
    cache
        .load(&key, move || read_and_parse::<D>(source, descriptor, read_key))
        .await
        .value
}

async fn read_and_parse<D: ResolvableDocument>(
    source: Arc<dyn ContentSource>,
    descriptor: Arc<DomainDescriptor>,
    key: ContentKey,
) -> Outcome<CachedDocument> {
    let address = descriptor.address(&key);
    let raw = match source.fetch(&address).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!(key = %key, path = %address.path, "document absent");
            return Ok(None);
        }
        Err(e) => {
            tracing::error!(key = %key, path = %address.path, error = %e, "content store failed");
            return Err(e);
        }
    };

    let (document, warnings) = D::parse(&descriptor, &key, &raw.bytes).map_err(|e| {
        tracing::error!(key = %key, path = %raw.path, error = %e, "malformed document");
        e
    })?;

    for warning in &warnings {
        tracing::warn!(
            domain = %key.domain(),
            locale = %key.locale(),
            slug = %warning.slug(),
            "{}",
            warning
        );
    }

    let content_hash = raw.content_hash();
    tracing::debug!(key = %key, path = %raw.path, hash = %content_hash, "document loaded");

    Ok(Some(D::into_cached(Arc::new(Loaded {
        document: Arc::new(document),
        key,
        path: raw.path,
        content_hash,
        loaded_at: Utc::now(),
        warnings,
    }))))
}
