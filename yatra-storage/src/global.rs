//! Process-wide resolver for callers that have no place to hold one.
//!
//! The first call to [`resolver`] builds a [`ContentResolver`] from the
//! environment unless [`install`] already put one in place. There is one
//! cache per process; it lives until exit.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use yatra_core::{DetailDocument, Domain, Locale, MasterDocument, ResolverConfig, Slug, YatraResult};

use crate::resolver::ContentResolver;

static RESOLVER: OnceCell<ContentResolver> = OnceCell::new();

/// Install `resolver` as the process-wide resolver.
///
/// Returns the resolver back when one is already installed.
pub fn install(resolver: ContentResolver) -> Result<(), ContentResolver> {
    RESOLVER.set(resolver)
}

/// The process-wide resolver, built from `YATRA_*` variables on first use.
pub fn resolver() -> YatraResult<&'static ContentResolver> {
    RESOLVER.get_or_try_init(|| {
        let config = ResolverConfig::from_env();
        tracing::info!(
            content_root = %config.content_root.display(),
            default_locale = %config.default_locale,
            "initializing content resolver"
        );
        ContentResolver::from_config(config)
    })
}

/// [`ContentResolver::get_master`] on the process-wide resolver.
pub async fn get_master(domain: Domain, locale: &Locale) -> YatraResult<Option<Arc<MasterDocument>>> {
    resolver()?.get_master(domain, locale).await
}

/// [`ContentResolver::get_detail`] on the process-wide resolver.
pub async fn get_detail(
    domain: Domain,
    slug: &Slug,
    locale: &Locale,
) -> YatraResult<Option<Arc<DetailDocument>>> {
    resolver()?.get_detail(domain, slug, locale).await
}

/// Clear the process-wide cache, if a resolver exists.
pub fn clear() {
    if let Some(resolver) = RESOLVER.get() {
        resolver.clear();
    }
}
