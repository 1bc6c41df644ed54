//! The resolution cache proper: exact-locale entries plus requested-locale aliases.

use std::future::Future;
use std::sync::atomic::Ordering;

use yatra_core::{ContentKey, ResolverConfig, YatraResult};

use super::single_flight::{FlightCounters, FlightTable, Lookup};
use super::stats::CacheStats;

/// Result of one load: a document, confirmed absence, or a failure.
pub type Outcome<V> = YatraResult<Option<V>>;

/// Which outcomes are remembered. Found documents always are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoPolicy {
    pub not_found: bool,
    pub failures: bool,
}

impl Default for MemoPolicy {
    fn default() -> Self {
        Self {
            not_found: true,
            failures: true,
        }
    }
}

impl MemoPolicy {
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            not_found: config.memoize_not_found,
            failures: config.memoize_failures,
        }
    }

    pub fn keeps<V>(&self, outcome: &Outcome<V>) -> bool {
        match outcome {
            Ok(Some(_)) => true,
            Ok(None) => self.not_found,
            Err(_) => self.failures,
        }
    }
}

/// Process-lifetime memo table keyed by `(domain, kind, slug, locale)`.
pub struct ResolutionCache<V> {
    entries: FlightTable<V>,
    aliases: FlightTable<V>,
    counters: FlightCounters,
    policy: MemoPolicy,
}

impl<V: Clone + Send + Sync + 'static> Default for ResolutionCache<V> {
    fn default() -> Self {
        Self::new(MemoPolicy::default())
    }
}

impl<V: Clone + Send + Sync + 'static> ResolutionCache<V> {
    pub fn new(policy: MemoPolicy) -> Self {
        Self {
            entries: FlightTable::default(),
            aliases: FlightTable::default(),
            counters: FlightCounters::default(),
            policy,
        }
    }

    pub fn policy(&self) -> MemoPolicy {
        self.policy
    }

    /// Document settled under exactly this key (no fallback, no waiting).
    pub fn get(&self, key: &ContentKey) -> Option<V> {
        match self.entries.get(key) {
            Some(Ok(Some(value))) => Some(value),
            _ => None,
        }
    }

    /// Settle a document under exactly this key.
    ///
    /// Returns false, leaving the existing entry untouched, when the key is
    /// already settled or being loaded.
    pub fn put(&self, key: &ContentKey, value: V) -> bool {
        self.entries.put(key, Ok(Some(value)))
    }

    /// Settled outcome for a requested key, if its resolution already ran.
    pub fn resolution(&self, requested: &ContentKey) -> Option<Outcome<V>> {
        self.aliases.get(requested)
    }

    /// Load exactly `key`, at most once across all concurrent callers.
    ///
    /// The load runs detached from the caller: dropping the returned future
    /// does not stop it, and its outcome is still settled for later callers.
    pub async fn load<F, Fut>(&self, key: &ContentKey, load: F) -> Lookup<Outcome<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<V>> + Send + 'static,
    {
        self.entries
            .get_or_load(key, &self.counters, self.policy, load)
            .await
    }

    /// Resolve a requested key (which may fall back to another locale), at
    /// most once across all concurrent callers.
    ///
    /// `walk` is expected to go through [`ResolutionCache::load`] for each
    /// locale it tries, so the document itself lands in the entry table
    /// under the locale it was found in.
    pub async fn resolve<F, Fut>(&self, requested: &ContentKey, walk: F) -> Lookup<Outcome<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<V>> + Send + 'static,
    {
        self.aliases
            .get_or_load(requested, &self.counters, self.policy, walk)
            .await
    }

    /// Forget everything. Intended for test isolation; in-flight loads still
    /// answer the callers that joined them but settle nothing.
    pub fn clear(&self) {
        self.entries.clear();
        self.aliases.clear();
        self.counters.reset();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            loads: self.counters.loads.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
            entry_count: self.entries.len() as u64,
            alias_count: self.aliases.len() as u64,
        }
    }
}
