//! Yatra Test Utilities
//!
//! Shared test infrastructure for the Yatra workspace:
//! - An instrumented content source with per-path read counters
//! - Proptest generators for identifiers and catalog documents
//! - Fixtures for the festival corpus
//! - Custom assertions for resolution results

// Re-export core types for convenience
pub use yatra_core::{
    CardSummary, ContentError, ContentKey, ContentWarning, DetailDocument, DocumentKind, Domain,
    Locale, MasterDocument, ResolverConfig, Slug, StorageError, YatraError, YatraResult,
};
pub use yatra_storage::{ContentAddress, ContentResolver, InMemoryContentSource, RawDocument};

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use yatra_storage::ContentSource;

// ============================================================================
// COUNTING CONTENT SOURCE
// ============================================================================

/// In-memory content source that records every read.
///
/// Paths registered with [`CountingContentSource::fail_path`] answer with
/// [`StorageError::Unavailable`]; a configured delay holds every read open
/// long enough for concurrent callers to pile up behind it.
#[derive(Debug, Default)]
pub struct CountingContentSource {
    inner: InMemoryContentSource,
    reads: Mutex<HashMap<String, usize>>,
    failing: Mutex<HashSet<String>>,
    delay: Option<Duration>,
}

impl CountingContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every read for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn insert(&self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.inner.insert(path, bytes);
    }

    pub fn insert_json(&self, path: impl Into<String>, value: &serde_json::Value) {
        self.inner.insert_json(path, value);
    }

    /// Make reads of `path` fail as if the store were broken.
    pub fn fail_path(&self, path: impl Into<String>) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into());
    }

    /// Number of reads issued for `path`, whether they found anything or not.
    pub fn reads(&self, path: &str) -> usize {
        self.reads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_reads(&self) -> usize {
        self.reads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .sum()
    }

    /// Paths read at least once, sorted.
    pub fn paths_read(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .reads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        paths.sort();
        paths
    }

    pub fn reset_reads(&self) {
        self.reads.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[async_trait]
impl ContentSource for CountingContentSource {
    async fn fetch(&self, address: &ContentAddress) -> YatraResult<Option<RawDocument>> {
        *self
            .reads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(address.path.clone())
            .or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&address.path);
        if failing {
            return Err(StorageError::Unavailable {
                path: address.path.clone(),
                reason: "scripted failure".to_string(),
            }
            .into());
        }

        self.inner.fetch(address).await
    }
}

/// Resolver over `source` with the default configuration.
pub fn resolver_over(source: Arc<CountingContentSource>) -> ContentResolver {
    resolver_with(source, ResolverConfig::default())
}

/// Resolver over `source` with `config`.
///
/// Panics on an invalid config; test configs are always expected to be valid.
pub fn resolver_with(source: Arc<CountingContentSource>, config: ResolverConfig) -> ContentResolver {
    match ContentResolver::new(source, config) {
        Ok(resolver) => resolver,
        Err(e) => panic!("test resolver config rejected: {e}"),
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for identifiers and catalog documents.

    use super::*;
    use proptest::prelude::*;

    /// Generate any content domain.
    pub fn arb_domain() -> impl Strategy<Value = Domain> {
        prop::sample::select(Domain::ALL.to_vec())
    }

    /// Generate a valid locale tag, optionally with a region subtag.
    pub fn arb_locale() -> impl Strategy<Value = Locale> {
        ("[a-z]{2,3}", prop::option::of("[a-z]{2}")).prop_map(|(lang, region)| {
            let tag = match region {
                Some(region) => format!("{lang}-{region}"),
                None => lang,
            };
            Locale::new(&tag).expect("generated locale is valid")
        })
    }

    /// Generate a valid kebab-case slug.
    pub fn arb_slug() -> impl Strategy<Value = Slug> {
        "[a-z0-9]{1,8}(-[a-z0-9]{1,8}){0,3}"
            .prop_map(|s| Slug::new(&s).expect("generated slug is valid"))
    }

    /// Generate a card with a valid slug.
    pub fn arb_card() -> impl Strategy<Value = CardSummary> {
        (arb_slug(), "[A-Z][a-z]{2,10}").prop_map(|(slug, title)| CardSummary {
            slug,
            title,
            subtitle: None,
            thumbnail: None,
            short_description: None,
        })
    }

    /// Generate a master document with unique cards and an order list that
    /// mixes card slugs with dangling references and repeats.
    pub fn arb_master() -> impl Strategy<Value = MasterDocument> {
        prop::collection::vec(arb_card(), 0..8)
            .prop_flat_map(|cards| {
                let mut seen = HashSet::new();
                let cards: Vec<CardSummary> = cards
                    .into_iter()
                    .filter(|c| seen.insert(c.slug.clone()))
                    .collect();
                let mut pool: Vec<String> = cards.iter().map(|c| c.slug.to_string()).collect();
                pool.extend(["ghost", "missing-festival"].map(String::from));
                let order = prop::collection::vec(prop::sample::select(pool), 0..12);
                (Just(cards), order)
            })
            .prop_map(|(cards, order)| MasterDocument {
                cards,
                order,
                ..Default::default()
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built corpora for common resolution scenarios.

    use super::*;
    use serde_json::json;

    pub const FESTIVALS_EN_MASTER: &str = "festivals/en/master.json";
    pub const DIWALI_EN: &str = "festivals/en/detail/diwali.json";
    pub const HOLI_EN: &str = "festivals/en/detail/holi.json";
    pub const DIWALI_FR: &str = "festivals/fr/detail/diwali.json";

    pub fn en() -> Locale {
        Locale::english()
    }

    pub fn locale(tag: &str) -> Locale {
        Locale::new(tag).unwrap_or_else(|e| panic!("fixture locale {tag}: {e}"))
    }

    pub fn slug(value: &str) -> Slug {
        Slug::new(value).unwrap_or_else(|e| panic!("fixture slug {value}: {e}"))
    }

    /// One card, and an order list that also names a festival with no card.
    pub fn festivals_master() -> serde_json::Value {
        json!({
            "id": "festivals",
            "title": "Festivals of India",
            "cards": [{"slug": "diwali", "title": "Diwali"}],
            "order": ["diwali", "holi"]
        })
    }

    pub fn diwali_detail() -> serde_json::Value {
        json!({
            "slug": "diwali",
            "title": "Diwali",
            "subtitle": "Festival of Lights",
            "tags": ["lights", "autumn"],
            "is_live": true,
            "dates": ["2026-11-08"],
            "rituals": ["Lakshmi puja", "Rangoli"]
        })
    }

    pub fn diwali_detail_fr() -> serde_json::Value {
        json!({
            "slug": "diwali",
            "title": "Diwali",
            "subtitle": "La fête des lumières",
            "significance": "Victoire de la lumière sur les ténèbres"
        })
    }

    /// The festival corpus: an English master, two English details and one
    /// French detail.
    pub fn festival_corpus() -> CountingContentSource {
        let source = CountingContentSource::new();
        source.insert_json(FESTIVALS_EN_MASTER, &festivals_master());
        source.insert_json(DIWALI_EN, &diwali_detail());
        source.insert_json(
            HOLI_EN,
            &json!({"title": "Holi", "subtitle": "Festival of Colours", "dates": ["2026-03-04"]}),
        );
        source.insert_json(DIWALI_FR, &diwali_detail_fr());
        source
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for resolution outcomes.

    use super::*;

    /// Assert that a resolution found a document.
    #[track_caller]
    pub fn assert_found<T: std::fmt::Debug>(result: &YatraResult<Option<T>>) {
        match result {
            Ok(Some(_)) => {}
            other => panic!("Expected a document, got: {:?}", other),
        }
    }

    /// Assert that a resolution ended in ordinary absence.
    #[track_caller]
    pub fn assert_absent<T: std::fmt::Debug>(result: &YatraResult<Option<T>>) {
        match result {
            Ok(None) => {}
            other => panic!("Expected absence, got: {:?}", other),
        }
    }

    /// Assert that a resolution failed with a malformed document.
    #[track_caller]
    pub fn assert_malformed<T: std::fmt::Debug>(result: &YatraResult<Option<T>>) {
        match result {
            Err(e) if e.is_malformed() => {}
            other => panic!("Expected malformed document error, got: {:?}", other),
        }
    }

    /// Assert that a resolution failed because the store failed.
    #[track_caller]
    pub fn assert_store_failure<T: std::fmt::Debug>(result: &YatraResult<Option<T>>) {
        match result {
            Err(e) if e.is_store_failure() => {}
            other => panic!("Expected store failure, got: {:?}", other),
        }
    }

    /// Assert that every order entry names a card, once.
    #[track_caller]
    pub fn assert_order_consistent(master: &MasterDocument) {
        let mut seen = HashSet::new();
        for slug in &master.order {
            assert!(
                master.card(slug).is_some(),
                "order entry {slug} has no card"
            );
            assert!(seen.insert(slug), "order entry {slug} repeated");
        }
    }

    /// Assert that `source` was read exactly `expected` times at `path`.
    #[track_caller]
    pub fn assert_reads(source: &CountingContentSource, path: &str, expected: usize) {
        assert_eq!(
            source.reads(path),
            expected,
            "unexpected read count for {path} (all reads: {:?})",
            source.paths_read()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_counting_source_counts_misses_too() {
        let source = fixtures::festival_corpus();
        let hit = ContentAddress::new(
            ContentKey::master(Domain::Festivals, fixtures::en()),
            fixtures::FESTIVALS_EN_MASTER,
        );
        let miss = ContentAddress::new(
            ContentKey::master(Domain::Festivals, fixtures::locale("de")),
            "festivals/de/master.json",
        );

        assert!(source.fetch(&hit).await.unwrap().is_some());
        assert!(source.fetch(&miss).await.unwrap().is_none());
        assertions::assert_reads(&source, fixtures::FESTIVALS_EN_MASTER, 1);
        assertions::assert_reads(&source, "festivals/de/master.json", 1);
        assert_eq!(source.total_reads(), 2);

        source.reset_reads();
        assert_eq!(source.total_reads(), 0);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let source = fixtures::festival_corpus();
        source.fail_path(fixtures::DIWALI_EN);
        let address = ContentAddress::new(
            ContentKey::detail(Domain::Festivals, fixtures::slug("diwali"), fixtures::en()),
            fixtures::DIWALI_EN,
        );
        let result = source.fetch(&address).await;
        assert!(matches!(result, Err(YatraError::Storage(_))));
        assertions::assert_reads(&source, fixtures::DIWALI_EN, 1);
    }

    #[test]
    fn test_fixture_master_parses() {
        let master: MasterDocument = serde_json::from_value(fixtures::festivals_master()).unwrap();
        assert_eq!(master.cards.len(), 1);
        assert_eq!(master.order, vec!["diwali", "holi"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_generated_masters_have_unique_cards(master in generators::arb_master()) {
            prop_assert!(master.duplicate_card().is_none());
        }

        #[test]
        fn prop_generated_slugs_round_trip(slug in generators::arb_slug()) {
            prop_assert_eq!(Slug::new(slug.as_str()).unwrap(), slug);
        }

        #[test]
        fn prop_generated_locales_are_lowercase(locale in generators::arb_locale()) {
            prop_assert_eq!(locale.as_str().to_lowercase(), locale.as_str());
        }
    }
}
