//! Property tests over generated catalogs and locales.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use yatra_test_utils::assertions::{assert_absent, assert_order_consistent};
use yatra_test_utils::generators::{arb_domain, arb_locale, arb_master, arb_slug};
use yatra_test_utils::{resolver_over, CountingContentSource, Locale};

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Effective order is the stable subsequence of authored order that names
    /// cards, each slug once; every dropped entry yields one warning.
    #[test]
    fn prop_master_order_filter(master in arb_master(), domain in arb_domain()) {
        let source = Arc::new(CountingContentSource::new());
        let path = format!("{}/en/master.json", domain);
        source.insert(path.clone(), serde_json::to_vec(&master).unwrap());
        let resolver = resolver_over(Arc::clone(&source));

        let resolved = block_on(resolver.resolve_master(domain, &Locale::english()))
            .unwrap()
            .unwrap();
        let effective = &resolved.document().order;
        assert_order_consistent(resolved.document());

        let mut seen = HashSet::new();
        let expected: Vec<String> = master
            .order
            .iter()
            .filter(|slug| master.card(slug).is_some() && seen.insert(slug.as_str()))
            .cloned()
            .collect();
        prop_assert_eq!(effective, &expected);
        prop_assert_eq!(resolved.warnings().len(), master.order.len() - expected.len());
        prop_assert_eq!(source.reads(&path), 1);
    }

    /// With nothing in the store, every request ends in absence after reading
    /// the requested locale and, when different, the default locale once each.
    #[test]
    fn prop_empty_store_reads_each_locale_once(
        domain in arb_domain(),
        slug in arb_slug(),
        locale in arb_locale(),
    ) {
        let source = Arc::new(CountingContentSource::new());
        let resolver = resolver_over(Arc::clone(&source));

        block_on(async {
            for _ in 0..2 {
                assert_absent(&resolver.get_detail(domain, &slug, &locale).await);
            }
        });

        let expected = if locale == Locale::english() { 1 } else { 2 };
        prop_assert_eq!(source.total_reads(), expected);
    }
}
