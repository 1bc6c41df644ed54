//! Document shapes: master catalogs and detail pages.
//!
//! Most fields default when absent. Content authors routinely omit optional
//! sections, and a missing subtitle is not a reason to fail a page.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domains::DomainExtension;
use crate::identity::Slug;

// ============================================================================
// SHARED PIECES
// ============================================================================

/// Hero banner assets shared by master and detail documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroAssets {
    pub image: Option<String>,
    pub video: Option<String>,
    pub alt: Option<String>,
    pub gallery: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub canonical: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A bookable property listed on a detail page (palaces, heritage hotels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySummary {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

// ============================================================================
// WARNINGS
// ============================================================================

/// Non-fatal content problem recorded during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentWarning {
    /// `order` references a slug with no matching card.
    DanglingOrderEntry { slug: String },
    /// `order` lists the same slug twice; later occurrences are dropped.
    DuplicateOrderEntry { slug: String },
    /// A card in the catalog has no detail document in any fallback locale.
    MissingDetail { slug: String },
}

impl ContentWarning {
    pub fn slug(&self) -> &str {
        match self {
            Self::DanglingOrderEntry { slug }
            | Self::DuplicateOrderEntry { slug }
            | Self::MissingDetail { slug } => slug,
        }
    }
}

impl fmt::Display for ContentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingOrderEntry { slug } => write!(f, "order entry {slug} has no card"),
            Self::DuplicateOrderEntry { slug } => write!(f, "order entry {slug} is repeated"),
            Self::MissingDetail { slug } => write!(f, "card {slug} has no detail document"),
        }
    }
}

// ============================================================================
// MASTER DOCUMENT
// ============================================================================

/// Card summary embedded in a master document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub slug: Slug,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
}

/// Per-domain, per-locale catalog: card summaries plus display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterDocument {
    pub id: String,
    pub slug: Option<String>,
    pub title: String,
    pub hero: HeroAssets,
    pub intro: Option<String>,
    pub cards: Vec<CardSummary>,
    pub order: Vec<String>,
}

impl MasterDocument {
    /// First card slug that appears more than once, if any.
    pub fn duplicate_card(&self) -> Option<&Slug> {
        let mut seen = HashSet::with_capacity(self.cards.len());
        self.cards.iter().map(|c| &c.slug).find(|s| !seen.insert(*s))
    }

    /// Drop `order` entries that reference no card, or repeat an earlier entry.
    ///
    /// The surviving entries keep their relative order. One warning is
    /// returned per dropped entry, in the order they were encountered.
    pub fn filter_order(&mut self) -> Vec<ContentWarning> {
        let known: HashSet<&str> = self.cards.iter().map(|c| c.slug.as_str()).collect();
        let mut kept = HashSet::with_capacity(self.order.len());
        let mut warnings = Vec::new();

        let mut filtered = Vec::with_capacity(self.order.len());
        for slug in self.order.drain(..) {
            if !known.contains(slug.as_str()) {
                warnings.push(ContentWarning::DanglingOrderEntry { slug });
            } else if !kept.insert(slug.clone()) {
                warnings.push(ContentWarning::DuplicateOrderEntry { slug });
            } else {
                filtered.push(slug);
            }
        }
        self.order = filtered;
        warnings
    }

    pub fn card(&self, slug: &str) -> Option<&CardSummary> {
        self.cards.iter().find(|c| c.slug == slug)
    }

    /// Cards in display order.
    ///
    /// A catalog with no `order` displays its cards as authored.
    pub fn ordered_cards(&self) -> Vec<&CardSummary> {
        if self.order.is_empty() {
            return self.cards.iter().collect();
        }
        self.order.iter().filter_map(|slug| self.card(slug)).collect()
    }
}

// ============================================================================
// DETAIL DOCUMENT
// ============================================================================

/// Full record for one slug. Domain-specific long-form fields (rituals,
/// dishes, itineraries, elevation) stay in `fields` and are read through
/// [`DetailDocument::extension`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailDocument {
    pub slug: Slug,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub hero: HeroAssets,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub is_bookable: bool,
    #[serde(default)]
    pub seo: Option<SeoMetadata>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default)]
    pub properties: Vec<PropertySummary>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl DetailDocument {
    /// Deserialize the domain-specific fields into `T`. Callers holding the
    /// document's key should go through `Resolved::extension`, which also
    /// checks that `T` belongs to the document's domain.
    pub fn extension<T: DomainExtension>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(self.fields.clone()))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn card(slug: &str) -> CardSummary {
        CardSummary {
            slug: Slug::new(slug).unwrap(),
            title: slug.to_uppercase(),
            subtitle: None,
            thumbnail: None,
            short_description: None,
        }
    }

    fn master(cards: &[&str], order: &[&str]) -> MasterDocument {
        MasterDocument {
            cards: cards.iter().map(|s| card(s)).collect(),
            order: order.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_order_drops_dangling() {
        let mut doc = master(&["diwali"], &["diwali", "holi"]);
        let warnings = doc.filter_order();
        assert_eq!(doc.order, vec!["diwali"]);
        assert_eq!(
            warnings,
            vec![ContentWarning::DanglingOrderEntry {
                slug: "holi".to_string()
            }]
        );
    }

    #[test]
    fn test_filter_order_drops_repeats() {
        let mut doc = master(&["onam", "pongal"], &["pongal", "onam", "pongal"]);
        let warnings = doc.filter_order();
        assert_eq!(doc.order, vec!["pongal", "onam"]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].slug(), "pongal");
    }

    #[test]
    fn test_master_parses_sparse_payload() {
        let doc: MasterDocument = serde_json::from_value(json!({
            "cards": [{"slug": "diwali"}],
            "order": ["diwali", "holi"]
        }))
        .unwrap();
        assert_eq!(doc.cards.len(), 1);
        assert_eq!(doc.cards[0].title, "");
        assert!(doc.id.is_empty());
    }

    #[test]
    fn test_duplicate_card_detected() {
        let doc = master(&["holi", "onam", "holi"], &[]);
        assert_eq!(doc.duplicate_card().map(Slug::as_str), Some("holi"));
        assert!(master(&["holi", "onam"], &[]).duplicate_card().is_none());
    }

    #[test]
    fn test_ordered_cards_without_order_uses_authored_sequence() {
        let doc = master(&["b", "a"], &[]);
        let slugs: Vec<&str> = doc.ordered_cards().iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["b", "a"]);
    }

    #[test]
    fn test_detail_keeps_domain_fields() {
        let doc: DetailDocument = serde_json::from_value(json!({
            "slug": "hampta-pass",
            "title": "Hampta Pass",
            "is_bookable": true,
            "tags": ["Himalaya"],
            "elevation": 4270,
            "itinerary": [{"day": 1, "title": "Manali to Jobra"}]
        }))
        .unwrap();
        assert!(doc.is_bookable);
        assert!(!doc.is_live);
        assert!(doc.has_tag("himalaya"));
        assert_eq!(doc.fields.get("elevation"), Some(&json!(4270)));
        assert!(!doc.fields.contains_key("title"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Filtering keeps a subsequence of the original order containing
        /// only known, unique slugs, and accounts for every dropped entry.
        #[test]
        fn prop_filter_order_is_stable_subsequence(
            cards in prop::collection::hash_set("[a-f]", 0..6),
            order in prop::collection::vec("[a-h]", 0..12),
        ) {
            let cards: Vec<&str> = cards.iter().map(String::as_str).collect();
            let order_refs: Vec<&str> = order.iter().map(String::as_str).collect();
            let mut doc = master(&cards, &order_refs);
            let warnings = doc.filter_order();

            prop_assert_eq!(doc.order.len() + warnings.len(), order.len());

            let mut cursor = order.iter();
            for kept in &doc.order {
                prop_assert!(cards.contains(&kept.as_str()));
                prop_assert!(cursor.any(|o| o == kept));
            }

            let unique: HashSet<&String> = doc.order.iter().collect();
            prop_assert_eq!(unique.len(), doc.order.len());

            let mut again = doc.clone();
            prop_assert!(again.filter_order().is_empty());
            prop_assert_eq!(again.order, doc.order);
        }
    }
}
