//! Identity types: domains, locales, slugs, and the composite content key.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, YatraResult};

static LOCALE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z]{2,3}(-[a-z0-9]{2,8})*$").expect("locale pattern is valid")
});

static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(?:[-_][a-z0-9]+)*$").expect("slug pattern is valid")
});

// ============================================================================
// DOMAIN
// ============================================================================

/// Content category. Each domain has its own master catalog and detail pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    Festivals,
    Cuisine,
    DanceForms,
    Treks,
    SpiritualJourneys,
    Regions,
    RoyalLuxury,
}

impl Domain {
    /// All domains, in stable order.
    pub const ALL: [Domain; 7] = [
        Domain::Festivals,
        Domain::Cuisine,
        Domain::DanceForms,
        Domain::Treks,
        Domain::SpiritualJourneys,
        Domain::Regions,
        Domain::RoyalLuxury,
    ];

    /// Path segment used for this domain in the content corpus.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Festivals => "festivals",
            Self::Cuisine => "cuisine",
            Self::DanceForms => "dance-forms",
            Self::Treks => "treks",
            Self::SpiritualJourneys => "spiritual-journeys",
            Self::Regions => "regions",
            Self::RoyalLuxury => "royal-luxury",
        }
    }

    /// Parse a domain name. Accepts `_` in place of `-` and is case-insensitive.
    pub fn parse(value: &str) -> YatraResult<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| {
                ValidationError::UnknownDomain {
                    value: value.to_string(),
                }
                .into()
            })
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// LOCALE
// ============================================================================

/// Normalized locale tag (`en`, `fr`, `pt-br`).
///
/// Tags are lower-cased and `_` separators become `-`, so `pt_BR` and `pt-br`
/// address the same content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    pub fn new(value: &str) -> YatraResult<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        if !LOCALE_PATTERN.is_match(&normalized) {
            return Err(ValidationError::InvalidLocale {
                value: value.to_string(),
            }
            .into());
        }
        Ok(Self(normalized))
    }

    /// The built-in default locale, `en`.
    pub fn english() -> Self {
        Self("en".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Primary language subtag (`pt` for `pt-br`).
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl TryFrom<String> for Locale {
    type Error = crate::YatraError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SLUG
// ============================================================================

/// Document slug: lower-case alphanumerics joined by `-` or `_`.
///
/// Slugs become path segments, so anything that could escape the content
/// root (`..`, `/`) is rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn new(value: &str) -> YatraResult<Self> {
        if !SLUG_PATTERN.is_match(value) {
            return Err(ValidationError::InvalidSlug {
                value: value.to_string(),
            }
            .into());
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Slug {
    type Error = crate::YatraError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl PartialEq<str> for Slug {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Slug {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// CONTENT KEY
// ============================================================================

/// Which document shape a key addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Master,
    Detail,
}

impl DocumentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Detail => "detail",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite cache and store key: `(domain, kind, slug, locale)`.
///
/// The only constructors are [`ContentKey::master`] and [`ContentKey::detail`],
/// so a master key never carries a slug and a detail key always does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey {
    domain: Domain,
    kind: DocumentKind,
    slug: Option<Slug>,
    locale: Locale,
}

impl ContentKey {
    pub fn master(domain: Domain, locale: Locale) -> Self {
        Self {
            domain,
            kind: DocumentKind::Master,
            slug: None,
            locale,
        }
    }

    pub fn detail(domain: Domain, slug: Slug, locale: Locale) -> Self {
        Self {
            domain,
            kind: DocumentKind::Detail,
            slug: Some(slug),
            locale,
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn slug(&self) -> Option<&Slug> {
        self.slug.as_ref()
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Same document, different locale. Used to step through the fallback chain.
    pub fn with_locale(&self, locale: Locale) -> Self {
        Self {
            locale,
            ..self.clone()
        }
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slug {
            Some(slug) => write!(f, "{}/{}/{}/{}", self.domain, self.locale, self.kind, slug),
            None => write!(f, "{}/{}/{}", self.domain, self.locale, self.kind),
        }
    }
}
