//! Per-domain descriptors: where documents live and how they are parsed.
//!
//! One generic resolver serves every domain; what differs between festivals
//! and treks is captured here as data.

use std::collections::BTreeMap;
use std::sync::Arc;

use yatra_core::{
    ConfigError, ContentError, ContentKey, DetailDocument, DocumentKind, Domain, DomainError,
    Locale, MasterDocument, ResolverConfig, YatraResult,
};

use crate::source::ContentAddress;

/// Parses raw master bytes into a [`MasterDocument`].
pub type MasterParser = fn(&ContentKey, &[u8]) -> YatraResult<MasterDocument>;

/// Parses raw detail bytes into a [`DetailDocument`].
pub type DetailParser = fn(&ContentKey, &[u8]) -> YatraResult<DetailDocument>;

// ============================================================================
// PATH TEMPLATES
// ============================================================================

/// Storage path pattern with `{domain}`, `{locale}`, `{kind}` and `{slug}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate(String);

impl PathTemplate {
    pub const DEFAULT_MASTER: &'static str = "{domain}/{locale}/master.json";
    pub const DEFAULT_DETAIL: &'static str = "{domain}/{locale}/{kind}/{slug}.json";

    /// Build a template for documents of `kind`.
    ///
    /// Every template must place `{locale}`, and detail templates must place
    /// `{slug}`, or two different documents would share one path.
    pub fn new(template: impl Into<String>, kind: DocumentKind) -> YatraResult<Self> {
        let template = template.into();
        let required: &[&str] = match kind {
            DocumentKind::Master => &["{locale}"],
            DocumentKind::Detail => &["{locale}", "{slug}"],
        };
        if let Some(missing) = required.iter().find(|p| !template.contains(**p)) {
            return Err(ConfigError::InvalidValue {
                field: format!("{}_template", kind),
                value: template.clone(),
                reason: format!("template must contain {missing}"),
            }
            .into());
        }
        Ok(Self(template))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render(&self, key: &ContentKey) -> String {
        self.0
            .replace("{domain}", key.domain().as_str())
            .replace("{locale}", key.locale().as_str())
            .replace("{kind}", key.kind().as_str())
            .replace("{slug}", key.slug().map(|s| s.as_str()).unwrap_or_default())
    }
}

// ============================================================================
// DEFAULT PARSERS
// ============================================================================

fn malformed(key: &ContentKey, reason: impl ToString) -> yatra_core::YatraError {
    ContentError::Malformed {
        key: key.clone(),
        reason: reason.to_string(),
    }
    .into()
}

/// JSON master parser.
pub fn parse_master_json(key: &ContentKey, bytes: &[u8]) -> YatraResult<MasterDocument> {
    serde_json::from_slice(bytes).map_err(|e| malformed(key, e))
}

/// JSON detail parser.
///
/// A document without a `slug` takes the slug it was addressed by; a
/// document declaring a different slug is rejected. The domain-specific
/// fields must fit the domain's typed view.
pub fn parse_detail_json(key: &ContentKey, bytes: &[u8]) -> YatraResult<DetailDocument> {
    let mut value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| malformed(key, e))?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| malformed(key, "detail document must be a JSON object"))?;

    if let Some(expected) = key.slug() {
        match object.get("slug") {
            None => {
                object.insert("slug".to_string(), expected.as_str().into());
            }
            Some(serde_json::Value::String(found)) if found.as_str() == expected.as_str() => {}
            Some(found) => {
                let found = found
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| found.to_string());
                return Err(ContentError::SlugMismatch {
                    key: key.clone(),
                    found,
                }
                .into());
            }
        }
    }

    let document: DetailDocument =
        serde_json::from_value(value).map_err(|e| malformed(key, e))?;
    key.domain()
        .check_extension(&document)
        .map_err(|e| malformed(key, format!("{} fields: {e}", key.domain())))?;
    Ok(document)
}

// ============================================================================
// DESCRIPTOR
// ============================================================================

/// Everything the resolver needs to know about one domain.
#[derive(Debug, Clone)]
pub struct DomainDescriptor {
    domain: Domain,
    default_locale: Locale,
    master_template: PathTemplate,
    detail_template: PathTemplate,
    master_parser: MasterParser,
    detail_parser: DetailParser,
}

impl DomainDescriptor {
    /// Descriptor with the default templates and JSON parsers.
    pub fn new(domain: Domain, default_locale: Locale) -> Self {
        Self {
            domain,
            default_locale,
            master_template: PathTemplate(PathTemplate::DEFAULT_MASTER.to_string()),
            detail_template: PathTemplate(PathTemplate::DEFAULT_DETAIL.to_string()),
            master_parser: parse_master_json,
            detail_parser: parse_detail_json,
        }
    }

    pub fn with_master_template(mut self, template: &str) -> YatraResult<Self> {
        self.master_template = PathTemplate::new(template, DocumentKind::Master)?;
        Ok(self)
    }

    pub fn with_detail_template(mut self, template: &str) -> YatraResult<Self> {
        self.detail_template = PathTemplate::new(template, DocumentKind::Detail)?;
        Ok(self)
    }

    pub fn with_master_parser(mut self, parser: MasterParser) -> Self {
        self.master_parser = parser;
        self
    }

    pub fn with_detail_parser(mut self, parser: DetailParser) -> Self {
        self.detail_parser = parser;
        self
    }

    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    /// Storage address for `key`.
    pub fn address(&self, key: &ContentKey) -> ContentAddress {
        let template = match key.kind() {
            DocumentKind::Master => &self.master_template,
            DocumentKind::Detail => &self.detail_template,
        };
        ContentAddress::new(key.clone(), template.render(key))
    }

    pub fn parse_master(&self, key: &ContentKey, bytes: &[u8]) -> YatraResult<MasterDocument> {
        (self.master_parser)(key, bytes)
    }

    pub fn parse_detail(&self, key: &ContentKey, bytes: &[u8]) -> YatraResult<DetailDocument> {
        (self.detail_parser)(key, bytes)
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Descriptors by domain, shared with the loads that use them.
#[derive(Debug, Clone, Default)]
pub struct DomainRegistry {
    descriptors: BTreeMap<Domain, Arc<DomainDescriptor>>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every domain with default templates and parsers, falling back to the
    /// configured default locale.
    pub fn standard(config: &ResolverConfig) -> Self {
        let mut registry = Self::new();
        for domain in Domain::ALL {
            registry.register(DomainDescriptor::new(domain, config.default_locale.clone()));
        }
        registry
    }

    /// Add or replace the descriptor for its domain.
    pub fn register(&mut self, descriptor: DomainDescriptor) -> &mut Self {
        self.descriptors
            .insert(descriptor.domain(), Arc::new(descriptor));
        self
    }

    pub fn get(&self, domain: Domain) -> YatraResult<Arc<DomainDescriptor>> {
        self.descriptors
            .get(&domain)
            .cloned()
            .ok_or_else(|| DomainError::NotRegistered { domain }.into())
    }

    pub fn domains(&self) -> impl Iterator<Item = Domain> + '_ {
        self.descriptors.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use yatra_core::{Slug, YatraError};

    fn en() -> Locale {
        Locale::english()
    }

    fn detail_key(domain: Domain, slug: &str) -> ContentKey {
        ContentKey::detail(domain, Slug::new(slug).unwrap(), en())
    }

    #[test]
    fn test_default_paths() {
        let descriptor = DomainDescriptor::new(Domain::Festivals, en());
        let master = descriptor.address(&ContentKey::master(Domain::Festivals, en()));
        assert_eq!(master.path, "festivals/en/master.json");

        let detail = descriptor.address(&detail_key(Domain::Festivals, "diwali"));
        assert_eq!(detail.path, "festivals/en/detail/diwali.json");
    }

    #[test]
    fn test_custom_templates() {
        let descriptor = DomainDescriptor::new(Domain::RoyalLuxury, en())
            .with_master_template("luxury/{locale}/index.json")
            .unwrap()
            .with_detail_template("luxury/{locale}/properties/{slug}.json")
            .unwrap();
        let detail = descriptor.address(&detail_key(Domain::RoyalLuxury, "umaid-bhawan"));
        assert_eq!(detail.path, "luxury/en/properties/umaid-bhawan.json");
    }

    #[test]
    fn test_detail_template_requires_slug() {
        let err = DomainDescriptor::new(Domain::Treks, en())
            .with_detail_template("{domain}/{locale}/detail.json")
            .unwrap_err();
        assert!(matches!(err, YatraError::Config(_)));
    }

    #[test]
    fn test_parse_detail_fills_missing_slug() {
        let key = detail_key(Domain::Festivals, "holi");
        let doc = parse_detail_json(&key, br#"{"title":"Holi"}"#).unwrap();
        assert_eq!(doc.slug, "holi");
        assert_eq!(doc.title, "Holi");
    }

    #[test]
    fn test_parse_detail_rejects_other_slug() {
        let key = detail_key(Domain::Festivals, "holi");
        let err = parse_detail_json(&key, br#"{"slug":"diwali"}"#).unwrap_err();
        assert!(matches!(
            err,
            YatraError::Content(ContentError::SlugMismatch { ref found, .. }) if found == "diwali"
        ));
    }

    #[test]
    fn test_parse_detail_rejects_non_object() {
        let key = detail_key(Domain::Regions, "ladakh");
        let err = parse_detail_json(&key, b"[1, 2, 3]").unwrap_err();
        assert!(err.is_malformed());
        assert_eq!(err.content_key(), Some(&key));
    }

    #[test]
    fn test_parse_detail_checks_domain_fields() {
        let key = detail_key(Domain::Treks, "roopkund");
        let body = json!({"elevation": "very high"}).to_string();
        let err = parse_detail_json(&key, body.as_bytes()).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("treks fields"));
    }

    #[test]
    fn test_parse_master_malformed_bytes() {
        let key = ContentKey::master(Domain::Cuisine, en());
        let err = parse_master_json(&key, b"{not json").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_standard_registry_covers_every_domain() {
        let config = ResolverConfig::default();
        let registry = DomainRegistry::standard(&config);
        assert_eq!(registry.domains().count(), Domain::ALL.len());
        assert_eq!(registry.get(Domain::Regions).unwrap().default_locale(), &en());
    }

    #[test]
    fn test_missing_descriptor_is_error() {
        let registry = DomainRegistry::new();
        let err = registry.get(Domain::Treks).unwrap_err();
        assert!(matches!(err, YatraError::Domain(DomainError::NotRegistered { .. })));
    }
}
