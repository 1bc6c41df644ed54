//! Configuration types

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, YatraError, YatraResult};
use crate::identity::Locale;

/// Resolver configuration.
///
/// Loaded from the environment ([`ResolverConfig::from_env`]) or a TOML file
/// ([`ResolverConfig::from_toml_file`]); every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Root directory of the content corpus.
    pub content_root: PathBuf,
    /// Locale tried after the requested one.
    pub default_locale: Locale,
    /// Locales the corpus is authored in. The default locale must be one.
    pub supported_locales: Vec<Locale>,
    /// Remember "not found in any locale" for the process lifetime.
    pub memoize_not_found: bool,
    /// Remember malformed-document and store failures for the process lifetime.
    pub memoize_failures: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("content"),
            default_locale: Locale::english(),
            supported_locales: vec![Locale::english()],
            memoize_not_found: true,
            memoize_failures: true,
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.content_root = root.into();
        self
    }

    /// Set the default locale, adding it to the supported set if missing.
    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        if !self.supported_locales.contains(&locale) {
            self.supported_locales.push(locale.clone());
        }
        self.default_locale = locale;
        self
    }

    pub fn with_supported_locales(mut self, locales: Vec<Locale>) -> Self {
        self.supported_locales = locales;
        self
    }

    pub fn with_memoize_not_found(mut self, enabled: bool) -> Self {
        self.memoize_not_found = enabled;
        self
    }

    pub fn with_memoize_failures(mut self, enabled: bool) -> Self {
        self.memoize_failures = enabled;
        self
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `YATRA_CONTENT_ROOT`: corpus root directory (default: `content`)
    /// - `YATRA_DEFAULT_LOCALE`: fallback locale (default: `en`)
    /// - `YATRA_SUPPORTED_LOCALES`: comma separated locales (default: the default locale)
    /// - `YATRA_MEMOIZE_NOT_FOUND`: `true`/`false` (default: true)
    /// - `YATRA_MEMOIZE_FAILURES`: `true`/`false` (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ResolverConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let default_locale = lookup("YATRA_DEFAULT_LOCALE")
            .and_then(|s| Locale::new(&s).ok())
            .unwrap_or(defaults.default_locale);

        let mut supported_locales: Vec<Locale> = lookup("YATRA_SUPPORTED_LOCALES")
            .map(|s| {
                s.split(',')
                    .filter_map(|part| Locale::new(part).ok())
                    .collect()
            })
            .unwrap_or_default();
        if !supported_locales.contains(&default_locale) {
            supported_locales.insert(0, default_locale.clone());
        }

        Self {
            content_root: lookup("YATRA_CONTENT_ROOT")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.content_root),
            default_locale,
            supported_locales,
            memoize_not_found: lookup("YATRA_MEMOIZE_NOT_FOUND")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.memoize_not_found),
            memoize_failures: lookup("YATRA_MEMOIZE_FAILURES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.memoize_failures),
        }
    }

    /// Parse a TOML document. The result is validated.
    pub fn from_toml_str(source: &str) -> YatraResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::InvalidValue {
            field: "<toml>".to_string(),
            value: String::new(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> YatraResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - content_root is not empty
    /// - supported_locales is not empty
    /// - default_locale is one of supported_locales
    pub fn validate(&self) -> YatraResult<()> {
        if self.content_root.as_os_str().is_empty() {
            return Err(YatraError::Config(ConfigError::MissingRequired {
                field: "content_root".to_string(),
            }));
        }

        if self.supported_locales.is_empty() {
            return Err(YatraError::Config(ConfigError::MissingRequired {
                field: "supported_locales".to_string(),
            }));
        }

        if !self.supported_locales.contains(&self.default_locale) {
            return Err(YatraError::Config(ConfigError::InvalidValue {
                field: "default_locale".to_string(),
                value: self.default_locale.to_string(),
                reason: "default_locale must be one of supported_locales".to_string(),
            }));
        }

        Ok(())
    }

    pub fn supports(&self, locale: &Locale) -> bool {
        self.supported_locales.contains(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn loc(s: &str) -> Locale {
        Locale::new(s).unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ResolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_locale, Locale::english());
        assert!(config.memoize_not_found);
        assert!(config.memoize_failures);
    }

    #[test]
    fn test_builder_keeps_default_locale_supported() {
        let config = ResolverConfig::new()
            .with_content_root("/srv/content")
            .with_default_locale(loc("hi"))
            .with_memoize_failures(false);
        assert!(config.supports(&loc("hi")));
        assert!(config.validate().is_ok());
        assert!(!config.memoize_failures);
    }

    #[test]
    fn test_validate_rejects_unsupported_default() {
        let config = ResolverConfig::new().with_supported_locales(vec![loc("fr")]);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            YatraError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "default_locale"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_root() {
        let config = ResolverConfig::new().with_content_root("");
        assert!(matches!(
            config.validate(),
            Err(YatraError::Config(ConfigError::MissingRequired { .. }))
        ));
    }

    #[test]
    fn test_from_lookup_reads_variables() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("YATRA_CONTENT_ROOT", "/data/yatra"),
            ("YATRA_DEFAULT_LOCALE", "hi"),
            ("YATRA_SUPPORTED_LOCALES", "en, fr ,not a locale"),
            ("YATRA_MEMOIZE_NOT_FOUND", "false"),
            ("YATRA_MEMOIZE_FAILURES", "maybe"),
        ]);
        let config = ResolverConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.content_root, PathBuf::from("/data/yatra"));
        assert_eq!(config.default_locale, loc("hi"));
        assert_eq!(config.supported_locales, vec![loc("hi"), loc("en"), loc("fr")]);
        assert!(!config.memoize_not_found);
        // unparseable falls back to the default
        assert!(config.memoize_failures);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_empty_environment_is_default() {
        let config = ResolverConfig::from_lookup(|_| None);
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_from_toml_str() {
        let config = ResolverConfig::from_toml_str(
            r#"
            content_root = "site/content"
            default_locale = "fr"
            supported_locales = ["en", "fr"]
            memoize_failures = false
            "#,
        )
        .unwrap();
        assert_eq!(config.content_root, PathBuf::from("site/content"));
        assert_eq!(config.default_locale, loc("fr"));
        assert!(config.memoize_not_found);
        assert!(!config.memoize_failures);
    }

    #[test]
    fn test_from_toml_str_rejects_bad_locale() {
        let err = ResolverConfig::from_toml_str("default_locale = \"not a locale\"").unwrap_err();
        assert!(matches!(err, YatraError::Config(_)));
    }

    #[test]
    fn test_from_toml_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = ResolverConfig::from_toml_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, YatraError::Config(ConfigError::Unreadable { .. })));
    }

    #[test]
    fn test_from_toml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yatra.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "content_root = \"c\"").unwrap();
        let config = ResolverConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.content_root, PathBuf::from("c"));
    }
}
