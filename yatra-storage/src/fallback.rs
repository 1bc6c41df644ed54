//! Locale fallback: the requested locale, then the default locale, then stop.
//!
//! Fallback is driven ONLY by absence. A failure while trying the requested
//! locale ends the walk with that failure; it is never read as "try the
//! default instead".

use std::future::Future;

use yatra_core::{Locale, YatraResult};

/// Ordered, length-two (or one) list of locales to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleChain {
    locales: Vec<Locale>,
}

impl LocaleChain {
    /// `[requested, default]`, collapsed to `[requested]` when they match.
    pub fn new(requested: Locale, default: Locale) -> Self {
        let mut locales = vec![requested];
        if locales[0] != default {
            locales.push(default);
        }
        Self { locales }
    }

    pub fn requested(&self) -> &Locale {
        &self.locales[0]
    }

    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Try each locale in order.
    ///
    /// - `Ok(Some(v))` from `attempt` ends the walk with `v`.
    /// - `Ok(None)` moves on to the next locale.
    /// - `Err(e)` ends the walk with `e`; later locales are not tried.
    ///
    /// Returns `Ok(None)` once every locale reported absence. Callers that
    /// need to know where a value was found carry the locale inside `T`.
    pub async fn walk<T, F, Fut>(&self, mut attempt: F) -> YatraResult<Option<T>>
    where
        F: FnMut(Locale) -> Fut,
        Fut: Future<Output = YatraResult<Option<T>>>,
    {
        for (step, locale) in self.locales.iter().enumerate() {
            if step > 0 {
                tracing::debug!(
                    requested = %self.requested(),
                    fallback = %locale,
                    "falling back to default locale"
                );
            }
            if let Some(value) = attempt(locale.clone()).await? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use yatra_core::{ContentError, ContentKey, Domain, YatraError};

    fn loc(s: &str) -> Locale {
        Locale::new(s).unwrap()
    }

    fn malformed() -> YatraError {
        ContentError::Malformed {
            key: ContentKey::master(Domain::Festivals, loc("fr")),
            reason: "trailing comma".to_string(),
        }
        .into()
    }

    #[test]
    fn test_chain_shape() {
        let chain = LocaleChain::new(loc("fr"), loc("en"));
        assert_eq!(chain.locales(), &[loc("fr"), loc("en")]);
        assert_eq!(chain.requested(), &loc("fr"));

        let same = LocaleChain::new(loc("en"), loc("en"));
        assert_eq!(same.len(), 1);
        assert!(!same.is_empty());
    }

    #[tokio::test]
    async fn test_requested_locale_wins() {
        let chain = LocaleChain::new(loc("fr"), loc("en"));
        let tried = Mutex::new(Vec::new());
        let hit = chain
            .walk(|locale| {
                tried.lock().unwrap().push(locale.clone());
                async move { Ok(Some(locale.to_string())) }
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit, "fr");
        assert_eq!(tried.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_absence_falls_back_once() {
        let chain = LocaleChain::new(loc("fr"), loc("en"));
        let tried = Mutex::new(Vec::new());
        let hit = chain
            .walk(|locale| {
                tried.lock().unwrap().push(locale.clone());
                async move { Ok((locale.as_str() == "en").then_some(locale)) }
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit, loc("en"));
        assert_eq!(*tried.lock().unwrap(), vec![loc("fr"), loc("en")]);
    }

    #[tokio::test]
    async fn test_exhaustion_is_absence() {
        let chain = LocaleChain::new(loc("de"), loc("en"));
        let tried = Mutex::new(0usize);
        let result: Option<()> = chain
            .walk(|_| {
                *tried.lock().unwrap() += 1;
                async { Ok(None) }
            })
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(*tried.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failure_does_not_fall_back() {
        let chain = LocaleChain::new(loc("fr"), loc("en"));
        let tried = Mutex::new(Vec::new());
        let err = chain
            .walk(|locale| {
                tried.lock().unwrap().push(locale.clone());
                async move {
                    if locale.as_str() == "fr" {
                        Err(malformed())
                    } else {
                        Ok(Some(()))
                    }
                }
            })
            .await
            .unwrap_err();
        assert!(err.is_malformed());
        assert_eq!(*tried.lock().unwrap(), vec![loc("fr")]);
    }
}
