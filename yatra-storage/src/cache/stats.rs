//! Cache statistics.

use serde::{Deserialize, Serialize};

/// Counters and sizes for the resolution cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups answered from a settled entry.
    pub hits: u64,
    /// Lookups that ran a load (store read + parse, or a fallback walk).
    pub loads: u64,
    /// Lookups that waited on another caller's in-flight load.
    pub coalesced: u64,
    /// Settled exact-locale entries.
    pub entry_count: u64,
    /// Settled requested-locale resolutions.
    pub alias_count: u64,
}

impl CacheStats {
    /// Fraction of lookups that did not run a load (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.loads + self.coalesced;
        if total == 0 {
            0.0
        } else {
            (self.hits + self.coalesced) as f64 / total as f64
        }
    }
}
