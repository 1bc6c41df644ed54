//! Resolution cache: a process-lifetime memo table with single-flight loads.
//!
//! # Guarantees
//!
//! - For any key, at most one load runs, even when many callers ask for it
//!   before the first load completes. Late callers await the in-flight load.
//! - A settled entry is never overwritten. A second resolution of the same
//!   key returns the same value (the same `Arc`), not a fresh parse.
//! - Entries live until [`ResolutionCache::clear`]. There is no eviction and
//!   no TTL; the corpus is small and fixed at deploy time.
//!
//! # Two tables
//!
//! Documents are stored under the locale they were actually found in
//! (`entries`). Separately, each requested key remembers which outcome
//! satisfied it (`aliases`), so a repeat request for `fr` that fell back to
//! `en` returns immediately without walking the fallback chain again.

pub mod resolution;
pub mod single_flight;
pub mod stats;

pub use resolution::{MemoPolicy, Outcome, ResolutionCache};
pub use single_flight::{Lookup, LookupSource};
pub use stats::CacheStats;
