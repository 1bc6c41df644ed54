//! Single-flight table: one load per key, shared by every concurrent caller.
//!
//! Each key owns a slot that is either settled or in flight. The first
//! caller to reach an empty slot spawns the load onto the runtime and parks
//! a [`Shared`] handle to it in the slot; every caller that arrives before
//! it completes awaits that same handle. The spawned task settles the slot
//! itself, so a caller that gives up (timeout, dropped request) neither
//! cancels the read nor loses its result.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use yatra_core::{ContentKey, StorageError};

use super::resolution::{MemoPolicy, Outcome};

/// How a lookup was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupSource {
    /// The value was already settled when the lookup started.
    Hit,
    /// This caller started the load.
    Loaded,
    /// Another caller's in-flight load produced the value.
    Coalesced,
}

impl LookupSource {
    /// True when this caller did not start the load itself.
    pub fn is_shared(self) -> bool {
        !matches!(self, Self::Loaded)
    }
}

/// A value together with how it was obtained.
#[derive(Debug, Clone)]
pub struct Lookup<V> {
    pub value: V,
    pub source: LookupSource,
}

#[derive(Debug, Default)]
pub(crate) struct FlightCounters {
    pub hits: AtomicU64,
    pub loads: AtomicU64,
    pub coalesced: AtomicU64,
}

impl FlightCounters {
    fn record(&self, source: LookupSource) {
        let counter = match source {
            LookupSource::Hit => &self.hits,
            LookupSource::Loaded => &self.loads,
            LookupSource::Coalesced => &self.coalesced,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.loads.store(0, Ordering::Relaxed);
        self.coalesced.store(0, Ordering::Relaxed);
    }
}

type Flight<T> = Shared<BoxFuture<'static, Outcome<T>>>;

enum Slot<T> {
    Settled(Outcome<T>),
    InFlight { id: u64, flight: Flight<T> },
}

type Slots<T> = Mutex<HashMap<ContentKey, Slot<T>>>;

// Critical sections only insert, look up, remove, or clear whole slots; a
// panic inside one cannot leave the map half-updated.
fn lock<T>(slots: &Slots<T>) -> MutexGuard<'_, HashMap<ContentKey, Slot<T>>> {
    slots.lock().unwrap_or_else(|e| e.into_inner())
}

pub(crate) struct FlightTable<T> {
    slots: Arc<Slots<T>>,
    next_id: AtomicU64,
}

impl<T> Default for FlightTable<T> {
    fn default() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> FlightTable<T> {
    /// Settled outcome for `key`, without waiting on an in-flight load.
    pub fn get(&self, key: &ContentKey) -> Option<Outcome<T>> {
        match lock(&self.slots).get(key) {
            Some(Slot::Settled(outcome)) => Some(outcome.clone()),
            _ => None,
        }
    }

    /// Settle `key` with `outcome` unless it is settled or loading.
    pub fn put(&self, key: &ContentKey, outcome: Outcome<T>) -> bool {
        let mut slots = lock(&self.slots);
        if slots.contains_key(key) {
            return false;
        }
        slots.insert(key.clone(), Slot::Settled(outcome));
        true
    }

    /// Return the settled outcome for `key`, or join the single load for it,
    /// starting one if none is running.
    ///
    /// Every caller that joins before the load finishes receives its
    /// outcome. Afterwards the outcome stays settled only if `policy` keeps
    /// it; otherwise the slot is emptied and the next lookup loads again.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn get_or_load<F, Fut>(
        &self,
        key: &ContentKey,
        counters: &FlightCounters,
        policy: MemoPolicy,
        load: F,
    ) -> Lookup<Outcome<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome<T>> + Send + 'static,
    {
        let (flight, source) = {
            let mut slots = lock(&self.slots);
            match slots.get(key) {
                Some(Slot::Settled(outcome)) => {
                    counters.record(LookupSource::Hit);
                    return Lookup {
                        value: outcome.clone(),
                        source: LookupSource::Hit,
                    };
                }
                Some(Slot::InFlight { flight, .. }) => (flight.clone(), LookupSource::Coalesced),
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let flight = self.launch(key.clone(), id, policy, load());
                    slots.insert(
                        key.clone(),
                        Slot::InFlight {
                            id,
                            flight: flight.clone(),
                        },
                    );
                    (flight, LookupSource::Loaded)
                }
            }
        };
        counters.record(source);

        Lookup {
            value: flight.await,
            source,
        }
    }

    /// Spawn `load` and return a joinable handle to its outcome.
    fn launch<Fut>(&self, key: ContentKey, id: u64, policy: MemoPolicy, load: Fut) -> Flight<T>
    where
        Fut: Future<Output = Outcome<T>> + Send + 'static,
    {
        let slots = Arc::clone(&self.slots);
        let settle_key = key.clone();
        let task = tokio::spawn(async move {
            let outcome = load.await;
            {
                let mut slots = lock(&slots);
                // A clear() since launch detached this flight; leave the new slot alone.
                let current = matches!(
                    slots.get(&settle_key),
                    Some(Slot::InFlight { id: live, .. }) if *live == id
                );
                if current {
                    if policy.keeps(&outcome) {
                        slots.insert(settle_key, Slot::Settled(outcome.clone()));
                    } else {
                        slots.remove(&settle_key);
                    }
                }
            }
            outcome
        });

        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "content load task failed");
                    Err(StorageError::Unavailable {
                        path: key.to_string(),
                        reason: format!("load task failed: {e}"),
                    }
                    .into())
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Number of settled entries.
    pub fn len(&self) -> usize {
        lock(&self.slots)
            .values()
            .filter(|slot| matches!(slot, Slot::Settled(_)))
            .count()
    }

    /// Forget every slot. Loads already in flight still answer the callers
    /// that joined them but settle nothing.
    pub fn clear(&self) {
        lock(&self.slots).clear();
    }
}
