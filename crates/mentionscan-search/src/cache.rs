//! Fingerprint-keyed result cache with TTL and single-flight deduplication.
//!
//! The cache is the only mutable shared state in the search core. All
//! mutation — store, lazy eviction, flight registration — happens under
//! mutexes, and the lock order is always `entries` before `flights`.
//!
//! Expiry uses [`tokio::time::Instant`], so tests can drive it with a
//! paused clock. Wall-clock creation time is kept separately for display
//! and snapshot export.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use mentionscan_core::{Mention, Platform};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::SearchError;
use crate::normalize::Fingerprint;

/// One cached search result bundle. Read-only after creation; the cache
/// owns it and hands out `Arc` references.
#[derive(Debug)]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    /// Post-filter mentions in merged (canonical) order.
    pub mentions: Vec<Mention>,
    /// Pre-filter counts for the platforms that succeeded.
    pub platform_counts: BTreeMap<Platform, usize>,
    pub failed_platforms: Vec<Platform>,
    /// True when this entry was populated while at least one platform
    /// was failing.
    pub partial_failure: bool,
    pub created_at: DateTime<Utc>,
}

struct Stored {
    entry: Arc<CacheEntry>,
    expires_at: Instant,
}

/// Progress of an in-flight population, broadcast to followers.
#[derive(Debug, Clone)]
pub enum FlightState {
    Pending,
    Done(Arc<CacheEntry>),
    Failed { attempted: usize },
}

/// What [`SearchCache::begin`] found for a fingerprint.
pub enum Flight {
    /// A fresh entry already exists.
    Hit(Arc<CacheEntry>),
    /// No entry and no flight: the caller must populate and then resolve
    /// the guard. Exactly one leader exists per fingerprint at a time.
    Leader(FlightGuard),
    /// Another caller is already populating; await its outcome.
    Follower(watch::Receiver<FlightState>),
}

/// Maps query fingerprints to cached result bundles.
pub struct SearchCache {
    default_ttl: Duration,
    entries: Mutex<HashMap<Fingerprint, Stored>>,
    flights: Mutex<HashMap<Fingerprint, watch::Receiver<FlightState>>>,
}

impl SearchCache {
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            entries: Mutex::new(HashMap::new()),
            flights: Mutex::new(HashMap::new()),
        }
    }

    // A poisoned lock means some thread panicked mid-operation. The worst
    // stale state here is a cache entry, and the fallback for cache trouble
    // is "behave like a miss" — so recover the guard instead of unwinding.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<Fingerprint, Stored>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_flights(&self) -> MutexGuard<'_, HashMap<Fingerprint, watch::Receiver<FlightState>>> {
        self.flights.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a fresh entry. An expired entry counts as a miss and is
    /// evicted by the lookup that discovers it.
    #[must_use]
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<Arc<CacheEntry>> {
        let mut entries = self.lock_entries();
        match entries.get(fingerprint) {
            Some(stored) if stored.expires_at > Instant::now() => {
                Some(Arc::clone(&stored.entry))
            }
            Some(_) => {
                entries.remove(fingerprint);
                tracing::debug!(fingerprint = %fingerprint, "evicted expired cache entry");
                None
            }
            None => None,
        }
    }

    /// Store an entry under the default TTL, replacing any previous entry
    /// for the same fingerprint.
    pub fn store(&self, entry: CacheEntry) -> Arc<CacheEntry> {
        self.store_with_ttl(entry, self.default_ttl)
    }

    /// Store with an explicit TTL. The TTL is sampled at store time; later
    /// configuration changes never retroactively alter stored entries.
    pub fn store_with_ttl(&self, entry: CacheEntry, ttl: Duration) -> Arc<CacheEntry> {
        let entry = Arc::new(entry);
        let stored = Stored {
            entry: Arc::clone(&entry),
            expires_at: Instant::now() + ttl,
        };
        self.lock_entries().insert(entry.fingerprint.clone(), stored);
        entry
    }

    /// Operator-triggered invalidation: drop every entry. In-flight
    /// populations are untouched and will re-populate on completion.
    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    /// Resolve a fingerprint to a hit, a leadership claim, or an existing
    /// flight — atomically, so two concurrent callers for the same
    /// fingerprint can never both become leaders.
    pub fn begin(self: &Arc<Self>, fingerprint: &Fingerprint) -> Flight {
        let mut entries = self.lock_entries();
        if let Some(stored) = entries.get(fingerprint) {
            if stored.expires_at > Instant::now() {
                return Flight::Hit(Arc::clone(&stored.entry));
            }
            entries.remove(fingerprint);
        }

        let mut flights = self.lock_flights();
        if let Some(receiver) = flights.get(fingerprint) {
            return Flight::Follower(receiver.clone());
        }
        let (sender, receiver) = watch::channel(FlightState::Pending);
        flights.insert(fingerprint.clone(), receiver);
        Flight::Leader(FlightGuard {
            cache: Arc::clone(self),
            fingerprint: fingerprint.clone(),
            sender: Some(sender),
        })
    }
}

/// Leadership over one in-flight population.
///
/// The leader resolves the flight exactly once, with
/// [`FlightGuard::complete`] or [`FlightGuard::fail`]. Dropping the guard
/// unresolved fails the flight, so followers are never stranded by a
/// panicking leader.
pub struct FlightGuard {
    cache: Arc<SearchCache>,
    fingerprint: Fingerprint,
    sender: Option<watch::Sender<FlightState>>,
}

impl FlightGuard {
    /// Resolve the flight with a populated entry, waking all followers.
    pub fn complete(mut self, entry: Arc<CacheEntry>) {
        self.finish(FlightState::Done(entry));
    }

    /// Resolve the flight as failed: every platform in the fan-out failed
    /// and nothing was cached.
    pub fn fail(mut self, attempted: usize) {
        self.finish(FlightState::Failed { attempted });
    }

    fn finish(&mut self, state: FlightState) {
        if let Some(sender) = self.sender.take() {
            // Deregister first so a caller arriving after the broadcast
            // starts a fresh lookup instead of joining a finished flight.
            self.cache.lock_flights().remove(&self.fingerprint);
            let _ = sender.send(state);
        }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.finish(FlightState::Failed { attempted: 0 });
    }
}

/// Wait for a flight's terminal state.
///
/// # Errors
///
/// Returns [`SearchError::AllPlatformsFailed`] when the leader's fan-out
/// failed entirely, or [`SearchError::Fanout`] if the leader vanished
/// without resolving (should not happen: the guard resolves on drop).
pub async fn await_flight(
    mut receiver: watch::Receiver<FlightState>,
) -> Result<Arc<CacheEntry>, SearchError> {
    loop {
        let state = receiver.borrow_and_update().clone();
        match state {
            FlightState::Done(entry) => return Ok(entry),
            FlightState::Failed { attempted } => {
                return Err(SearchError::AllPlatformsFailed { attempted });
            }
            FlightState::Pending => {}
        }
        if receiver.changed().await.is_err() {
            return Err(SearchError::Fanout("search flight abandoned".to_owned()));
        }
    }
}
