//! Keyed query cache with in-flight deduplication.
//!
//! Modules:
//! - `client`: the session-scoped `QueryClient` owning one cache per data kind
//!
//! Entries carry their own time-to-live and expire lazily: an expired entry is
//! treated as absent the next time it is looked up. Failures are stored like
//! successes, so a failing provider is not hammered within the entry's TTL.

mod client;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use atlas_types::AtlasError;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, trace};

pub use client::{QueryClient, QueryTtls};

/// Outcome shared between every caller waiting on the same key.
pub type QueryResult<V> = Result<Arc<V>, AtlasError>;

type SharedQuery<V> = Shared<BoxFuture<'static, QueryResult<V>>>;

/// Capacity of the cache event channel. Slow subscribers observe `Lagged`.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEventKind {
    Stored { ok: bool },
    Invalidated,
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    /// Name of the cache that changed, for example `countries`.
    pub cache: &'static str,
    /// Affected key; `None` when the whole cache was cleared.
    pub key: Option<String>,
    pub kind: CacheEventKind,
}

struct CacheEntry<V> {
    outcome: QueryResult<V>,
    fetched_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.fetched_at) < self.ttl
    }
}

struct InFlight<V> {
    generation: u64,
    future: SharedQuery<V>,
}

struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    in_flight: HashMap<String, InFlight<V>>,
    next_generation: u64,
}

impl<V> Default for CacheState<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            in_flight: HashMap::new(),
            next_generation: 0,
        }
    }
}

pub struct KeyedQueryCache<V> {
    name: &'static str,
    state: Mutex<CacheState<V>>,
    events: broadcast::Sender<CacheEvent>,
}

impl<V> std::fmt::Debug for KeyedQueryCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("KeyedQueryCache")
            .field("name", &self.name)
            .field("entries", &state.entries.len())
            .field("in_flight", &state.in_flight.len())
            .finish()
    }
}

impl<V: Send + Sync + 'static> KeyedQueryCache<V> {
    /// Create a cache that reports its changes on `events`.
    pub fn new(name: &'static str, events: broadcast::Sender<CacheEvent>) -> Self {
        Self {
            name,
            state: Mutex::new(CacheState::default()),
            events,
        }
    }

    /// Create a cache with a private event channel.
    pub fn standalone(name: &'static str) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self::new(name, events)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Resolve `key`.
    ///
    /// A fresh entry is returned without invoking `producer`. When a fetch for
    /// the key is already running the caller waits on it instead of starting a
    /// second one. Otherwise `producer` is invoked once and its outcome is
    /// stored for `ttl`.
    pub async fn get<F, Fut>(&self, key: &str, ttl: Duration, producer: F) -> QueryResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, AtlasError>> + Send + 'static,
    {
        let (generation, future) = {
            let mut state = self.lock();
            let now = Instant::now();
            match state.entries.get(key) {
                Some(entry) if entry.is_fresh(now) => {
                    trace!(cache = self.name, key, "cache hit");
                    return entry.outcome.clone();
                }
                Some(_) => {
                    state.entries.remove(key);
                    debug!(cache = self.name, key, "cache entry expired");
                }
                None => {}
            }

            if let Some(in_flight) = state.in_flight.get(key) {
                debug!(cache = self.name, key, "joining in-flight query");
                (in_flight.generation, in_flight.future.clone())
            } else {
                let generation = state.next_generation;
                state.next_generation += 1;
                let future: SharedQuery<V> = producer().map(|outcome| outcome.map(Arc::new)).boxed().shared();
                state.in_flight.insert(
                    key.to_string(),
                    InFlight {
                        generation,
                        future: future.clone(),
                    },
                );
                debug!(cache = self.name, key, "cache miss; query started");
                (generation, future)
            }
        };

        let outcome = future.await;
        self.settle(key, generation, ttl, &outcome);
        outcome
    }

    /// Fresh stored outcome for `key`, if any. Never starts a fetch.
    pub fn peek(&self, key: &str) -> Option<QueryResult<V>> {
        let state = self.lock();
        state
            .entries
            .get(key)
            .filter(|entry| entry.is_fresh(Instant::now()))
            .map(|entry| entry.outcome.clone())
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.lock().in_flight.contains_key(key)
    }

    /// Drop the stored outcome for `key`. A fetch already running for the key
    /// still answers its waiters but is not stored.
    pub fn invalidate(&self, key: &str) {
        let removed = {
            let mut state = self.lock();
            let entry = state.entries.remove(key).is_some();
            let running = state.in_flight.remove(key).is_some();
            entry || running
        };
        if removed {
            debug!(cache = self.name, key, "cache entry invalidated");
            self.emit(Some(key.to_string()), CacheEventKind::Invalidated);
        }
    }

    pub fn clear(&self) {
        {
            let mut state = self.lock();
            state.entries.clear();
            state.in_flight.clear();
        }
        debug!(cache = self.name, "cache cleared");
        self.emit(None, CacheEventKind::Cleared);
    }

    /// Store the outcome if the fetch that produced it is still the one
    /// registered for `key`. Every waiter calls this; only the first stores.
    fn settle(&self, key: &str, generation: u64, ttl: Duration, outcome: &QueryResult<V>) {
        {
            let mut state = self.lock();
            match state.in_flight.get(key) {
                Some(in_flight) if in_flight.generation == generation => {}
                _ => return,
            }
            state.in_flight.remove(key);
            state.entries.insert(
                key.to_string(),
                CacheEntry {
                    outcome: outcome.clone(),
                    fetched_at: Instant::now(),
                    ttl,
                },
            );
        }
        debug!(cache = self.name, key, ok = outcome.is_ok(), ttl_secs = ttl.as_secs(), "query settled");
        self.emit(Some(key.to_string()), CacheEventKind::Stored { ok: outcome.is_ok() });
    }

    fn emit(&self, key: Option<String>, kind: CacheEventKind) {
        // No subscribers is not an error.
        let _ = self.events.send(CacheEvent {
            cache: self.name,
            key,
            kind,
        });
    }
}

impl<V> KeyedQueryCache<V> {
    fn lock(&self) -> MutexGuard<'_, CacheState<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
