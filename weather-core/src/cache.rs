//! Time-bounded response cache owned by a [`WeatherClient`](crate::WeatherClient).
//!
//! Entries are keyed by a typed [`CacheKey`] so that a city called "12:34"
//! can never collide with a coordinate pair. An entry older than the TTL is
//! evicted on the read that discovers it; there is no size bound.

use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::model::{Coordinates, CurrentConditions, Forecast};

pub const DEFAULT_TTL_SECS: u64 = 10 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Current,
    Forecast,
    Coordinates,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Current => "current",
            RequestKind::Forecast => "forecast",
            RequestKind::Coordinates => "coords",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    ByName { kind: RequestKind, name: String },
    /// Coordinates are kept as their exact decimal text, never rounded.
    ByCoords {
        kind: RequestKind,
        lat: String,
        lon: String,
    },
}

impl CacheKey {
    pub fn current(city: &str) -> Self {
        Self::by_name(RequestKind::Current, city)
    }

    pub fn forecast(city: &str) -> Self {
        Self::by_name(RequestKind::Forecast, city)
    }

    pub fn coordinates(coords: Coordinates) -> Self {
        Self::ByCoords {
            kind: RequestKind::Coordinates,
            lat: coords.lat.to_string(),
            lon: coords.lon.to_string(),
        }
    }

    fn by_name(kind: RequestKind, city: &str) -> Self {
        Self::ByName {
            kind,
            name: normalize_city(city),
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::ByName { kind, name } => write!(f, "{}:{}", kind.as_str(), name),
            CacheKey::ByCoords { kind, lat, lon } => {
                write!(f, "{}:{}:{}", kind.as_str(), lat, lon)
            }
        }
    }
}

pub fn normalize_city(city: &str) -> String {
    city.trim().to_lowercase()
}

/// Source of wall-clock time for entry ageing.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub payload: T,
    pub stored_at: DateTime<Utc>,
}

/// Payloads the client memoizes. The key's [`RequestKind`] decides which
/// variant is stored under it.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedResponse {
    Current(CurrentConditions),
    Forecast(Forecast),
}

impl CachedResponse {
    pub fn into_current(self) -> Option<CurrentConditions> {
        match self {
            CachedResponse::Current(current) => Some(current),
            CachedResponse::Forecast(_) => None,
        }
    }

    pub fn into_forecast(self) -> Option<Forecast> {
        match self {
            CachedResponse::Forecast(forecast) => Some(forecast),
            CachedResponse::Current(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct ResponseCache<T> {
    entries: Mutex<HashMap<CacheKey, CacheEntry<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(ttl: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl = Duration::from_std(ttl).unwrap_or_else(|_| Duration::seconds(DEFAULT_TTL_SECS as i64));
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Returns a fresh payload, evicting the entry if it has outlived the TTL.
    /// The lookup, age check and eviction happen under one lock.
    pub fn get(&self, key: &CacheKey) -> Option<T> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        let entry = entries.get(key)?;
        if now - entry.stored_at > self.ttl {
            entries.remove(key);
            tracing::debug!(%key, "cache entry expired, evicted");
            return None;
        }

        tracing::debug!(%key, "cache hit");
        Some(entry.payload.clone())
    }

    pub fn insert(&self, key: CacheKey, payload: T) {
        let entry = CacheEntry {
            payload,
            stored_at: self.clock.now(),
        };
        tracing::debug!(%key, "cache store");
        self.entries.lock().insert(key, entry);
    }

    /// Raw presence check. Does not age or evict.
    pub fn contains_key(&self, key: &CacheKey) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Serialises fetches per key so two concurrent misses for the same key
/// produce a single request; the waiter re-checks the cache once it holds
/// the guard.
///
/// A slot lives only while some task holds or waits on it, so the map stays
/// as small as the set of keys currently being fetched.
#[derive(Debug, Default)]
pub struct FetchCoalescer {
    inflight: Mutex<HashMap<CacheKey, Slot>>,
}

#[derive(Debug)]
struct Slot {
    lock: Arc<AsyncMutex<()>>,
    users: usize,
}

impl FetchCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &CacheKey) -> CoalesceGuard<'_> {
        let lock = {
            let mut inflight = self.inflight.lock();
            let slot = inflight.entry(key.clone()).or_insert_with(|| Slot {
                lock: Arc::new(AsyncMutex::new(())),
                users: 0,
            });
            slot.users += 1;
            Arc::clone(&slot.lock)
        };

        // Registered before waiting: a cancelled wait still releases the slot.
        let mut guard = CoalesceGuard {
            coalescer: self,
            key: key.clone(),
            held: None,
        };
        guard.held = Some(lock.lock_owned().await);
        guard
    }

    /// Number of keys with a fetch in progress or queued.
    pub fn len(&self) -> usize {
        self.inflight.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inflight.lock().is_empty()
    }

    fn release(&self, key: &CacheKey) {
        let mut inflight = self.inflight.lock();
        if let Some(slot) = inflight.get_mut(key) {
            slot.users -= 1;
            if slot.users == 0 {
                inflight.remove(key);
            }
        }
    }
}

/// Exclusive right to fetch one key. Dropping it lets the next waiter in
/// and forgets the key once nobody else wants it.
#[derive(Debug)]
pub struct CoalesceGuard<'a> {
    coalescer: &'a FetchCoalescer,
    key: CacheKey,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for CoalesceGuard<'_> {
    fn drop(&mut self) {
        self.held.take();
        self.coalescer.release(&self.key);
    }
}
