//! In-process time-to-live cache used to avoid repeating upstream calls.
//!
//! Entries expire lazily: a read at or after an entry's deadline removes it and
//! reports a miss. There is no background sweep and no capacity bound, so a
//! process that queries an unbounded set of keys grows without limit.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// A string-keyed TTL cache.
///
/// The map sits behind a single mutex that is held only for the map access
/// itself, never across a network round trip. Build one at startup and share
/// it by `Arc`.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a clone of the cached value while it is still fresh.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `value` under `key` until `now + ttl`, replacing both the value
    /// and the deadline of any previous entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.lock()
            .insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Number of entries currently held, expired-but-unread ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Poisoning is ignored: every critical section is a single map call.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Key for the latest observation of a station.
pub fn observation_key(station_id: &str) -> String {
    format!("obs:{}", station_id.to_uppercase())
}

/// Key for the forecast at a point. Coordinates are rounded first so that
/// near-identical queries share one entry.
pub fn forecast_key(lat: f64, lon: f64) -> String {
    format!("fc:{}:{}", round_coord(lat), round_coord(lon))
}

/// Rounds a coordinate to 3 decimal places (roughly 100 m).
pub fn round_coord(value: f64) -> f64 {
    let rounded = (value * 1000.0).round() / 1000.0;
    // -0.0 would otherwise key differently from 0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_set_then_get_returns_value() {
        let cache = TtlCache::new();
        cache.set("obs:KMWL", 42_u32, Duration::from_secs(300));
        assert_eq!(cache.get("obs:KMWL"), Some(42));
        assert_eq!(cache.get("obs:KDFW"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_absent_and_evicted() {
        let cache = TtlCache::new();
        cache.set("k", "v".to_string(), Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(cache.get("k").as_deref(), Some("v"));
        assert_eq!(cache.len(), 1);

        // Expiry is inclusive of the deadline itself.
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_replaces_value_and_expiry() {
        let cache = TtlCache::new();
        cache.set("k", 1, Duration::from_secs(100));
        cache.set("k", 2, Duration::from_secs(5));
        assert_eq!(cache.get("k"), Some(2));

        tokio::time::advance(Duration::from_secs(6)).await;
        // The older, later-expiring write must not come back.
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_is_lazy() {
        let cache = TtlCache::new();
        cache.set("a", 1, Duration::from_secs(1));
        cache.set("b", 2, Duration::from_secs(60));
        tokio::time::advance(Duration::from_secs(2)).await;

        // Nothing sweeps in the background.
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = Arc::new(TtlCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        cache.set(format!("k{i}-{j}"), i * j, Duration::from_secs(60));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 400);
        assert_eq!(cache.get("k3-7"), Some(21));
    }

    #[test]
    fn test_observation_key_uppercases_station() {
        assert_eq!(observation_key("kmwl"), "obs:KMWL");
        assert_eq!(observation_key("KDFW"), "obs:KDFW");
    }

    #[test]
    fn test_forecast_key_collapses_nearby_points() {
        assert_eq!(forecast_key(32.793195, -98.089052), "fc:32.793:-98.089");
        assert_eq!(
            forecast_key(32.79321, -98.08899),
            forecast_key(32.793195, -98.089052)
        );
        assert_ne!(forecast_key(32.794, -98.089), forecast_key(32.793, -98.089));
    }

    #[test]
    fn test_round_coord_normalizes_negative_zero() {
        assert_eq!(forecast_key(-0.0001, 0.0002), "fc:0:0");
    }
}
