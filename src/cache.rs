//! In-memory TTL cache for per-user shopping lists and short-link lookups.
//!
//! The cache is owned by the application state and handed to handlers
//! explicitly, so tests can build one with whatever TTL they need. Entries
//! are dropped lazily on access; a stale read never outlives its deadline.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Get a cached value if it exists and has not expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some((deadline, value)) if Instant::now() < *deadline => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a value under the cache's TTL, replacing any prior entry.
    pub fn put(&self, key: K, value: V) {
        let deadline = Instant::now() + self.ttl;
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.insert(key, (deadline, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_returns_stored_value() {
        let cache: TtlCache<u32, String> = TtlCache::new(Duration::from_secs(60));
        cache.put(1, "tea".to_string());
        assert_eq!(cache.get(&1), Some("tea".to_string()));
        assert_eq!(cache.get(&2), None);
    }

    #[test]
    fn test_put_replaces_prior_entry() {
        let cache: TtlCache<u32, String> = TtlCache::new(Duration::from_secs(60));
        cache.put(1, "tea".to_string());
        cache.put(1, "coffee".to_string());
        assert_eq!(cache.get(&1), Some("coffee".to_string()));
    }

    #[test]
    fn test_entries_expire() {
        let cache: TtlCache<u32, String> = TtlCache::new(Duration::from_millis(10));
        cache.put(1, "tea".to_string());
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&1), None);
    }
}
