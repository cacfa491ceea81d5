//! Fixed-capacity map with least-recently-used eviction.

use std::borrow::Borrow;
use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;

/// Fixed-capacity map with strict LRU eviction.
///
/// Reads through [`get`](Self::get) and writes through [`put`](Self::put)
/// both count as access. [`peek`](Self::peek) and iteration do not.
pub struct BoundedMap<K: Hash + Eq, V> {
    lru: LruCache<K, V>,
}

impl<K: Hash + Eq, V> BoundedMap<K, V> {
    /// Create a map holding at most `capacity` entries. Zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            lru: LruCache::new(cap),
        }
    }

    pub fn capacity(&self) -> usize {
        self.lru.cap().get()
    }

    pub fn len(&self) -> usize {
        self.lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }

    /// Look up a value and mark it most-recently-used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lru.get(key)
    }

    /// Mutable lookup; marks the entry most-recently-used.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lru.get_mut(key)
    }

    /// Look up a value without touching recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lru.peek(key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lru.contains(key)
    }

    /// Insert or overwrite an entry and mark it most-recently-used.
    ///
    /// Returns the entry evicted to make room, if any. Overwriting an
    /// existing key never evicts.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.lru.contains(&key) {
            self.lru.put(key, value);
            None
        } else {
            self.lru.push(key, value)
        }
    }

    /// Touch `key`, creating its value with `f` if absent.
    ///
    /// Creating may silently evict the least-recently-used entry; call
    /// [`would_evict`](Self::would_evict) first to find out which.
    pub fn get_or_insert_with<F>(&mut self, key: K, f: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        self.lru.get_or_insert_mut(key, f)
    }

    /// The key that inserting `key` would evict, if any.
    pub fn would_evict<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.lru.len() < self.capacity() || self.lru.contains(key) {
            return None;
        }
        self.lru.peek_lru().map(|(k, _)| k)
    }

    /// Remove an entry.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lru.pop(key)
    }

    /// The most-recently-touched entry, without touching it again.
    pub fn last_entry(&self) -> Option<(&K, &V)> {
        self.lru.iter().next()
    }

    /// The most-recently-touched key.
    pub fn last_key(&self) -> Option<&K> {
        self.last_entry().map(|(k, _)| k)
    }

    /// Entries from most- to least-recently-used. Does not touch recency.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.lru.iter()
    }

    /// Keys from most- to least-recently-used.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.lru.iter().map(|(k, _)| k)
    }
}

impl<K: Hash + Eq + std::fmt::Debug, V> std::fmt::Debug for BoundedMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedMap")
            .field("capacity", &self.capacity())
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(keys: &[&'static str]) -> BoundedMap<&'static str, usize> {
        let mut map = BoundedMap::new(3);
        for (i, k) in keys.iter().enumerate() {
            map.put(*k, i);
        }
        map
    }

    #[test]
    fn test_evicts_least_recently_inserted() {
        let mut map = filled(&["a", "b", "c"]);

        let evicted = map.put("d", 3);

        assert_eq!(evicted, Some(("a", 0)));
        assert_eq!(map.len(), 3);
        assert!(!map.contains("a"));
        assert!(map.contains("b"));
        assert!(map.contains("c"));
        assert!(map.contains("d"));
    }

    #[test]
    fn test_read_refreshes_recency() {
        let mut map = filled(&["a", "b", "c"]);

        assert_eq!(map.get("a"), Some(&0));
        let evicted = map.put("d", 3);

        assert_eq!(evicted, Some(("b", 1)));
        assert!(map.contains("a"));
    }

    #[test]
    fn test_peek_does_not_refresh() {
        let mut map = filled(&["a", "b", "c"]);

        assert_eq!(map.peek("a"), Some(&0));
        let evicted = map.put("d", 3);

        assert_eq!(evicted.map(|(k, _)| k), Some("a"));
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let mut map = filled(&["a", "b", "c"]);

        assert_eq!(map.put("a", 10), None);
        assert_eq!(map.len(), 3);
        assert_eq!(map.peek("a"), Some(&10));
        assert_eq!(map.last_key(), Some(&"a"));
    }

    #[test]
    fn test_last_key_tracks_reads_and_writes() {
        let mut map = BoundedMap::new(3);
        assert_eq!(map.last_key(), None);

        map.put("a", 1);
        map.put("b", 2);
        assert_eq!(map.last_key(), Some(&"b"));

        map.get("a");
        assert_eq!(map.last_key(), Some(&"a"));
        assert_eq!(map.last_entry(), Some((&"a", &1)));
    }

    #[test]
    fn test_would_evict_and_get_or_insert() {
        let mut map = filled(&["a", "b", "c"]);

        assert_eq!(map.would_evict("b"), None);
        assert_eq!(map.would_evict("z"), Some(&"a"));

        *map.get_or_insert_with("z", || 0) += 7;
        assert_eq!(map.peek("z"), Some(&7));
        assert!(!map.contains("a"));

        // Existing key is touched, not replaced.
        *map.get_or_insert_with("b", || 100) += 1;
        assert_eq!(map.peek("b"), Some(&2));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec![&"b", &"z", &"c"]);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut map = BoundedMap::new(0);
        assert_eq!(map.capacity(), 1);

        map.put(1, "one");
        map.put(2, "two");
        assert_eq!(map.len(), 1);
        assert_eq!(map.last_key(), Some(&2));
    }

    #[test]
    fn test_remove() {
        let mut map = filled(&["a", "b"]);
        assert_eq!(map.remove("a"), Some(0));
        assert_eq!(map.remove("a"), None);
        assert_eq!(map.len(), 1);
    }
}
