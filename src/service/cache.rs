use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 带过期时间和容量上限的缓存
///
/// 过期条目在读取时视为不存在; 写入时如果已满, 先清理过期条目, 仍满则淘汰最早写入的条目。
pub struct TimedCache<K, V> {
    entries: DashMap<K, (Instant, Arc<V>)>,
    ttl: Duration,
    max_entries: usize,
}

impl<K: Eq + Hash + Clone, V> TimedCache<K, V> {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries,
        }
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        if let Some(entry) = self.entries.get(key) {
            let (inserted_at, value) = entry.value();
            if inserted_at.elapsed() < self.ttl {
                return Some(value.clone());
            }
        }
        self.entries
            .remove_if(key, |_, (inserted_at, _)| inserted_at.elapsed() >= self.ttl);
        None
    }

    pub fn insert(&self, key: K, value: Arc<V>) {
        if self.max_entries == 0 {
            return;
        }
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            self.entries.retain(|_, (inserted_at, _)| inserted_at.elapsed() < self.ttl);
        }
        while self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().0)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.entries.insert(key, (Instant::now(), value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_returned() {
        let cache = TimedCache::new(Duration::from_secs(60), 4);
        cache.insert("a", Arc::new(1));
        assert_eq!(cache.get(&"a").as_deref(), Some(&1));
        assert_eq!(cache.get(&"b"), None);
    }

    #[test]
    fn expired_entry_removed_on_read() {
        let cache = TimedCache::new(Duration::from_millis(20), 4);
        cache.insert("a", Arc::new(1));
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&"a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn oldest_entry_evicted_when_full() {
        let cache = TimedCache::new(Duration::from_secs(60), 2);
        cache.insert("a", Arc::new(1));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("b", Arc::new(2));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("c", Arc::new(3));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b").as_deref(), Some(&2));
        assert_eq!(cache.get(&"c").as_deref(), Some(&3));
    }

    #[test]
    fn overwriting_existing_key_does_not_evict() {
        let cache = TimedCache::new(Duration::from_secs(60), 2);
        cache.insert("a", Arc::new(1));
        cache.insert("b", Arc::new(2));
        cache.insert("b", Arc::new(20));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"b").as_deref(), Some(&20));
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let cache = TimedCache::new(Duration::from_secs(60), 0);
        cache.insert("a", Arc::new(1));
        assert!(cache.is_empty());
    }
}
