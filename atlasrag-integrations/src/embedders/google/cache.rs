//! In-memory cache of computed embeddings.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache key: model, task type and a digest of the text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Model identifier
    pub model: String,
    /// Task type the embedding was computed for
    pub task: &'static str,
    /// Hex SHA-256 of the text
    pub text_hash: String,
}

impl CacheKey {
    /// Create a key for `text` embedded by `model` for `task`.
    pub fn new(model: &str, task: &'static str, text: &str) -> Self {
        let text_hash = format!("{:x}", Sha256::digest(text.as_bytes()));
        Self {
            model: model.to_string(),
            task,
            text_hash,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    embedding: Vec<f32>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Storage for embeddings keyed by [`CacheKey`].
#[async_trait]
pub trait EmbeddingCache: Send + Sync + std::fmt::Debug {
    /// Look up an embedding.
    async fn get(&self, key: &CacheKey) -> Option<Vec<f32>>;

    /// Store an embedding for `ttl`.
    async fn put(&self, key: CacheKey, embedding: Vec<f32>, ttl: Duration);

    /// Drop expired entries, returning how many were removed.
    async fn cleanup(&self) -> usize;

    /// Current statistics.
    async fn stats(&self) -> CacheStats;

    /// Remove every entry.
    async fn clear(&self);
}

/// Cache statistics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Live entries
    pub total_entries: usize,
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that missed or found an expired entry
    pub misses: u64,
    /// Entries removed by [`EmbeddingCache::cleanup`]
    pub expired_entries: usize,
}

impl CacheStats {
    /// Hit rate as a percentage.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

/// [`EmbeddingCache`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    stats: RwLock<CacheStats>,
}

impl InMemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmbeddingCache for InMemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<Vec<f32>> {
        let mut entries = self.entries.write().await;
        let mut stats = self.stats.write().await;

        match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                stats.hits += 1;
                Some(entry.embedding.clone())
            }
            Some(_) => {
                entries.remove(key);
                stats.misses += 1;
                stats.expired_entries += 1;
                None
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    async fn put(&self, key: CacheKey, embedding: Vec<f32>, ttl: Duration) {
        let entry = CacheEntry {
            embedding,
            expires_at: Instant::now() + ttl,
        };

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let removed = before - entries.len();
        entries.insert(key, entry);
        drop(entries);

        if removed > 0 {
            self.stats.write().await.expired_entries += removed;
        }
    }

    async fn cleanup(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let removed = before - entries.len();

        self.stats.write().await.expired_entries += removed;
        removed
    }

    async fn stats(&self) -> CacheStats {
        let total_entries = self.entries.read().await.len();
        let mut stats = self.stats.read().await.clone();
        stats.total_entries = total_entries;
        stats
    }

    async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key() {
        let a = CacheKey::new("embedding-001", "RETRIEVAL_QUERY", "hello world");
        let b = CacheKey::new("embedding-001", "RETRIEVAL_QUERY", "hello world");
        let c = CacheKey::new("embedding-001", "RETRIEVAL_DOCUMENT", "hello world");
        let d = CacheKey::new("embedding-001", "RETRIEVAL_QUERY", "other");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a.text_hash.len(), 64);
    }

    #[tokio::test]
    async fn test_hit_and_miss() {
        let cache = InMemoryCache::new();
        let key = CacheKey::new("m", "RETRIEVAL_QUERY", "text");

        assert!(cache.get(&key).await.is_none());
        cache
            .put(key.clone(), vec![1.0, 2.0], Duration::from_secs(60))
            .await;
        assert_eq!(cache.get(&key).await, Some(vec![1.0, 2.0]));

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
        assert!((stats.hit_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_expired_entry_evicted_on_get() {
        let cache = InMemoryCache::new();
        let key = CacheKey::new("m", "RETRIEVAL_QUERY", "text");

        cache.put(key.clone(), vec![1.0], Duration::ZERO).await;
        assert!(cache.get(&key).await.is_none());

        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(cache.cleanup().await, 0);
    }

    #[tokio::test]
    async fn test_expired_entries_do_not_accumulate() {
        let cache = InMemoryCache::new();

        for i in 0..1000 {
            let text = format!("text {i}");
            cache
                .put(CacheKey::new("m", "RETRIEVAL_QUERY", &text), vec![1.0], Duration::ZERO)
                .await;
            let other = CacheKey::new("m", "RETRIEVAL_QUERY", "never stored");
            assert!(cache.get(&other).await.is_none());
        }

        assert!(cache.stats().await.total_entries <= 1);
        assert_eq!(cache.cleanup().await, 1);
        assert_eq!(cache.stats().await.total_entries, 0);
    }

    #[tokio::test]
    async fn test_put_prunes_expired_entries() {
        let cache = InMemoryCache::new();
        let stale = CacheKey::new("m", "RETRIEVAL_QUERY", "stale");
        let fresh = CacheKey::new("m", "RETRIEVAL_QUERY", "fresh");

        cache.put(stale, vec![1.0], Duration::ZERO).await;
        cache
            .put(fresh.clone(), vec![2.0], Duration::from_secs(60))
            .await;

        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(cache.get(&fresh).await, Some(vec![2.0]));
    }
}
