//! Thread-safe in-memory embedding cache

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// In-memory map from raw text to its embedding vector.
///
/// Keys are exact byte matches with no normalization. The cache is
/// unbounded for the engine's lifetime; entries leave only through an
/// explicit `clear`. Reads take a shared lock, writes an exclusive one,
/// and a poisoned lock is recovered rather than surfaced so lookups can
/// never fail.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: RwLock<HashMap<String, Vec<f32>>>,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve the cached embedding for the given text.
    pub fn get(&self, text: &str) -> Option<Vec<f32>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(text)
            .cloned()
    }

    /// Store an embedding, inserting or overwriting.
    pub fn set(&self, text: impl Into<String>, embedding: Vec<f32>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(text.into(), embedding);
    }

    /// Empty the cache by replacing the backing map. Concurrent readers
    /// observe either the old map or the new empty one, never a partial
    /// state.
    pub fn clear(&self) {
        *self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner) = HashMap::new();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_get_returns_what_set_stored() {
        let cache = EmbeddingCache::new();

        cache.set("hello", vec![0.1, 0.2, 0.3]);

        assert_eq!(cache.get("hello"), Some(vec![0.1, 0.2, 0.3]));
    }

    #[test]
    fn test_get_miss_returns_none() {
        let cache = EmbeddingCache::new();

        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_set_overwrites_existing_entry() {
        let cache = EmbeddingCache::new();

        cache.set("text", vec![1.0]);
        cache.set("text", vec![2.0]);

        assert_eq!(cache.get("text"), Some(vec![2.0]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_are_exact_byte_matches() {
        let cache = EmbeddingCache::new();

        cache.set("Hello", vec![1.0]);

        assert_eq!(cache.get("hello"), None);
        assert_eq!(cache.get("Hello "), None);
    }

    #[test]
    fn test_clear_empties_cache() {
        let cache = EmbeddingCache::new();
        cache.set("a", vec![1.0]);
        cache.set("b", vec![2.0]);

        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_len_tracks_entries() {
        let cache = EmbeddingCache::new();
        assert_eq!(cache.len(), 0);

        cache.set("a", vec![1.0]);
        cache.set("b", vec![2.0]);

        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_concurrent_reads_and_writes() {
        let cache = Arc::new(EmbeddingCache::new());

        let writers: Vec<_> = (0..4)
            .map(|worker| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        cache.set(format!("key-{}-{}", worker, i), vec![i as f32]);
                        let _ = cache.get(&format!("key-{}-{}", worker, i));
                    }
                })
            })
            .collect();

        for handle in writers {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 400);
    }
}
