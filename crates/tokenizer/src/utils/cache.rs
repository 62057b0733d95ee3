//! Per-word encoding memo.
//!
//! Keyed by the original word string. Entries stay valid for the lifetime
//! of the tokenizer because merge rules never change after load.

use ahash::AHashMap;
use compact_str::CompactString;
use std::collections::VecDeque;

/// Memo of word -> final BPE symbols.
///
/// Unbounded by default. With a capacity, the least recently used entry is
/// evicted first.
#[derive(Debug, Clone, Default)]
pub struct EncodingCache {
    cache: AHashMap<String, Vec<CompactString>>,
    /// `None` means unbounded
    capacity: Option<usize>,
    /// Recency order, oldest first; only kept when bounded
    order: VecDeque<String>,
    hits: u64,
    misses: u64,
}

impl EncodingCache {
    /// Unbounded cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache holding at most `capacity` words.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: AHashMap::with_capacity(capacity),
            capacity: Some(capacity),
            order: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn from_capacity(capacity: Option<usize>) -> Self {
        capacity.map_or_else(Self::new, Self::with_capacity)
    }

    /// Get cached symbols or compute them with `encoder`.
    pub fn get_or_encode<F>(&mut self, word: &str, encoder: F) -> Vec<CompactString>
    where
        F: FnOnce(&str) -> Vec<CompactString>,
    {
        if let Some(cached) = self.cache.get(word).cloned() {
            self.hits += 1;
            self.touch(word);
            return cached;
        }

        self.misses += 1;
        let symbols = encoder(word);
        self.insert(word.to_string(), symbols.clone());
        symbols
    }

    pub fn get(&self, word: &str) -> Option<&[CompactString]> {
        self.cache.get(word).map(Vec::as_slice)
    }

    fn touch(&mut self, word: &str) {
        if self.capacity.is_none() {
            return;
        }
        if let Some(pos) = self.order.iter().position(|w| w == word) {
            if let Some(key) = self.order.remove(pos) {
                self.order.push_back(key);
            }
        }
    }

    fn insert(&mut self, key: String, value: Vec<CompactString>) {
        let Some(capacity) = self.capacity else {
            self.cache.insert(key, value);
            return;
        };
        if capacity == 0 {
            return;
        }

        while self.cache.len() >= capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.cache.remove(&oldest);
                }
                None => break,
            }
        }

        self.order.push_back(key.clone());
        self.cache.insert(key, value);
    }

    /// Clear all entries; statistics are kept.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.cache.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries
    pub entries: usize,
    /// Maximum capacity, `None` if unbounded
    pub capacity: Option<usize>,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, `None` before any lookup.
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        (total > 0).then(|| self.hits as f64 / total as f64)
    }
}
