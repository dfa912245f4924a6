//! Bounded memo caches for repeated clue lookups and word counts.
//!
//! Keyed by the exact input text. Both maps are LRU-evicted, so memory stays
//! bounded no matter how many distinct prompts pass through a long-lived
//! process.

use crate::patterns::Clue;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

pub const PATTERN_CAPACITY: usize = 256;
pub const WORD_COUNT_CAPACITY: usize = 512;

pub struct AnalysisCache {
    patterns: Mutex<LruCache<(Clue, String), bool>>,
    word_counts: Mutex<LruCache<String, usize>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::with_capacity(PATTERN_CAPACITY, WORD_COUNT_CAPACITY)
    }

    pub fn with_capacity(patterns: usize, word_counts: usize) -> Self {
        Self {
            patterns: Mutex::new(LruCache::new(non_zero(patterns))),
            word_counts: Mutex::new(LruCache::new(non_zero(word_counts))),
        }
    }

    /// Memoized clue lookup. `detect` runs only on a miss.
    pub fn clue(&self, clue: Clue, text: &str, detect: impl FnOnce() -> bool) -> bool {
        let key = (clue, text.to_string());
        let mut cache = self.patterns.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(hit) = cache.get(&key) {
            return *hit;
        }
        let found = detect();
        cache.put(key, found);
        found
    }

    /// Memoized whitespace word count.
    pub fn word_count(&self, text: &str) -> usize {
        let mut cache = self.word_counts.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(count) = cache.get(text) {
            return *count;
        }
        let count = text.split_whitespace().count();
        cache.put(text.to_string(), count);
        count
    }

    pub fn sizes(&self) -> (usize, usize) {
        let patterns = self.patterns.lock().unwrap_or_else(|e| e.into_inner()).len();
        let words = self.word_counts.lock().unwrap_or_else(|e| e.into_inner()).len();
        (patterns, words)
    }

    pub fn clear(&self) {
        self.patterns.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.word_counts.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnalysisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (patterns, words) = self.sizes();
        f.debug_struct("AnalysisCache")
            .field("patterns", &patterns)
            .field("word_counts", &words)
            .finish()
    }
}

fn non_zero(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}
