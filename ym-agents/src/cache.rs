//! Memo cache with hit/miss counters.
//!
//! Keys are built from stable fingerprints ([`ym_core::SheetKey`], [`Throw::key`]) that are
//! injective over legal values, so a hit always means the same (sheet, throw) pair.
//! Caches grow for the lifetime of their owner and are never shared between threads.
//!
//! [`Throw::key`]: ym_core::Throw::key

use std::hash::Hash;

use rustc_hash::FxHashMap;
use serde::Serialize;
use ym_core::{Scoresheet, SheetKey, Throw};

/// Cache key for single-throw scores.
pub type ScoreKey = (SheetKey, u16);
/// Cache key for lock-score tables: (sheet, throw, two-ply flag).
pub type LockKey = (SheetKey, u16, bool);

pub fn score_key(sheet: &Scoresheet, throw: &Throw) -> ScoreKey {
    (sheet.key(), throw.key())
}

pub fn lock_key(sheet: &Scoresheet, throw: &Throw, recursive: bool) -> LockKey {
    (sheet.key(), throw.key(), recursive)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let n = self.hits + self.misses;
        if n == 0 {
            0.0
        } else {
            self.hits as f64 / n as f64
        }
    }
}

pub struct MemoCache<K, V> {
    map: FxHashMap<K, V>,
    hits: u64,
    misses: u64,
}

impl<K: Hash + Eq, V: Clone> MemoCache<K, V> {
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up `key`, counting the hit or miss.
    pub fn lookup(&mut self, key: &K) -> Option<V> {
        match self.map.get(key) {
            Some(v) => {
                self.hits += 1;
                Some(v.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.map.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.map.len(),
        }
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&mut self) {
        self.map.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

impl<K: Hash + Eq, V: Clone> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
