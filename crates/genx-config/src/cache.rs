//! Class-notation parse cache
//!
//! Maps `prefix:class:options` to the keys that class string produced.
//! Entries never hold base-config values, so any entry can be merged onto
//! any base. Eviction is by insertion order: reads do not refresh age.

use std::collections::{HashMap, VecDeque};

use crate::ConfigMap;

/// Default number of cached class strings
pub const DEFAULT_CAPACITY: usize = 256;

/// Bounded FIFO cache of class parse results
#[derive(Debug, Clone)]
pub struct ClassParseCache {
    entries: HashMap<String, ConfigMap>,
    /// Keys oldest first
    order: VecDeque<String>,
    capacity: usize,
    stats: CacheStats,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl Default for ClassParseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ClassParseCache {
    /// A capacity of 0 disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            order: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
            stats: CacheStats::default(),
        }
    }

    /// Composite key for one class string under one option set
    pub fn key(prefix: &str, class: &str, fingerprint: &str) -> String {
        format!("{prefix}:{class}:{fingerprint}")
    }

    /// Look up an entry, counting the hit or miss
    pub fn get(&mut self, key: &str) -> Option<&ConfigMap> {
        match self.entries.get(key) {
            Some(entry) => {
                self.stats.hits += 1;
                Some(entry)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Store an entry, evicting the oldest ones beyond capacity
    pub fn insert(&mut self, key: String, value: ConfigMap) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        }
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else { break };
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            ..self.stats
        }
    }

    /// Drop every entry and reset statistics
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats = CacheStats::default();
    }
}
