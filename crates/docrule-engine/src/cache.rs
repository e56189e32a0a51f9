//! Compile cache for rule text.
//!
//! Provides an LRU cache with optional TTL expiration, keyed by normalized
//! rule text. Thread-safe using `Mutex` for LRU operations.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::config::CacheConfig;
use crate::rule::CompiledRule;

#[derive(Debug, Clone)]
struct CacheEntry {
    rule: Arc<CompiledRule>,
    created_at: Instant,
}

impl CacheEntry {
    fn new(rule: Arc<CompiledRule>) -> Self {
        Self {
            rule,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.created_at.elapsed() > ttl)
    }
}

/// Thread-safe LRU cache of compiled rules.
///
/// # Example
///
/// ```rust
/// use docrule_engine::{compile, CacheConfig, RuleCache};
/// use std::sync::Arc;
///
/// let cache = RuleCache::new(CacheConfig::default());
/// let rule = Arc::new(compile(r#"field("Name")"#).unwrap());
/// cache.set(r#"field("Name")"#, Arc::clone(&rule));
///
/// assert!(cache.get("  field(\"Name\")\n").is_some());
/// assert!(cache.get(r#"field( "Name" )"#).is_none());
/// ```
pub struct RuleCache {
    inner: Mutex<LruCache<String, CacheEntry>>,
    ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RuleCache {
    /// Creates a cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl: config.ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Gets a compiled rule by its text.
    ///
    /// Expired entries are removed and reported as a miss. On a hit the entry
    /// becomes most-recently-used.
    pub fn get(&self, rule: &str) -> Option<Arc<CompiledRule>> {
        let key = normalize_cache_key(rule);
        let found = self.inner.lock().ok().and_then(|mut cache| {
            match cache.get(&key) {
                Some(entry) if entry.is_expired(self.ttl) => {
                    cache.pop(&key);
                    None
                }
                Some(entry) => Some(Arc::clone(&entry.rule)),
                None => None,
            }
        });

        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Stores a compiled rule under its text.
    pub fn set(&self, rule: &str, compiled: Arc<CompiledRule>) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.put(normalize_cache_key(rule), CacheEntry::new(compiled));
        }
    }

    /// Returns the number of entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(cache) => cache.len(),
            _ => 0,
        }
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all entries and resets the hit/miss counters.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.inner.lock() {
            cache.clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Removes expired entries.
    pub fn cleanup_expired(&self) {
        if let Ok(mut cache) = self.inner.lock() {
            let expired: Vec<String> = cache
                .iter()
                .filter(|(_, entry)| entry.is_expired(self.ttl))
                .map(|(key, _)| key.clone())
                .collect();
            for key in expired {
                cache.pop(&key);
            }
        }
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (total_entries, expired_entries) = match self.inner.lock() {
            Ok(cache) => (
                cache.len(),
                cache
                    .iter()
                    .filter(|(_, entry)| entry.is_expired(self.ttl))
                    .count(),
            ),
            _ => (0, 0),
        };
        CacheStats {
            total_entries,
            expired_entries,
            valid_entries: total_entries.saturating_sub(expired_entries),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for RuleCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("RuleCache")
            .field("entries", &stats.total_entries)
            .field("ttl", &self.ttl)
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .finish()
    }
}

/// Statistics about the cache state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of entries in the cache.
    pub total_entries: usize,
    /// Number of expired entries (not yet cleaned up).
    pub expired_entries: usize,
    /// Number of valid (non-expired) entries.
    pub valid_entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to compile.
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache, 0.0 when there were none.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Normalizes rule text so that layout differences share a cache entry.
///
/// Runs of whitespace outside string literals collapse to a single space and
/// the result is trimmed. String literal contents are kept byte for byte.
///
/// # Example
///
/// ```rust
/// use docrule_engine::normalize_cache_key;
///
/// assert_eq!(normalize_cache_key("  field( \"a  b\" )\n|  first "), "field( \"a  b\" ) | first");
/// ```
pub fn normalize_cache_key(rule: &str) -> String {
    let mut result = String::with_capacity(rule.len());
    let mut prev_was_space = true;
    let mut in_string = false;
    let mut escaped = false;

    for ch in rule.chars() {
        if in_string {
            result.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            if ch == '"' {
                in_string = true;
            }
            result.push(ch);
            prev_was_space = false;
        }
    }

    if result.ends_with(' ') && !in_string {
        result.pop();
    }
    result
}
