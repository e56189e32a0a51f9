//! Configuration types for the rule engine.

use std::time::Duration;

/// Configuration for a [`RuleEngine`](crate::RuleEngine).
///
/// # Example
///
/// ```rust
/// use docrule_engine::{CacheConfig, EngineConfig};
/// use std::time::Duration;
///
/// let config = EngineConfig::builder()
///     .with_cache(CacheConfig::default().with_ttl(Duration::from_secs(600)))
///     .with_max_rule_length(4096)
///     .build();
/// assert!(config.cache.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Compile cache configuration (None = every call compiles).
    pub cache: Option<CacheConfig>,
    /// Longest accepted rule text in bytes (None = unlimited).
    pub max_rule_length: Option<usize>,
}

impl EngineConfig {
    /// Creates a new builder for EngineConfig.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Builder for EngineConfig.
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    cache: Option<CacheConfig>,
    max_rule_length: Option<usize>,
}

impl EngineConfigBuilder {
    /// Enables the compile cache with the given configuration.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Rejects rules longer than `max_rule_length` bytes.
    pub fn with_max_rule_length(mut self, max_rule_length: usize) -> Self {
        self.max_rule_length = Some(max_rule_length);
        self
    }

    /// Builds the EngineConfig.
    pub fn build(self) -> EngineConfig {
        EngineConfig {
            cache: self.cache,
            max_rule_length: self.max_rule_length,
        }
    }
}

/// Configuration for the compile cache.
///
/// Compiled rules depend only on their text, so entries never go stale; the
/// optional TTL only bounds how long an unused rule keeps its memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of compiled rules kept.
    pub max_entries: usize,
    /// Time-to-live for cached rules (None = until evicted).
    pub ttl: Option<Duration>,
}

impl CacheConfig {
    /// Sets the maximum number of entries.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Sets the time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_024,
            ttl: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert!(config.cache.is_none());
        assert!(config.max_rule_length.is_none());
    }

    #[test]
    fn test_engine_config_builder() {
        let config = EngineConfig::builder()
            .with_cache(CacheConfig::default())
            .with_max_rule_length(512)
            .build();

        assert_eq!(config.cache, Some(CacheConfig::default()));
        assert_eq!(config.max_rule_length, Some(512));
    }

    #[test]
    fn test_cache_config_default() {
        let cache = CacheConfig::default();
        assert_eq!(cache.max_entries, 1_024);
        assert!(cache.ttl.is_none());
    }

    #[test]
    fn test_cache_config_chaining() {
        let cache = CacheConfig::default()
            .with_max_entries(8)
            .with_ttl(Duration::from_secs(60));
        assert_eq!(cache.max_entries, 8);
        assert_eq!(cache.ttl, Some(Duration::from_secs(60)));
    }
}
