//! The rule engine: compile cache plus the public compile/evaluate API.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::RuleCache;
use crate::config::EngineConfig;
use crate::error::{CompileError, CompileResult};
use crate::rule::{compile, CompiledRule};
use crate::stage::Snippets;
use crate::value::Value;

/// Compiles and evaluates rules, reusing compiled pipelines when a cache is
/// configured.
///
/// The engine is `Send + Sync`; share it behind an `Arc` or by reference.
///
/// # Example
///
/// ```rust
/// use docrule_engine::{CacheConfig, EngineConfig, RuleEngine, Value};
/// use serde_json::json;
///
/// let engine = RuleEngine::with_config(
///     EngineConfig::builder().with_cache(CacheConfig::default()).build(),
/// );
/// let data = Value::from(json!({"Name": "Test"}));
///
/// let value = engine.evaluate(r#"field("Name")"#, &data, None).unwrap();
/// assert_eq!(value, Value::from("Test"));
///
/// // The second call reuses the compiled rule.
/// engine.evaluate(r#"field("Name")"#, &data, None).unwrap();
/// assert_eq!(engine.cache().unwrap().stats().hits, 1);
/// ```
#[derive(Debug, Default)]
pub struct RuleEngine {
    config: EngineConfig,
    cache: Option<RuleCache>,
}

impl RuleEngine {
    /// Creates an engine without a compile cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        let cache = config.cache.clone().map(RuleCache::new);
        Self { config, cache }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the compile cache, if enabled.
    pub fn cache(&self) -> Option<&RuleCache> {
        self.cache.as_ref()
    }

    /// Compiles `rule`, or returns the cached compilation of the same text.
    ///
    /// Failed compilations are not cached.
    pub fn compile(&self, rule: &str) -> CompileResult<Arc<CompiledRule>> {
        if let Some(limit) = self.config.max_rule_length {
            if rule.len() > limit {
                return Err(CompileError::TooLong {
                    length: rule.len(),
                    limit,
                });
            }
        }

        if let Some(cache) = &self.cache {
            if let Some(compiled) = cache.get(rule) {
                trace!(rule, "compile cache hit");
                return Ok(compiled);
            }
        }

        let compiled = Arc::new(compile(rule)?);
        if let Some(cache) = &self.cache {
            cache.set(rule, Arc::clone(&compiled));
            debug!(rule, entries = cache.len(), "cached compiled rule");
        }
        Ok(compiled)
    }

    /// Checks that `rule` compiles.
    pub fn validate(&self, rule: &str) -> CompileResult<()> {
        self.compile(rule).map(|_| ())
    }

    /// Compiles `rule` and evaluates it against `data`.
    ///
    /// Only compilation can fail. A `Null` result is returned as `""`.
    pub fn evaluate(
        &self,
        rule: &str,
        data: &Value,
        snippets: Option<&Snippets>,
    ) -> CompileResult<Value> {
        let compiled = self.compile(rule)?;
        Ok(compiled.evaluate(data, snippets))
    }
}
