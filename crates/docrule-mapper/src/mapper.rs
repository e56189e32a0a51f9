//! Compiled template mappers.

use std::collections::BTreeMap;
use std::sync::Arc;

use docrule_engine::{CompiledRule, Mapping, RuleEngine, Snippets, Value};
use parking_lot::RwLock;
use tracing::{debug, instrument, trace};

use crate::config::MapperConfig;
use crate::error::{MapperError, MapperResult};
use crate::stats::MapperStats;
use crate::template::TemplateConfig;

/// Maps case records to placeholder values for one document template.
///
/// Every rule is compiled once when the mapper is built; mapping a record
/// cannot fail.
///
/// # Example
///
/// ```rust
/// use docrule_engine::{RuleEngine, Value};
/// use docrule_mapper::{TemplateConfig, TemplateMapper};
/// use serde_json::json;
///
/// let engine = RuleEngine::new();
/// let config = TemplateConfig::from_json(r#"{
///     "Patient": "field(\"Name\")",
///     "Family": "field(\"Relatives\") | field(\"Relation\") | translate(\"relation\") | join"
/// }"#).unwrap();
/// let mapper = TemplateMapper::new(&engine, &config).unwrap();
///
/// let record = Value::from(json!({
///     "Name": "Anna",
///     "Relatives": [{"Relation": "Mother"}, {"Relation": "Father"}]
/// }));
/// let text = mapper.map_text(&record, None);
/// assert_eq!(text["Patient"], "Anna");
/// assert_eq!(text["Family"], "Mutter, Vater");
/// ```
#[derive(Debug)]
pub struct TemplateMapper {
    rules: Vec<(String, Arc<CompiledRule>)>,
    config: MapperConfig,
    stats: RwLock<MapperStats>,
}

impl TemplateMapper {
    /// Compiles every rule of `template` with the default configuration.
    pub fn new(engine: &RuleEngine, template: &TemplateConfig) -> MapperResult<Self> {
        Self::with_config(engine, template, MapperConfig::default())
    }

    /// Compiles every rule of `template`.
    ///
    /// Fails with the first tag, in tag order, whose rule does not compile.
    #[instrument(level = "debug", skip_all, fields(tags = template.len()))]
    pub fn with_config(
        engine: &RuleEngine,
        template: &TemplateConfig,
        config: MapperConfig,
    ) -> MapperResult<Self> {
        let rules = template
            .iter()
            .map(|(tag, rule)| {
                engine
                    .compile(rule)
                    .map(|compiled| (tag.to_string(), compiled))
                    .map_err(|source| MapperError::Rule {
                        tag: tag.to_string(),
                        source,
                    })
            })
            .collect::<MapperResult<Vec<_>>>()?;

        debug!(rules = rules.len(), parallel = config.parallel, "compiled template");
        Ok(Self {
            rules,
            config,
            stats: RwLock::new(MapperStats::default()),
        })
    }

    /// Parses a JSON template configuration and compiles it.
    pub fn from_json(engine: &RuleEngine, config: &str) -> MapperResult<Self> {
        Self::new(engine, &TemplateConfig::from_json(config)?)
    }

    /// Placeholder tags with a rule, in tag order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(tag, _)| tag.as_str())
    }

    /// Number of placeholders this mapper fills.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if the template has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the mapper configuration.
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Evaluates every rule against `data`.
    pub fn map(&self, data: &Value, snippets: Option<&Snippets>) -> Mapping {
        let mut empty = 0;
        let mapped: Mapping = self
            .rules
            .iter()
            .map(|(tag, rule)| {
                let value = rule.evaluate(data, snippets);
                if value.render().is_empty() {
                    trace!(tag = %tag, "placeholder is empty");
                    empty += 1;
                }
                (tag.clone(), value)
            })
            .collect();

        self.stats.write().record(mapped.len(), empty);
        mapped
    }

    /// Evaluates every rule and renders the values as placeholder text.
    pub fn map_text(&self, data: &Value, snippets: Option<&Snippets>) -> BTreeMap<String, String> {
        self.map(data, snippets)
            .into_iter()
            .map(|(tag, value)| (tag, value.render()))
            .collect()
    }

    /// Maps a batch of records, in order.
    ///
    /// With the `parallel` feature and [`MapperConfig::parallel`] set, large
    /// batches are spread over the rayon thread pool.
    pub fn map_batch(&self, records: &[Value], snippets: Option<&Snippets>) -> Vec<Mapping> {
        let mapped = if self.config.parallel_for(records.len()) {
            debug!(records = records.len(), "mapping batch in parallel");
            self.map_parallel(records, snippets)
        } else {
            records
                .iter()
                .map(|record| self.map(record, snippets))
                .collect()
        };
        self.stats.write().batches += 1;
        mapped
    }

    #[cfg(feature = "parallel")]
    fn map_parallel(&self, records: &[Value], snippets: Option<&Snippets>) -> Vec<Mapping> {
        use rayon::prelude::*;

        records
            .par_iter()
            .map(|record| self.map(record, snippets))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn map_parallel(&self, records: &[Value], snippets: Option<&Snippets>) -> Vec<Mapping> {
        records
            .iter()
            .map(|record| self.map(record, snippets))
            .collect()
    }

    /// Returns mapping statistics.
    pub fn stats(&self) -> MapperStats {
        self.stats.read().clone()
    }

    /// Resets statistics.
    pub fn reset_stats(&self) {
        *self.stats.write() = MapperStats::default();
    }
}
