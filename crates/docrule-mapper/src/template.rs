//! Template configurations: placeholder tag to rule text.

use std::collections::BTreeMap;

use docrule_engine::validate;
use tracing::{debug, instrument, warn};

use crate::error::{MapperError, MapperResult};

/// Rules for the placeholders of one document template.
///
/// Tags without a rule (empty string or `null`) are left out; the document
/// keeps whatever the template has at those placeholders.
///
/// # Example
///
/// ```rust
/// use docrule_mapper::TemplateConfig;
///
/// let config = TemplateConfig::from_json(
///     r#"{"PatientName": "field(\"Name\")", "Notes": ""}"#,
/// ).unwrap();
/// assert_eq!(config.len(), 1);
/// assert_eq!(config.rule("PatientName"), Some(r#"field("Name")"#));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TemplateConfig {
    rules: BTreeMap<String, String>,
}

impl TemplateConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object of tag to rule text.
    pub fn from_json(config: &str) -> MapperResult<Self> {
        let mut rules = BTreeMap::new();
        for (tag, rule) in entries(config)? {
            match rule {
                serde_json::Value::Null => {}
                serde_json::Value::String(rule) if rule.trim().is_empty() => {}
                serde_json::Value::String(rule) => {
                    rules.insert(tag, rule);
                }
                _ => return Err(MapperError::NonStringRule { tag }),
            }
        }
        Ok(Self { rules })
    }

    /// Adds or replaces the rule for `tag`. Blank rules remove the tag.
    pub fn with_rule(mut self, tag: impl Into<String>, rule: impl Into<String>) -> Self {
        let (tag, rule) = (tag.into(), rule.into());
        if rule.trim().is_empty() {
            self.rules.remove(&tag);
        } else {
            self.rules.insert(tag, rule);
        }
        self
    }

    /// Returns the rule for `tag`.
    pub fn rule(&self, tag: &str) -> Option<&str> {
        self.rules.get(tag).map(String::as_str)
    }

    /// Iterates over `(tag, rule)` pairs in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules.iter().map(|(tag, rule)| (tag.as_str(), rule.as_str()))
    }

    /// Number of tags with a rule.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if no tag has a rule.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Lists the tags whose rules do not compile.
///
/// Tags without a rule are ignored and a non-string rule counts as failing.
/// Only malformed JSON, or JSON that is not an object, is an error.
///
/// # Example
///
/// ```rust
/// use docrule_mapper::check_config;
///
/// let failed = check_config(r#"{"a": "field(\"Name\")", "b": "fild(\"x\")", "c": ""}"#).unwrap();
/// assert_eq!(failed, vec!["b".to_string()]);
/// ```
#[instrument(level = "debug", skip(config))]
pub fn check_config(config: &str) -> MapperResult<Vec<String>> {
    let mut failed = Vec::new();
    for (tag, rule) in entries(config)? {
        let result = match &rule {
            serde_json::Value::Null => continue,
            serde_json::Value::String(rule) if rule.trim().is_empty() => continue,
            serde_json::Value::String(rule) => validate(rule).map_err(|err| err.to_string()),
            other => Err(format!("expected a rule string, found {}", json_type(other))),
        };
        if let Err(reason) = result {
            warn!(tag = %tag, %reason, "template rule does not compile");
            failed.push(tag);
        }
    }
    debug!(failed = failed.len(), "checked template configuration");
    Ok(failed)
}

fn entries(config: &str) -> MapperResult<serde_json::Map<String, serde_json::Value>> {
    match serde_json::from_str(config)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(MapperError::NotAnObject {
            found: json_type(&other),
        }),
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
