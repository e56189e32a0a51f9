//! Error types for the mapper crate.

use docrule_engine::CompileError;

/// Result type for mapper operations.
pub type MapperResult<T> = Result<T, MapperError>;

/// Errors that can occur while loading or compiling a template configuration.
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    /// The configuration is not valid JSON.
    #[error("invalid template configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// The configuration is valid JSON but not an object.
    #[error("template configuration must be a JSON object of tag to rule, found {found}")]
    NotAnObject {
        /// JSON type that was found instead.
        found: &'static str,
    },

    /// A tag maps to something other than a rule string.
    #[error("rule for tag '{tag}' must be a string")]
    NonStringRule {
        /// The offending placeholder tag.
        tag: String,
    },

    /// A rule failed to compile.
    #[error("rule for tag '{tag}' does not compile: {source}")]
    Rule {
        /// Placeholder tag of the rule.
        tag: String,
        /// The compile error.
        #[source]
        source: CompileError,
    },
}

impl MapperError {
    /// Returns the placeholder tag the error refers to, if any.
    pub fn tag(&self) -> Option<&str> {
        match self {
            MapperError::NonStringRule { tag } | MapperError::Rule { tag, .. } => Some(tag),
            _ => None,
        }
    }
}
