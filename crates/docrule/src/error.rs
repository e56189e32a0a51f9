//! Error types for rule parsing.

use thiserror::Error;

/// Errors that can occur while tokenizing or parsing a rule string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleSyntaxError {
    /// Malformed input at a specific byte position in the rule string.
    #[error("syntax error at position {position}: {message}")]
    Syntax {
        /// Byte offset in the input where the error occurred.
        position: usize,
        /// Description of the error.
        message: String,
    },

    /// Input ended while a construct was still open.
    #[error("rule is incomplete: {0}")]
    Incomplete(String),

    /// Empty or whitespace-only rule string.
    #[error("empty rule")]
    Empty,
}

impl RuleSyntaxError {
    pub(crate) fn at(position: usize, message: impl Into<String>) -> Self {
        RuleSyntaxError::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Returns the byte position of the error, if it has one.
    pub fn position(&self) -> Option<usize> {
        match self {
            RuleSyntaxError::Syntax { position, .. } => Some(*position),
            _ => None,
        }
    }
}

/// Result type for rule parsing.
pub type RuleResult<T> = std::result::Result<T, RuleSyntaxError>;
