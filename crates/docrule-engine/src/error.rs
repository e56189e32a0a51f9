//! Error types for rule compilation.
//!
//! Only compilation can fail. Evaluation recovers locally inside every
//! builtin, so there is no evaluation error type.

use thiserror::Error;

/// Errors raised while compiling a rule string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Malformed rule text from the docrule parser.
    #[error("rule syntax error: {0}")]
    Syntax(#[from] docrule::RuleSyntaxError),

    /// Function name not present in the builtin catalogue.
    #[error("unknown function '{name}' at position {position}")]
    UnknownFunction {
        /// The name as written in the rule.
        name: String,
        /// Byte offset of the name in the rule string.
        position: usize,
    },

    /// Wrong number of arguments for a builtin.
    #[error("'{function}' takes {expected} argument(s) but {found} were given")]
    Arity {
        /// Builtin name.
        function: &'static str,
        /// Accepted argument count, e.g. `1 to 2`.
        expected: String,
        /// Number of arguments in the rule.
        found: usize,
    },

    /// A literal argument the builtin cannot use.
    #[error("invalid argument to '{function}': {message}")]
    Argument {
        /// Builtin name.
        function: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// Rule text longer than the engine accepts.
    #[error("rule is {length} bytes long, the limit is {limit}")]
    TooLong {
        /// Length of the rule text in bytes.
        length: usize,
        /// Configured maximum.
        limit: usize,
    },
}

impl CompileError {
    pub(crate) fn argument(function: &'static str, message: impl Into<String>) -> Self {
        CompileError::Argument {
            function,
            message: message.into(),
        }
    }
}

/// Result type for rule compilation.
pub type CompileResult<T> = std::result::Result<T, CompileError>;
