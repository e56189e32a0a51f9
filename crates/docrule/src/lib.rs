//! # docrule
//!
//! Parser for the docrule placeholder rule language: a small, pipe-composed
//! functional notation that maps a document-template placeholder to a value
//! computed from a nested case record.
//!
//! This crate turns rule text into a syntax tree. Compiling and evaluating the
//! tree lives in `docrule-engine`.
//!
//! ## Usage
//!
//! ```rust
//! use docrule::{parse, Node};
//!
//! // A single function call
//! let rule = parse(r#"field("Name")"#).unwrap();
//!
//! // Stages chained with a pipe, arguments may be pipelines themselves
//! let rule = parse(r#"filter(is("Relation", "Pet")) | field("Name") | join("; ")"#).unwrap();
//! assert_eq!(rule.stages().len(), 3);
//! ```
//!
//! ## Syntax Quick Reference
//!
//! | Element | Example |
//! |---------|---------|
//! | Bare call | `sort` |
//! | Call with arguments | `sort("desc", "Relation")` |
//! | String literal | `"; "`, `"say \"hi\""` |
//! | Integer literal | `1`, `-1` |
//! | Pipe | `field("Relation") \| join("; ")` |
//! | Nested pipeline argument | `filter(field("Genes") \| len \| eq(2))` |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{Node, Spanned, Token};
pub use error::{RuleResult, RuleSyntaxError};
pub use lexer::tokenize;
pub use parser::{parse, MAX_NESTING};
