//! # docrule-engine
//!
//! Compiler and evaluator for docrule placeholder rules.
//!
//! A rule is parsed by [`docrule`], resolved against the builtin catalogue,
//! and compiled into a pipeline of stages. Evaluating a compiled rule against
//! a case record never fails: missing data becomes `Null`, builtins replace it
//! with their defaults, and a `Null` final result becomes the empty string.
//!
//! ## Quick Start
//!
//! ```rust
//! use docrule_engine::{compile, Value};
//! use serde_json::json;
//!
//! let data = Value::from(json!([
//!     {"Relation": "Father"},
//!     {"Relation": "Mother"},
//!     {"Relation": "Pet"},
//! ]));
//!
//! let rule = compile(r#"filter(not(is("Relation", "Pet"))) | field("Relation") | join("; ")"#)?;
//! assert_eq!(rule.evaluate(&data, None), Value::from("Father; Mother"));
//! # Ok::<(), docrule_engine::CompileError>(())
//! ```
//!
//! ## With a Compile Cache
//!
//! ```rust
//! use docrule_engine::{CacheConfig, EngineConfig, RuleEngine, Value};
//! use std::time::Duration;
//!
//! let engine = RuleEngine::with_config(
//!     EngineConfig::builder()
//!         .with_cache(CacheConfig::default().with_max_entries(512).with_ttl(Duration::from_secs(3600)))
//!         .build(),
//! );
//! assert!(engine.validate(r#"field("Birthdate") | formatDate"#).is_ok());
//! ```
//!
//! ## Broadcasting
//!
//! Most builtins map over a list input one level deep: `field("Relation")` on
//! a list of relatives yields the list of their relations. Collection
//! builtins see the whole list:
//!
//! | Broadcasting | Whole value |
//! |--------------|-------------|
//! | `field` `format` `formatDate` `concat` `translate` `translateGender` | `first` `filter` `sort` `join` |
//! | `is` `eq` `not` `and` `or` `if` `default` | `any` `all` `set` `len` `snippet` |
//!
//! ## Architecture
//!
//! ```text
//! rule text ──> docrule::parse ──> Node ──> builder ──> Stage ──> CompiledRule
//!                                             │
//!                                   registry (Builtin catalogue)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod builder;
mod cache;
mod coalesce;
mod config;
mod engine;
mod error;
mod registry;
mod rule;
mod stage;
mod tables;
mod template;
mod value;

// Public re-exports
pub use builder::build;
pub use cache::{normalize_cache_key, CacheStats, RuleCache};
pub use config::{CacheConfig, EngineConfig, EngineConfigBuilder};
pub use engine::RuleEngine;
pub use error::{CompileError, CompileResult};
pub use registry::{Arity, Builtin, DEFAULT_DATE_INPUT, DEFAULT_DATE_OUTPUT, DEFAULT_SEPARATOR};
pub use rule::{compile, evaluate, validate, CompiledRule};
pub use stage::{EvalContext, Snippets, Stage};
pub use tables::Vocabulary;
pub use value::{Mapping, Number, Value};

// Re-export the syntax types for convenience
pub use docrule::{Node, RuleSyntaxError};
