//! # docrule-mapper
//!
//! Fills the placeholders of a document template from a case record.
//!
//! A template configuration is a JSON object mapping each placeholder tag to
//! a docrule rule. The mapper compiles all rules once and then turns any
//! number of records into `tag -> value` mappings ready for the document
//! writer.
//!
//! ## Quick Start
//!
//! ```rust
//! use docrule_engine::{RuleEngine, Value};
//! use docrule_mapper::{check_config, TemplateMapper};
//! use serde_json::json;
//!
//! let config = r#"{
//!     "Patient": "format(\"{} ({})\", field(\"Name\"), field(\"Gender\") | translateGender)",
//!     "Born": "field(\"Birthdate\") | formatDate",
//!     "Notes": ""
//! }"#;
//!
//! // Validate before saving the configuration
//! assert!(check_config(config).unwrap().is_empty());
//!
//! let engine = RuleEngine::new();
//! let mapper = TemplateMapper::from_json(&engine, config).unwrap();
//! let record = Value::from(json!({"Name": "Anna", "Gender": "Female", "Birthdate": "2019-07-14"}));
//!
//! let text = mapper.map_text(&record, None);
//! assert_eq!(text["Patient"], "Anna (weiblich)");
//! assert_eq!(text["Born"], "14.07.2019");
//! assert!(!text.contains_key("Notes"));
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` - Evaluates large batches on the rayon thread pool
//! - `serde` - Serialize/deserialize `TemplateConfig` and `MapperStats`

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod config;
mod error;
mod mapper;
mod stats;
mod template;

// Public re-exports
pub use config::MapperConfig;
pub use error::{MapperError, MapperResult};
pub use mapper::TemplateMapper;
pub use stats::MapperStats;
pub use template::{check_config, TemplateConfig};
