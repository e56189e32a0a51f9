//! Compiled rules and the free compile/validate/evaluate functions.

use std::fmt;

use docrule::Node;
use tracing::debug;

use crate::builder::build;
use crate::coalesce::finalize;
use crate::error::CompileResult;
use crate::stage::{EvalContext, Snippets, Stage};
use crate::value::Value;

/// A rule compiled into an executable pipeline.
///
/// Compiled rules are immutable and can be shared across threads.
#[derive(Clone)]
pub struct CompiledRule {
    source: String,
    syntax: Node,
    pipeline: Stage,
}

impl CompiledRule {
    /// The rule text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed syntax tree.
    pub fn syntax(&self) -> &Node {
        &self.syntax
    }

    /// Runs the pipeline without post-processing. A missing result stays `Null`.
    pub fn apply(&self, data: &Value, ctx: &EvalContext<'_>) -> Value {
        self.pipeline.apply(data, ctx)
    }

    /// Runs the pipeline and replaces a `Null` result with the empty string.
    pub fn evaluate(&self, data: &Value, snippets: Option<&Snippets>) -> Value {
        finalize(self.apply(data, &EvalContext::new(snippets)))
    }
}

impl fmt::Debug for CompiledRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRule")
            .field("source", &self.source)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

/// Compiles rule text into a [`CompiledRule`].
///
/// # Examples
///
/// ```
/// use docrule_engine::{compile, Value};
/// use serde_json::json;
///
/// let rule = compile(r#"field("Relation") | join("; ")"#).unwrap();
/// let data = Value::from(json!([{"Relation": "Father"}, {"Relation": "Mother"}]));
/// assert_eq!(rule.evaluate(&data, None), Value::from("Father; Mother"));
/// ```
pub fn compile(rule: &str) -> CompileResult<CompiledRule> {
    let syntax = docrule::parse(rule)
        .inspect_err(|err| debug!(rule, error = %err, "rule failed to parse"))?;
    let pipeline =
        build(&syntax).inspect_err(|err| debug!(rule, error = %err, "rule failed to build"))?;
    debug!(rule, stages = syntax.stages().len(), "compiled rule");
    Ok(CompiledRule {
        source: rule.to_string(),
        syntax,
        pipeline,
    })
}

/// Checks that `rule` compiles.
pub fn validate(rule: &str) -> CompileResult<()> {
    compile(rule).map(|_| ())
}

/// Evaluates a compiled rule against `data`; a `Null` result becomes `""`.
pub fn evaluate(rule: &CompiledRule, data: &Value, snippets: Option<&Snippets>) -> Value {
    rule.evaluate(data, snippets)
}
