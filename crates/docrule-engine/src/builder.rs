//! Turns a syntax tree into an executable [`Stage`].

use docrule::Node;

use crate::error::{CompileError, CompileResult};
use crate::registry::Builtin;
use crate::stage::{Argument, Stage};
use crate::value::Value;

/// Builds the stage for a parsed rule.
///
/// Function names are resolved against the [`Builtin`] catalogue, and each
/// builtin validates its own arguments.
pub fn build(node: &Node) -> CompileResult<Stage> {
    match node {
        Node::Pipeline(stages) => {
            let stages = stages.iter().map(build).collect::<CompileResult<Vec<_>>>()?;
            Ok(Stage::pipeline(stages))
        }
        Node::FunctionCall {
            name,
            args,
            position,
        } => {
            let builtin = Builtin::from_name(name).ok_or_else(|| CompileError::UnknownFunction {
                name: name.clone(),
                position: *position,
            })?;
            let args = args
                .iter()
                .map(argument)
                .collect::<CompileResult<Vec<_>>>()?;
            builtin.build(args)
        }
        Node::StringLiteral(_) | Node::NumberLiteral(_) => Ok(Stage::constant(literal(node))),
    }
}

fn argument(node: &Node) -> CompileResult<Argument> {
    if node.is_literal() {
        Ok(Argument::Literal(literal(node)))
    } else {
        build(node).map(Argument::Stage)
    }
}

fn literal(node: &Node) -> Value {
    match node {
        Node::StringLiteral(s) => Value::String(s.clone()),
        Node::NumberLiteral(n) => Value::from(*n),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::EvalContext;
    use serde_json::json;

    fn built(rule: &str) -> CompileResult<Stage> {
        build(&docrule::parse(rule).unwrap())
    }

    #[test]
    fn test_single_call() {
        let stage = built(r#"field("Name")"#).unwrap();
        assert_eq!(stage.name(), "field");
        assert!(stage.broadcasts());
    }

    #[test]
    fn test_pipeline() {
        let stage = built(r#"field("Relation") | join("; ")"#).unwrap();
        assert_eq!(stage.name(), "pipeline");
        let out = stage.apply(
            &Value::from(json!([{"Relation": "Father"}, {"Relation": "Mother"}])),
            &EvalContext::default(),
        );
        assert_eq!(out, Value::from("Father; Mother"));
    }

    #[test]
    fn test_unknown_function_reports_position() {
        let err = built(r#"concat(field("a"), fild("b"))"#).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownFunction {
                name: "fild".to_string(),
                position: 19,
            }
        );
    }

    #[test]
    fn test_nested_arity_error() {
        let err = built(r#"filter(is("Relation"))"#).unwrap_err();
        assert!(matches!(err, CompileError::Arity { function: "is", found: 1, .. }));
    }

    #[test]
    fn test_literal_node_is_constant() {
        let stage = build(&Node::StringLiteral("x".to_string())).unwrap();
        assert_eq!(stage.apply(&Value::Null, &EvalContext::default()), Value::from("x"));
    }
}
