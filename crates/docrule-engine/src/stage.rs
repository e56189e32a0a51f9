//! Compiled stages and their evaluation context.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Named text templates available to the `snippet` builtin.
pub type Snippets = HashMap<String, String>;

/// Per-evaluation context passed to every stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvalContext<'a> {
    snippets: Option<&'a Snippets>,
}

impl<'a> EvalContext<'a> {
    /// Creates a context with optional snippets.
    pub fn new(snippets: Option<&'a Snippets>) -> Self {
        Self { snippets }
    }

    /// Looks up a snippet template by name.
    pub fn snippet(&self, name: &str) -> Option<&'a str> {
        self.snippets
            .and_then(|snippets| snippets.get(name))
            .map(String::as_str)
    }
}

type StageFn = dyn Fn(&Value, &EvalContext<'_>) -> Value + Send + Sync;

/// A compiled, reusable transformation from one value to another.
///
/// Broadcasting stages apply their function to each element when the input
/// is a list, one level deep. Other stages see the whole input.
#[derive(Clone)]
pub struct Stage {
    name: &'static str,
    broadcast: bool,
    func: Arc<StageFn>,
}

impl Stage {
    pub(crate) fn new(
        name: &'static str,
        broadcast: bool,
        func: impl Fn(&Value, &EvalContext<'_>) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            broadcast,
            func: Arc::new(func),
        }
    }

    /// Composes stages left to right. A single stage is returned unchanged.
    pub(crate) fn pipeline(mut stages: Vec<Stage>) -> Self {
        if stages.len() == 1 {
            if let Some(only) = stages.pop() {
                return only;
            }
        }

        let stages: Arc<[Stage]> = stages.into();
        Stage::new("pipeline", false, move |input, ctx| {
            let mut remaining = stages.iter();
            let Some(first) = remaining.next() else {
                return input.clone();
            };
            remaining.fold(first.apply(input, ctx), |current, stage| {
                stage.apply(&current, ctx)
            })
        })
    }

    /// A stage ignoring its input.
    pub(crate) fn constant(value: Value) -> Self {
        Stage::new("literal", false, move |_, _| value.clone())
    }

    /// Builtin name, `pipeline` or `literal`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// True if the stage maps over list inputs.
    pub fn broadcasts(&self) -> bool {
        self.broadcast
    }

    /// Applies the stage to `input`.
    pub fn apply(&self, input: &Value, ctx: &EvalContext<'_>) -> Value {
        match input {
            Value::List(items) if self.broadcast => {
                Value::List(items.iter().map(|item| (self.func)(item, ctx)).collect())
            }
            _ => (self.func)(input, ctx),
        }
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("broadcast", &self.broadcast)
            .finish_non_exhaustive()
    }
}

/// A builtin argument: a literal, or a stage evaluated against the
/// builtin's own input.
#[derive(Debug, Clone)]
pub(crate) enum Argument {
    Literal(Value),
    Stage(Stage),
}

impl Argument {
    pub(crate) fn eval(&self, input: &Value, ctx: &EvalContext<'_>) -> Value {
        match self {
            Argument::Literal(value) => value.clone(),
            Argument::Stage(stage) => stage.apply(input, ctx),
        }
    }
}

/// Evaluates an optional argument, `Null` when absent.
pub(crate) fn eval_optional(arg: &Option<Argument>, input: &Value, ctx: &EvalContext<'_>) -> Value {
    arg.as_ref()
        .map_or(Value::Null, |arg| arg.eval(input, ctx))
}
