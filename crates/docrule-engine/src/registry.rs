//! The builtin function catalogue.
//!
//! Every builtin is a factory: it validates its arguments at compile time and
//! returns a [`Stage`]. The returned stages never fail; missing data becomes
//! `Null` and is defaulted as described on each builtin.

use std::cmp::Ordering;
use std::fmt::{self, Write as _};

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use tracing::trace;

use crate::coalesce::{coalesce, is_blank, items, lookup, text};
use crate::error::{CompileError, CompileResult};
use crate::stage::{eval_optional, Argument, EvalContext, Stage};
use crate::tables::{relation_rank, translate, Vocabulary};
use crate::template::Template;
use crate::value::Value;

/// Default input pattern of `formatDate`.
pub const DEFAULT_DATE_INPUT: &str = "%Y-%m-%d";
/// Default output pattern of `formatDate`.
pub const DEFAULT_DATE_OUTPUT: &str = "%d.%m.%Y";
/// Default separator of `join`.
pub const DEFAULT_SEPARATOR: &str = ", ";

const UNKNOWN_GENDER: &str = "Unbekannt";

// =============================================================================
// Arity
// =============================================================================

/// Accepted argument count of a builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    /// Fewest arguments.
    pub min: usize,
    /// Most arguments, `None` if unbounded.
    pub max: Option<usize>,
}

impl Arity {
    const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    const fn range(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// True if `count` arguments are accepted.
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", max),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

// =============================================================================
// Catalogue
// =============================================================================

/// A builtin function of the rule language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `field(name, default?)`
    Field,
    /// `first(default?)`
    First,
    /// `concat(...)`
    Concat,
    /// `format(template, ...)`
    Format,
    /// `formatDate(input?, output?)`
    FormatDate,
    /// `translate(kind?)`
    Translate,
    /// `translateGender`
    TranslateGender,
    /// `is(name, value)`
    Is,
    /// `eq(value)`
    Eq,
    /// `not(expr)`
    Not,
    /// `and(...)`
    And,
    /// `or(...)`
    Or,
    /// `any(predicate)`
    Any,
    /// `all(predicate)`
    All,
    /// `filter(predicate)`
    Filter,
    /// `sort(direction?, key?, kind?)`
    Sort,
    /// `join(separator?)`
    Join,
    /// `if(test, then, else?)`
    If,
    /// `snippet(name)`
    Snippet,
    /// `set`
    Set,
    /// `len`
    Len,
    /// `default(value)`
    Default,
}

impl Builtin {
    /// Every builtin, in catalogue order.
    pub const ALL: [Builtin; 22] = [
        Builtin::Field,
        Builtin::First,
        Builtin::Concat,
        Builtin::Format,
        Builtin::FormatDate,
        Builtin::Translate,
        Builtin::TranslateGender,
        Builtin::Is,
        Builtin::Eq,
        Builtin::Not,
        Builtin::And,
        Builtin::Or,
        Builtin::Any,
        Builtin::All,
        Builtin::Filter,
        Builtin::Sort,
        Builtin::Join,
        Builtin::If,
        Builtin::Snippet,
        Builtin::Set,
        Builtin::Len,
        Builtin::Default,
    ];

    /// Resolves a function name as written in a rule. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// Name as written in a rule.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Field => "field",
            Builtin::First => "first",
            Builtin::Concat => "concat",
            Builtin::Format => "format",
            Builtin::FormatDate => "formatDate",
            Builtin::Translate => "translate",
            Builtin::TranslateGender => "translateGender",
            Builtin::Is => "is",
            Builtin::Eq => "eq",
            Builtin::Not => "not",
            Builtin::And => "and",
            Builtin::Or => "or",
            Builtin::Any => "any",
            Builtin::All => "all",
            Builtin::Filter => "filter",
            Builtin::Sort => "sort",
            Builtin::Join => "join",
            Builtin::If => "if",
            Builtin::Snippet => "snippet",
            Builtin::Set => "set",
            Builtin::Len => "len",
            Builtin::Default => "default",
        }
    }

    /// True if the builtin is applied per element of a list input.
    ///
    /// Collection builtins (`first`, `filter`, `sort`, `join`, `any`, `all`,
    /// `set`, `len`) and `snippet` see the whole value.
    pub fn broadcasts(self) -> bool {
        !matches!(
            self,
            Builtin::First
                | Builtin::Filter
                | Builtin::Sort
                | Builtin::Join
                | Builtin::Any
                | Builtin::All
                | Builtin::Set
                | Builtin::Len
                | Builtin::Snippet
        )
    }

    /// Accepted argument count.
    pub fn arity(self) -> Arity {
        match self {
            Builtin::Field => Arity::range(1, 2),
            Builtin::First => Arity::range(0, 1),
            Builtin::Concat | Builtin::And | Builtin::Or => Arity::at_least(0),
            Builtin::Format => Arity::at_least(1),
            Builtin::FormatDate => Arity::range(0, 2),
            Builtin::Translate | Builtin::Join => Arity::range(0, 1),
            Builtin::TranslateGender | Builtin::Set | Builtin::Len => Arity::exactly(0),
            Builtin::Is => Arity::exactly(2),
            Builtin::Eq
            | Builtin::Not
            | Builtin::Any
            | Builtin::All
            | Builtin::Filter
            | Builtin::Snippet
            | Builtin::Default => Arity::exactly(1),
            Builtin::Sort => Arity::range(0, 3),
            Builtin::If => Arity::range(2, 3),
        }
    }

    /// One-line usage, e.g. for help text in a template editor.
    pub fn signature(self) -> &'static str {
        match self {
            Builtin::Field => "field(name, default?): value of a record field",
            Builtin::First => "first(default?): first element of a list",
            Builtin::Concat => "concat(...): arguments joined as text",
            Builtin::Format => "format(template, ...): fill {} placeholders",
            Builtin::FormatDate => "formatDate(input?, output?): reformat a date",
            Builtin::Translate => "translate(kind?): English term to German",
            Builtin::TranslateGender => "translateGender: Male/Female to German",
            Builtin::Is => "is(name, value): field equals value",
            Builtin::Eq => "eq(value): input equals value",
            Builtin::Not => "not(expr): negation",
            Builtin::And => "and(...): all arguments truthy",
            Builtin::Or => "or(...): any argument truthy",
            Builtin::Any => "any(predicate): some element matches",
            Builtin::All => "all(predicate): every element matches",
            Builtin::Filter => "filter(predicate): matching elements",
            Builtin::Sort => "sort(direction?, key?, kind?): sorted list",
            Builtin::Join => "join(separator?): elements joined as text",
            Builtin::If => "if(test, then, else?): conditional",
            Builtin::Snippet => "snippet(name): render a named text snippet",
            Builtin::Set => "set: distinct elements in order",
            Builtin::Len => "len: number of elements",
            Builtin::Default => "default(value): replace null or empty input",
        }
    }

    /// Validates `args` and builds the stage.
    pub(crate) fn build(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let arity = self.arity();
        if !arity.accepts(args.len()) {
            return Err(CompileError::Arity {
                function: self.name(),
                expected: arity.to_string(),
                found: args.len(),
            });
        }

        match self {
            Builtin::Field => self.field(args),
            Builtin::First => self.first(args),
            Builtin::Concat => self.concat(args),
            Builtin::Format => self.format(args),
            Builtin::FormatDate => self.format_date(args),
            Builtin::Translate => self.translate(args),
            Builtin::TranslateGender => self.translate_gender(),
            Builtin::Is => self.is(args),
            Builtin::Eq => self.eq(args),
            Builtin::Not => self.not(args),
            Builtin::And => self.and(args),
            Builtin::Or => self.or(args),
            Builtin::Any => self.any(args),
            Builtin::All => self.all(args),
            Builtin::Filter => self.filter(args),
            Builtin::Sort => self.sort(args),
            Builtin::Join => self.join(args),
            Builtin::If => self.conditional(args),
            Builtin::Snippet => self.snippet(args),
            Builtin::Set => self.set(),
            Builtin::Len => self.len(),
            Builtin::Default => self.default_value(args),
        }
    }

    fn stage(
        self,
        func: impl Fn(&Value, &EvalContext<'_>) -> Value + Send + Sync + 'static,
    ) -> Stage {
        Stage::new(self.name(), self.broadcasts(), func)
    }

    // =========================================================================
    // Argument helpers
    // =========================================================================

    /// A string literal argument. Integer literals are accepted as their text.
    fn literal_text(self, arg: Option<Argument>, what: &str) -> CompileResult<Option<String>> {
        match arg {
            None => Ok(None),
            Some(Argument::Literal(Value::String(s))) => Ok(Some(s)),
            Some(Argument::Literal(Value::Number(n))) => Ok(Some(n.to_string())),
            Some(_) => Err(CompileError::argument(
                self.name(),
                format!("{} must be a string literal", what),
            )),
        }
    }

    fn required_text(self, arg: Option<Argument>, what: &str) -> CompileResult<String> {
        self.literal_text(arg, what)?
            .ok_or_else(|| CompileError::argument(self.name(), format!("missing {}", what)))
    }

    fn predicate(self, arg: Option<Argument>) -> CompileResult<Stage> {
        match arg {
            Some(Argument::Stage(stage)) => Ok(stage),
            _ => Err(CompileError::argument(
                self.name(),
                "predicate must be a function call",
            )),
        }
    }

    // =========================================================================
    // Record access
    // =========================================================================

    fn field(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let mut args = args.into_iter();
        let name = self.required_text(args.next(), "field name")?;
        let default = args.next();
        Ok(self.stage(move |input, ctx| {
            coalesce(lookup(input, &name), || eval_optional(&default, input, ctx))
        }))
    }

    fn first(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let default = args.into_iter().next();
        Ok(self.stage(move |input, ctx| {
            let head = items(input).first().cloned().unwrap_or(Value::Null);
            coalesce(head, || eval_optional(&default, input, ctx))
        }))
    }

    fn default_value(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let fallback = args.into_iter().next();
        Ok(self.stage(move |input, ctx| {
            if is_blank(input) {
                eval_optional(&fallback, input, ctx)
            } else {
                input.clone()
            }
        }))
    }

    // =========================================================================
    // Text
    // =========================================================================

    fn concat(self, args: Vec<Argument>) -> CompileResult<Stage> {
        Ok(self.stage(move |input, ctx| {
            let mut out = String::new();
            for arg in &args {
                out.push_str(&text(&arg.eval(input, ctx)));
            }
            Value::String(out)
        }))
    }

    fn format(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let mut args = args.into_iter();
        let source = self.required_text(args.next(), "template")?;
        let template =
            Template::parse(&source).map_err(|message| CompileError::argument(self.name(), message))?;
        let values: Vec<Argument> = args.collect();
        let needed = template.positional_count();
        if needed > values.len() {
            return Err(CompileError::argument(
                self.name(),
                format!(
                    "template uses {} positional argument(s) but {} were given",
                    needed,
                    values.len()
                ),
            ));
        }

        Ok(self.stage(move |input, ctx| {
            let positional: Vec<Value> = values.iter().map(|arg| arg.eval(input, ctx)).collect();
            Value::String(template.render(&positional, input))
        }))
    }

    fn format_date(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let mut args = args.into_iter();
        let input_format = self
            .literal_text(args.next(), "input format")?
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_DATE_INPUT.to_string());
        let output_format = self
            .literal_text(args.next(), "output format")?
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_DATE_OUTPUT.to_string());
        for pattern in [&input_format, &output_format] {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(CompileError::argument(
                    self.name(),
                    format!("invalid date pattern '{}'", pattern),
                ));
            }
        }

        Ok(self.stage(move |input, _| {
            let date = match input {
                Value::Date(date) => *date,
                Value::String(s) => match NaiveDate::parse_from_str(s.trim(), &input_format) {
                    Ok(date) => date,
                    Err(err) => {
                        trace!(input = %s, pattern = %input_format, error = %err, "date did not parse");
                        return Value::Null;
                    }
                },
                _ => return Value::Null,
            };
            let mut out = String::new();
            match write!(out, "{}", date.format(&output_format)) {
                Ok(()) => Value::String(out),
                Err(_) => Value::Null,
            }
        }))
    }

    fn translate(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let vocabulary = match self.literal_text(args.into_iter().next(), "vocabulary")? {
            None => None,
            Some(kind) if kind.is_empty() => None,
            Some(kind) => Some(Vocabulary::from_name(&kind).ok_or_else(|| {
                CompileError::argument(
                    self.name(),
                    format!(
                        "unknown vocabulary '{}', expected one of gender, relation, zygosity, acmg",
                        kind
                    ),
                )
            })?),
        };
        Ok(self.stage(move |input, _| match translate(vocabulary, input) {
            Some(translated) => Value::from(translated),
            None => input.clone(),
        }))
    }

    fn translate_gender(self) -> CompileResult<Stage> {
        Ok(self.stage(|input, _| {
            let translated = input
                .as_str()
                .and_then(|term| Vocabulary::Gender.lookup(term.trim()));
            Value::from(translated.unwrap_or(UNKNOWN_GENDER))
        }))
    }

    fn join(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let separator = self
            .literal_text(args.into_iter().next(), "separator")?
            .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string());
        Ok(self.stage(move |input, _| {
            let parts: Vec<_> = items(input)
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| text(item).into_owned())
                .collect();
            Value::String(parts.join(&separator))
        }))
    }

    fn snippet(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let name = self.required_text(args.into_iter().next(), "snippet name")?;
        Ok(self.stage(move |input, ctx| {
            let Some(source) = ctx.snippet(&name) else {
                trace!(snippet = %name, "snippet not available");
                return Value::Null;
            };
            match Template::parse(source) {
                Ok(template) => Value::String(template.render(std::slice::from_ref(input), input)),
                Err(message) => {
                    trace!(snippet = %name, %message, "snippet template is malformed");
                    Value::Null
                }
            }
        }))
    }

    // =========================================================================
    // Logic
    // =========================================================================

    fn is(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let mut args = args.into_iter();
        let name = self.required_text(args.next(), "field name")?;
        let expected = args
            .next()
            .ok_or_else(|| CompileError::argument(self.name(), "missing comparison value"))?;
        Ok(self.stage(move |input, ctx| {
            let matched = input
                .get(&name)
                .is_some_and(|actual| *actual == expected.eval(input, ctx));
            Value::Bool(matched)
        }))
    }

    fn eq(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let expected = args
            .into_iter()
            .next()
            .ok_or_else(|| CompileError::argument(self.name(), "missing comparison value"))?;
        Ok(self.stage(move |input, ctx| Value::Bool(*input == expected.eval(input, ctx))))
    }

    fn not(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let predicate = self.predicate(args.into_iter().next())?;
        Ok(self.stage(move |input, ctx| Value::Bool(!predicate.apply(input, ctx).is_truthy())))
    }

    fn and(self, args: Vec<Argument>) -> CompileResult<Stage> {
        Ok(self.stage(move |input, ctx| {
            Value::Bool(args.iter().all(|arg| arg.eval(input, ctx).is_truthy()))
        }))
    }

    fn or(self, args: Vec<Argument>) -> CompileResult<Stage> {
        Ok(self.stage(move |input, ctx| {
            Value::Bool(args.iter().any(|arg| arg.eval(input, ctx).is_truthy()))
        }))
    }

    fn conditional(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let mut args = args.into_iter();
        let (Some(test), Some(then)) = (args.next(), args.next()) else {
            return Err(CompileError::argument(self.name(), "missing test or branch"));
        };
        let otherwise = args.next();
        Ok(self.stage(move |input, ctx| {
            if test.eval(input, ctx).is_truthy() {
                then.eval(input, ctx)
            } else {
                eval_optional(&otherwise, input, ctx)
            }
        }))
    }

    // =========================================================================
    // Collections
    // =========================================================================

    fn any(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let predicate = self.predicate(args.into_iter().next())?;
        Ok(self.stage(move |input, ctx| {
            Value::Bool(
                items(input)
                    .iter()
                    .any(|item| predicate.apply(item, ctx).is_truthy()),
            )
        }))
    }

    fn all(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let predicate = self.predicate(args.into_iter().next())?;
        Ok(self.stage(move |input, ctx| {
            Value::Bool(
                items(input)
                    .iter()
                    .all(|item| predicate.apply(item, ctx).is_truthy()),
            )
        }))
    }

    fn filter(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let predicate = self.predicate(args.into_iter().next())?;
        Ok(self.stage(move |input, ctx| {
            Value::List(
                items(input)
                    .iter()
                    .filter(|item| predicate.apply(item, ctx).is_truthy())
                    .cloned()
                    .collect(),
            )
        }))
    }

    fn sort(self, args: Vec<Argument>) -> CompileResult<Stage> {
        let mut args = args.into_iter();
        let descending = match self.literal_text(args.next(), "direction")?.as_deref() {
            None | Some("") => false,
            Some(d) if d.eq_ignore_ascii_case("asc") => false,
            Some(d) if d.eq_ignore_ascii_case("desc") => true,
            Some(other) => {
                return Err(CompileError::argument(
                    self.name(),
                    format!("direction must be \"asc\" or \"desc\", not '{}'", other),
                ))
            }
        };
        let key = match args.next() {
            None => SortKey::Element,
            Some(Argument::Literal(Value::String(name))) if name.is_empty() => SortKey::Element,
            Some(Argument::Literal(Value::String(name))) => SortKey::Field(name),
            Some(Argument::Stage(stage)) => SortKey::Stage(stage),
            Some(Argument::Literal(_)) => {
                return Err(CompileError::argument(
                    self.name(),
                    "key must be a field name or a function call",
                ))
            }
        };
        let order = match self.literal_text(args.next(), "sort kind")?.as_deref() {
            None | Some("") => SortOrder::Natural,
            Some(kind) if kind.eq_ignore_ascii_case("relation") => SortOrder::Relation,
            Some(other) => {
                return Err(CompileError::argument(
                    self.name(),
                    format!("unknown sort kind '{}', expected \"relation\"", other),
                ))
            }
        };

        Ok(self.stage(move |input, ctx| {
            let mut keyed: Vec<(Value, Value)> = items(input)
                .iter()
                .map(|item| (key.extract(item, ctx), item.clone()))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| order.compare(a, b, descending));
            Value::List(keyed.into_iter().map(|(_, item)| item).collect())
        }))
    }

    fn set(self) -> CompileResult<Stage> {
        Ok(self.stage(|input, _| {
            let mut distinct: Vec<Value> = Vec::new();
            for item in items(input).iter() {
                if !distinct.contains(item) {
                    distinct.push(item.clone());
                }
            }
            Value::List(distinct)
        }))
    }

    fn len(self) -> CompileResult<Stage> {
        Ok(self.stage(|input, _| {
            let count = i64::try_from(items(input).len()).unwrap_or(i64::MAX);
            Value::from(count)
        }))
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Sorting
// =============================================================================

enum SortKey {
    Element,
    Field(String),
    Stage(Stage),
}

impl SortKey {
    fn extract(&self, item: &Value, ctx: &EvalContext<'_>) -> Value {
        match self {
            SortKey::Element => item.clone(),
            SortKey::Field(name) => lookup(item, name),
            SortKey::Stage(stage) => stage.apply(item, ctx),
        }
    }
}

#[derive(Clone, Copy)]
enum SortOrder {
    Natural,
    Relation,
}

impl SortOrder {
    /// Null keys sort last in both directions.
    fn compare(self, a: &Value, b: &Value, descending: bool) -> Ordering {
        match (a.is_null(), b.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        let ordering = match self {
            SortOrder::Natural => a.compare(b),
            SortOrder::Relation => relation_rank(a).cmp(&relation_rank(b)),
        };
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
