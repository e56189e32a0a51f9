//! Brace templates used by `format` and `snippet`.
//!
//! ```text
//! {}        next positional argument
//! {0}       positional argument by index
//! {Name}    field of the current record
//! {{ }}     literal braces
//! ```

use crate::coalesce::{lookup, text};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Next,
    Index(usize),
    Field(String),
}

/// A parsed brace template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parses template text, returning a description of the first problem.
    pub(crate) fn parse(source: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '{' if chars.peek().is_some_and(|&(_, next)| next == '{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().is_some_and(|&(_, next)| next == '}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(format!("single '}}' at offset {} in template", offset)),
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, inner) in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => {
                                return Err(format!(
                                    "nested '{{' in placeholder starting at offset {}",
                                    offset
                                ))
                            }
                            other => name.push(other),
                        }
                    }
                    if !closed {
                        return Err(format!("unclosed '{{' at offset {} in template", offset));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut literal)));
                    }
                    segments.push(placeholder(&name)?);
                }
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Text(literal));
        }
        Ok(Template { segments })
    }

    /// Number of positional arguments the template reads.
    pub(crate) fn positional_count(&self) -> usize {
        let mut next = 0;
        let mut highest = 0;
        for segment in &self.segments {
            match segment {
                Segment::Next => {
                    next += 1;
                    highest = highest.max(next);
                }
                Segment::Index(i) => highest = highest.max(i.saturating_add(1)),
                _ => {}
            }
        }
        highest
    }

    /// Renders the template. Missing arguments and fields render empty.
    pub(crate) fn render(&self, positional: &[Value], current: &Value) -> String {
        let mut out = String::new();
        let mut next = 0;
        for segment in &self.segments {
            match segment {
                Segment::Text(s) => out.push_str(s),
                Segment::Next => {
                    if let Some(value) = positional.get(next) {
                        out.push_str(&text(value));
                    }
                    next += 1;
                }
                Segment::Index(i) => {
                    if let Some(value) = positional.get(*i) {
                        out.push_str(&text(value));
                    }
                }
                Segment::Field(name) => out.push_str(&text(&lookup(current, name))),
            }
        }
        out
    }
}

fn placeholder(name: &str) -> Result<Segment, String> {
    if name.is_empty() {
        return Ok(Segment::Next);
    }
    if name.bytes().all(|b| b.is_ascii_digit()) {
        return name
            .parse()
            .map(Segment::Index)
            .map_err(|_| format!("placeholder index '{}' is too large", name));
    }
    if name.contains([':', '!']) {
        return Err(format!(
            "placeholder '{{{}}}' uses a format specification, which is not supported",
            name
        ));
    }
    Ok(Segment::Field(name.to_string()))
}
