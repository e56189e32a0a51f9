//! Null handling and list coercion shared by every builtin.
//!
//! Builtins never fail at evaluation time. Missing data flows through as
//! [`Value::Null`] and is replaced by a default at the points defined here.

use std::borrow::Cow;

use crate::value::Value;

/// Returns `value`, or the result of `fallback` when `value` is `Null`.
pub(crate) fn coalesce(value: Value, fallback: impl FnOnce() -> Value) -> Value {
    match value {
        Value::Null => fallback(),
        value => value,
    }
}

/// True for `Null` and the empty string.
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Views a value as a list.
///
/// `Null` is the empty list; any other non-list is a one-element list.
pub(crate) fn items(value: &Value) -> Cow<'_, [Value]> {
    match value {
        Value::List(items) => Cow::Borrowed(items.as_slice()),
        Value::Null => Cow::Borrowed(&[]),
        other => Cow::Owned(vec![other.clone()]),
    }
}

/// Text used when a value is spliced into a string by `concat`, `format`,
/// `join` or a snippet. Mappings contribute nothing.
pub(crate) fn text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null | Value::Mapping(_) => Cow::Borrowed(""),
        other => Cow::Owned(other.render()),
    }
}

/// Looks up `key` on a mapping. Anything else yields `Null`.
pub(crate) fn lookup(value: &Value, key: &str) -> Value {
    value.get(key).cloned().unwrap_or(Value::Null)
}

/// Replaces a top-level `Null` result with the empty string.
pub(crate) fn finalize(value: Value) -> Value {
    coalesce(value, || Value::String(String::new()))
}
