//! WHERE-clause composition. An absent or empty filter is `Condition::True`, the
//! neutral element of `and`, so optional filters chain without special cases.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    True,
    /// `column LIKE pattern ESCAPE '\'`; the pattern is already escaped.
    Like { column: &'static str, pattern: String },
    Eq { column: &'static str, value: Value },
    Ge { column: &'static str, value: Value },
    Le { column: &'static str, value: Value },
    And(Vec<Condition>),
}

impl Condition {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Condition::Eq {
            column,
            value: value.into(),
        }
    }

    pub fn ge(column: &'static str, value: impl Into<Value>) -> Self {
        Condition::Ge {
            column,
            value: value.into(),
        }
    }

    pub fn le(column: &'static str, value: impl Into<Value>) -> Self {
        Condition::Le {
            column,
            value: value.into(),
        }
    }

    /// Substring match of `needle` against `column`, with wildcards in the needle
    /// matched literally.
    pub fn contains(column: &'static str, needle: &str) -> Self {
        Condition::Like {
            column,
            pattern: format!("%{}%", escape_for_like(needle)),
        }
    }

    /// Conjunction that drops `True` operands and flattens nested `And`s.
    pub fn and(self, other: Condition) -> Condition {
        let mut parts = Vec::new();
        for c in [self, other] {
            match c {
                Condition::True => {}
                Condition::And(inner) => parts.extend(inner),
                c => parts.push(c),
            }
        }
        match parts.len() {
            0 => Condition::True,
            1 => parts.remove(0),
            _ => Condition::And(parts),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Condition::True)
    }
}

/// `Condition::True` for an empty string, otherwise `build(text)`.
pub fn true_if_empty(text: &str, build: impl FnOnce(&str) -> Condition) -> Condition {
    if text.is_empty() {
        Condition::True
    } else {
        build(text)
    }
}

/// `Condition::True` for `None`, otherwise `build(value)`.
pub fn true_if_none<T>(value: Option<T>, build: impl FnOnce(T) -> Condition) -> Condition {
    match value {
        Some(v) => build(v),
        None => Condition::True,
    }
}

/// Escape LIKE metacharacters (`\`, `%`, `_`) with a backslash.
pub fn escape_for_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
