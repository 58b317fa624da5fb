//! Match expressions for selecting files by content
//!
//! An expression is one or more clauses joined by `&&` (or `and`):
//!
//! ```text
//! status == "active" && owner.name contains Ada && archived != true
//! ```
//!
//! A clause is `path == literal`, `path != literal`, `path contains literal`
//! or a bare `path`, which holds when the value is present and truthy.
//! Literals are parsed as JSON when possible and taken as bare strings
//! otherwise. Operators and `&&` inside a quoted literal are part of the
//! literal.

use serde_json::Value;

use crate::json_path;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompareOp {
    Eq,
    Ne,
    Contains,
}

#[derive(Debug, Clone, PartialEq)]
enum Clause {
    Truthy(String),
    Compare {
        path: String,
        op: CompareOp,
        value: Value,
    },
}

/// A parsed match expression.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpr {
    clauses: Vec<Clause>,
}

impl MatchExpr {
    /// Parse an expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMatch`] for empty clauses or a comparison
    /// missing either side.
    pub fn parse(input: &str) -> Result<Self> {
        let clauses = split_unquoted(input, &["&&", " and "])
            .into_iter()
            .map(parse_clause)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { clauses })
    }

    /// Whether every clause holds for `doc`.
    pub fn matches(&self, doc: &Value) -> bool {
        self.clauses.iter().all(|clause| match clause {
            Clause::Truthy(path) => json_path::select(doc, path).is_some_and(truthy),
            Clause::Compare { path, op, value } => {
                let actual = json_path::select(doc, path);
                match op {
                    CompareOp::Eq => actual == Some(value),
                    CompareOp::Ne => actual != Some(value),
                    CompareOp::Contains => actual.is_some_and(|a| contains(a, value)),
                }
            }
        })
    }
}

fn parse_clause(raw: &str) -> Result<Clause> {
    let clause = raw.trim();
    if clause.is_empty() {
        return Err(Error::InvalidMatch("empty clause".to_string()));
    }

    let split = [
        ("!=", CompareOp::Ne),
        ("==", CompareOp::Eq),
        (" contains ", CompareOp::Contains),
    ]
    .into_iter()
    .find_map(|(token, op)| {
        find_unquoted(clause, token).map(|pos| (&clause[..pos], op, &clause[pos + token.len()..]))
    });

    let Some((path, op, literal)) = split else {
        return Ok(Clause::Truthy(clause.to_string()));
    };

    let path = path.trim();
    let literal = literal.trim();
    if path.is_empty() || literal.is_empty() {
        return Err(Error::InvalidMatch(format!(
            "incomplete comparison: \"{clause}\""
        )));
    }

    Ok(Clause::Compare {
        path: path.to_string(),
        op,
        value: parse_literal(literal),
    })
}

/// Byte offsets in `input` that sit outside single or double quotes.
///
/// A quote only opens at the start of a word, so apostrophes inside bare
/// literals are plain characters.
fn unquoted_offsets(input: &str) -> impl Iterator<Item = usize> + '_ {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev: Option<char> = None;
    input.char_indices().filter_map(move |(pos, c)| {
        let outside = quote.is_none();
        let word_start = prev.is_none_or(|p| p.is_whitespace() || p == '=');
        match quote {
            Some(_) if escaped => escaped = false,
            Some('"') if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if word_start && (c == '"' || c == '\'') => quote = Some(c),
            None => {}
        }
        prev = Some(c);
        (outside && quote.is_none()).then_some(pos)
    })
}

fn find_unquoted(input: &str, token: &str) -> Option<usize> {
    unquoted_offsets(input).find(|&pos| input[pos..].starts_with(token))
}

fn split_unquoted<'a>(input: &'a str, separators: &[&str]) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut skip_until = 0;
    for pos in unquoted_offsets(input) {
        if pos < skip_until {
            continue;
        }
        if let Some(sep) = separators.iter().find(|sep| input[pos..].starts_with(**sep)) {
            parts.push(&input[start..pos]);
            start = pos + sep.len();
            skip_until = start;
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_literal(literal: &str) -> Value {
    if let Some(inner) = literal
        .strip_prefix('\'')
        .and_then(|l| l.strip_suffix('\''))
    {
        return Value::String(inner.to_string());
    }
    serde_json::from_str(literal).unwrap_or_else(|_| Value::String(literal.to_string()))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match (haystack, needle) {
        (Value::String(s), Value::String(n)) => s.contains(n.as_str()),
        (Value::Array(items), needle) => items.contains(needle),
        (Value::Object(map), Value::String(key)) => map.contains_key(key),
        _ => false,
    }
}
