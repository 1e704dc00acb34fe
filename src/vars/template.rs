//! Placeholder mini-language
//!
//! A template is literal text with `{{ name }}` placeholders. A name may carry
//! a leading dot (`{{ .name }}`) and may walk into nested mappings
//! (`{{ user.id }}`). Anything else between the braces is a syntax error.

use regex::Regex;
use serde_json::{Number, Value};
use std::sync::LazyLock;
use thiserror::Error;

use super::store::VariableStore;

/// `{{ expr }}`, capturing the trimmed expression
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(.*?)\s*\}\}").expect("failed to compile placeholder regex")
});

/// Optional leading dot, then dot-separated identifiers
static PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.?[\p{L}_][\p{L}\p{N}_-]*(?:\.[\p{L}_][\p{L}\p{N}_-]*)*$")
        .expect("failed to compile placeholder path regex")
});

/// Malformed placeholder syntax
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed placeholder starting at byte {offset}")]
    Unclosed { offset: usize },

    #[error("empty placeholder at byte {offset}")]
    Empty { offset: usize },

    #[error("invalid placeholder expression '{expr}'")]
    InvalidExpression { expr: String },
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Var(Vec<&'a str>),
}

fn parse(template: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        let expr = caps.get(1).map_or("", |m| m.as_str());

        push_text(&mut segments, template, last, whole.start())?;
        if expr.is_empty() {
            return Err(TemplateError::Empty {
                offset: whole.start(),
            });
        }
        if !PATH_RE.is_match(expr) {
            return Err(TemplateError::InvalidExpression {
                expr: expr.to_string(),
            });
        }
        let path = expr.strip_prefix('.').unwrap_or(expr);
        segments.push(Segment::Var(path.split('.').collect()));
        last = whole.end();
    }

    push_text(&mut segments, template, last, template.len())?;
    Ok(segments)
}

/// Literal text between placeholders; an opening `{{` here was never closed
fn push_text<'a>(
    segments: &mut Vec<Segment<'a>>,
    template: &'a str,
    start: usize,
    end: usize,
) -> Result<(), TemplateError> {
    let text = &template[start..end];
    if let Some(open) = text.find("{{") {
        return Err(TemplateError::Unclosed {
            offset: start + open,
        });
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
    Ok(())
}

/// Render a template against the store
///
/// Names that resolve to nothing render as the empty string. Syntax errors
/// are returned so the caller decides whether to fall back.
pub fn render(template: &str, store: &VariableStore) -> Result<String, TemplateError> {
    let segments = parse(template)?;
    let mut output = String::with_capacity(template.len());

    for segment in segments {
        match segment {
            Segment::Text(text) => output.push_str(text),
            Segment::Var(path) => match store.lookup_path(&path) {
                Some(value) => output.push_str(&canonical_string(value)),
                None => {
                    tracing::debug!(placeholder = %path.join("."), "unresolved placeholder");
                }
            },
        }
    }

    Ok(output)
}

/// Root variable names referenced by a template, in order of appearance
pub fn referenced_variables(template: &str) -> Result<Vec<String>, TemplateError> {
    Ok(parse(template)?
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Var(path) => path.first().map(|s| s.to_string()),
            Segment::Text(_) => None,
        })
        .collect())
}

/// Canonical text form of a value
///
/// Strings render verbatim, other scalars as their JSON text and containers
/// as compact JSON. Floats without a fractional part render as integers.
/// Used both to fill placeholders and to compare expected against actual
/// response values, so `5`, `5.0` and `"5"` render identically.
pub fn canonical_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => integral_numbers(other).to_string(),
    }
}

fn integral_numbers(value: &Value) -> Value {
    match value {
        Value::Number(n) => as_integral(n).map_or_else(|| value.clone(), Value::from),
        Value::Array(items) => Value::Array(items.iter().map(integral_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), integral_numbers(item)))
                .collect(),
        ),
        Value::Null | Value::Bool(_) | Value::String(_) => value.clone(),
    }
}

fn as_integral(n: &Number) -> Option<i64> {
    if !n.is_f64() {
        return None;
    }
    let f = n.as_f64()?;
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}
