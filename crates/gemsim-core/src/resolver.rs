//! Parameter resolver
//!
//! Bodies are resolved textually: the template is serialized, every
//! `{{KEY}}` is replaced with the value's string form, and the result is
//! parsed back into structured data. Substituted values therefore have to be
//! syntactically valid where they land; a value that breaks the document is
//! reported, never coerced.
//!
//! Keys are matched as serialized text; catalog import refuses keys that
//! JSON would escape or that contain braces.

use crate::validation::ParameterValues;
use serde_json::Value;
use std::collections::BTreeSet;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Why a template could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Placeholder references a key with no value
    #[error("no value for placeholder '{{{{{0}}}}}'")]
    UnknownPlaceholder(String),
    /// Substitution produced something that no longer parses
    #[error("substituted body is not valid structured data: {0}")]
    InvalidStructure(String),
}

/// Replace every placeholder in `template` and reparse the result
pub fn resolve(template: &Value, values: &ParameterValues) -> Result<Value, ResolveError> {
    let text = template.to_string();
    if !text.contains(OPEN) {
        return Ok(template.clone());
    }

    let substituted = substitute(&text, values)?;
    serde_json::from_str(&substituted).map_err(|e| ResolveError::InvalidStructure(e.to_string()))
}

fn substitute(text: &str, values: &ParameterValues) -> Result<String, ResolveError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };
        let key = after_open[..end].trim();
        let value = values
            .get(key)
            .ok_or_else(|| ResolveError::UnknownPlaceholder(key.to_string()))?;

        out.push_str(&rest[..start]);
        out.push_str(value);
        rest = &after_open[end + CLOSE.len()..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Keys referenced by placeholders anywhere in `template`
pub fn placeholders(template: &Value) -> BTreeSet<String> {
    let text = template.to_string();
    let mut keys = BTreeSet::new();
    let mut rest = text.as_str();

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };
        keys.insert(after_open[..end].trim().to_string());
        rest = &after_open[end + CLOSE.len()..];
    }

    keys
}
