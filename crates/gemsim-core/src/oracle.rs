//! Reply oracle
//!
//! Static lookup from an expected-response identifier to the payload the
//! simulated equipment returns. A missing entry is a normal outcome; the step
//! simulator decides what it means.

use crate::errors::{Result, SimError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Canned equipment replies, keyed by expected-response identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplyOracle {
    entries: BTreeMap<String, Value>,
}

impl ReplyOracle {
    /// Create an empty oracle
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an oracle table from a JSON object document
    pub fn from_json(document: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(document)?;
        match value {
            Value::Object(map) => Ok(Self {
                entries: map.into_iter().collect(),
            }),
            other => Err(SimError::config(format!(
                "reply table must be an object keyed by response id, got {}",
                kind_name(&other)
            ))),
        }
    }

    /// Builder-style insertion
    pub fn with_reply(mut self, response_id: impl Into<String>, payload: Value) -> Self {
        self.entries.insert(response_id.into(), payload);
        self
    }

    /// Canned payload for `response_id`, if one is configured
    pub fn lookup(&self, response_id: &str) -> Option<&Value> {
        self.entries.get(response_id)
    }

    /// Number of configured replies
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no replies are configured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
