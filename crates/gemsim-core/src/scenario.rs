//! Scenario definitions
//!
//! A scenario is an ordered script of message exchanges between a simulated
//! host and a simulated equipment endpoint, plus the run-time parameters its
//! message bodies may reference through `{{KEY}}` placeholders.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Complete scenario definition
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Scenario {
    /// Unique identifier within a catalog
    pub id: String,
    /// Short human-readable title
    pub title: String,
    /// Classification tag (standard or category, e.g. "E30")
    pub standard: String,
    /// Human-readable description of what this scenario exercises
    #[serde(default)]
    pub description: String,
    /// Declared run-time parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDeclaration>,
    /// Steps, executed strictly in declaration order
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Look up a parameter declaration by key
    pub fn parameter(&self, key: &str) -> Option<&ParameterDeclaration> {
        self.parameters.iter().find(|p| p.key == key)
    }
}

/// Semantic type of a declared parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Free text
    String,
    /// Numeric value, optionally bounded
    Number,
    /// One of a fixed option set
    Enum,
}

/// Declaration of a run-time parameter
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParameterDeclaration {
    /// Key referenced by `{{KEY}}` placeholders; unique within a scenario
    pub key: String,
    /// Display label
    pub label: String,
    /// Default value in string form
    #[serde(rename = "default")]
    pub default_value: String,
    /// Semantic type
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    /// Inclusive lower bound for numbers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound for numbers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Allowed values for enums
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// One atomic simulated message exchange
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Step {
    /// Step name
    pub name: String,
    /// What this step does
    #[serde(default)]
    pub description: String,
    /// Message sent by the host
    pub message: MessageTemplate,
    /// Identifier of the anticipated reply (e.g. "S1F2")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_response: Option<String>,
    /// Simulated processing delay before the equipment answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulate_delay_ms: Option<u64>,
    /// Reply-timeout budget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Step {
    /// Simulated delay, falling back to `default_ms` when the step omits it
    pub fn delay_or(&self, default_ms: u64) -> u64 {
        self.simulate_delay_ms.unwrap_or(default_ms)
    }

    /// Timeout budget, falling back to `default_ms` when the step omits it
    pub fn timeout_or(&self, default_ms: u64) -> u64 {
        self.timeout_ms.unwrap_or(default_ms)
    }
}

/// Message template sent by the host
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MessageTemplate {
    /// Stream number
    pub stream: u8,
    /// Function number
    pub function: u8,
    /// Whether the sender demands a reply
    pub wait_bit: bool,
    /// Display name, e.g. "Are You There Request"
    #[serde(default)]
    pub name: String,
    /// Structured body; string leaves may embed `{{KEY}}` placeholders
    #[serde(default)]
    pub body: Value,
}

impl MessageTemplate {
    /// Stream/function identifier with a `W` marker when a reply is expected
    pub fn label(&self) -> MessageLabel {
        MessageLabel {
            stream: self.stream,
            function: self.function,
            wait_bit: self.wait_bit,
        }
    }
}

/// Display form of a message identifier: `S1F13 W`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLabel {
    /// Stream number
    pub stream: u8,
    /// Function number
    pub function: u8,
    /// Reply-expected marker
    pub wait_bit: bool,
}

impl fmt::Display for MessageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}F{}", self.stream, self.function)?;
        if self.wait_bit {
            write!(f, " W")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_marks_wait_bit() {
        let mut message = MessageTemplate {
            stream: 1,
            function: 13,
            wait_bit: true,
            name: "Establish Communications Request".to_string(),
            body: Value::Null,
        };
        assert_eq!(message.label().to_string(), "S1F13 W");

        message.wait_bit = false;
        assert_eq!(message.label().to_string(), "S1F13");
    }

    #[test]
    fn test_step_defaults_apply_only_when_absent() {
        let step: Step = serde_json::from_value(json!({
            "name": "Are you there",
            "message": { "stream": 1, "function": 1, "wait_bit": true },
            "timeout_ms": 2000
        }))
        .unwrap();

        assert_eq!(step.delay_or(500), 500);
        assert_eq!(step.timeout_or(5000), 2000);
        assert!(step.expected_response.is_none());
        assert_eq!(step.message.body, Value::Null);
    }

    #[test]
    fn test_parameter_kind_uses_lowercase_tags() {
        let decl: ParameterDeclaration = serde_json::from_value(json!({
            "key": "NEWVAL",
            "label": "New value",
            "default": "100",
            "type": "number",
            "min": 0.0,
            "max": 9999.0
        }))
        .unwrap();

        assert_eq!(decl.kind, ParameterKind::Number);
        assert_eq!(decl.max, Some(9999.0));
        assert!(decl.options.is_none());
    }
}
