//! Scenario catalog import/export
//!
//! A catalog document is a JSON array of scenarios. Import is all-or-nothing:
//! a payload that is not an array, does not match the scenario shape, or
//! breaks a declaration invariant is rejected and the current catalog stays
//! as it was.

use crate::errors::{Result, SimError};
use crate::oracle::kind_name;
use crate::scenario::{ParameterKind, Scenario};
use crate::validation::parse_number;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Ordered collection of scenarios
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    scenarios: Vec<Scenario>,
}

impl Catalog {
    /// Build a catalog, checking every declaration invariant
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self> {
        check_scenarios(&scenarios)?;
        Ok(Self { scenarios })
    }

    /// Parse and validate a catalog document
    pub fn from_json(document: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(document)
            .map_err(|e| SimError::catalog_import(format!("payload is not valid JSON: {e}")))?;

        if !value.is_array() {
            return Err(SimError::catalog_import(format!(
                "expected an array of scenarios, got {}",
                kind_name(&value)
            )));
        }

        let scenarios: Vec<Scenario> = serde_json::from_value(value)
            .map_err(|e| SimError::catalog_import(format!("malformed scenario record: {e}")))?;

        Self::new(scenarios)
    }

    /// Load a catalog document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let document = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&document)
    }

    /// Replace this catalog wholesale; on error nothing changes
    pub fn import(&mut self, document: &str) -> Result<usize> {
        let replacement = Self::from_json(document).map_err(|err| {
            warn!(%err, "catalog import rejected; keeping current catalog");
            err
        })?;
        debug!(
            previous = self.scenarios.len(),
            imported = replacement.scenarios.len(),
            "catalog replaced"
        );
        *self = replacement;
        Ok(self.scenarios.len())
    }

    /// Serialize as a pretty-printed catalog document
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.scenarios)?)
    }

    /// Scenario by identifier
    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Scenarios in catalog order
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Number of scenarios
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Whether the catalog holds no scenarios
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

fn check_scenarios(scenarios: &[Scenario]) -> Result<()> {
    let mut ids = HashSet::new();
    for scenario in scenarios {
        if scenario.id.trim().is_empty() {
            return Err(SimError::catalog_import("scenario with empty id"));
        }
        if !ids.insert(scenario.id.as_str()) {
            return Err(SimError::catalog_import(format!(
                "duplicate scenario id '{}'",
                scenario.id
            )));
        }
        check_parameters(scenario)?;
    }
    Ok(())
}

fn check_parameters(scenario: &Scenario) -> Result<()> {
    let mut keys = HashSet::new();
    for decl in &scenario.parameters {
        let at = || format!("scenario '{}', parameter '{}'", scenario.id, decl.key);

        if !keys.insert(decl.key.as_str()) {
            return Err(SimError::catalog_import(format!("{}: duplicate key", at())));
        }
        if !placeholder_key_is_valid(&decl.key) {
            return Err(SimError::catalog_import(format!(
                "{}: key must be non-blank and free of quotes, backslashes and braces",
                at()
            )));
        }

        match decl.kind {
            ParameterKind::Enum => {
                let options = decl.options.as_deref().unwrap_or_default();
                if options.is_empty() {
                    return Err(SimError::catalog_import(format!(
                        "{}: enum parameter needs at least one option",
                        at()
                    )));
                }
                if !options.contains(&decl.default_value) {
                    return Err(SimError::catalog_import(format!(
                        "{}: default '{}' is not one of the options",
                        at(),
                        decl.default_value
                    )));
                }
            }
            ParameterKind::Number => {
                if parse_number(&decl.default_value).is_none() {
                    return Err(SimError::catalog_import(format!(
                        "{}: default '{}' is not a number",
                        at(),
                        decl.default_value
                    )));
                }
                if let (Some(min), Some(max)) = (decl.min, decl.max) {
                    if min > max {
                        return Err(SimError::catalog_import(format!(
                            "{}: min {min} exceeds max {max}",
                            at()
                        )));
                    }
                }
            }
            ParameterKind::String => {}
        }
    }
    Ok(())
}

/// Keys are matched against the serialized body, so characters that JSON
/// escapes, or that collide with the `{{ }}` delimiters, can never match.
fn placeholder_key_is_valid(key: &str) -> bool {
    !key.trim().is_empty()
        && key.trim() == key
        && !key.chars().any(|c| matches!(c, '"' | '\\' | '{' | '}') || c.is_control())
}
