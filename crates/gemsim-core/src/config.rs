//! Simulator configuration

use crate::errors::{Result, SimError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

/// Default simulated processing delay for steps that omit one
pub const DEFAULT_DELAY_MS: u64 = 500;
/// Default reply-timeout budget (T3 analogue) for steps that omit one
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// Delay between consecutive steps
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 200;
/// Default capacity of the engine event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Tunables for step simulation and the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Processing delay applied when a step has no `simulate_delay_ms`
    pub default_delay_ms: u64,
    /// Reply-timeout budget applied when a step has no `timeout_ms`
    pub default_timeout_ms: u64,
    /// Settle delay between steps
    pub settle_delay_ms: u64,
    /// Acknowledgement payload used when an expected reply has no oracle entry
    pub fallback_reply: Value,
    /// Capacity of the broadcast event channel
    pub event_capacity: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            default_delay_ms: DEFAULT_DELAY_MS,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            fallback_reply: json!({ "ACK": 0 }),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl SimulatorConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(document).map_err(|e| SimError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path)
            .map_err(|e| SimError::config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&document)
    }

    /// Reject settings the simulator cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.default_timeout_ms == 0 {
            return Err(SimError::config("default_timeout_ms must be positive"));
        }
        if self.event_capacity == 0 {
            return Err(SimError::config("event_capacity must be positive"));
        }
        Ok(())
    }
}
