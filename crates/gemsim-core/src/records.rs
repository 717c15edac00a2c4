//! Transcript, outcome and verdict records
//!
//! These are the values a run produces. Log entries and verdicts are
//! immutable once created; ordering is by emission.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Direction of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Host sent a message to the equipment
    HostToEquipment,
    /// Equipment replied to the host
    EquipmentToHost,
    /// Informational marker
    Info,
    /// Failure detected by the host
    Error,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self {
            Direction::HostToEquipment => "H->E",
            Direction::EquipmentToHost => "E->H",
            Direction::Info => "INFO",
            Direction::Error => "ERR ",
        };
        f.write_str(arrow)
    }
}

/// Severity classification of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Neutral information
    Info,
    /// Successful exchange
    Success,
    /// Degraded but not failed
    Warning,
    /// Failed exchange
    Error,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique entry identifier
    pub id: Uuid,
    /// Emission time in milliseconds, read from the clock effect
    pub timestamp_ms: u64,
    /// Direction of the exchange
    pub direction: Direction,
    /// One-line summary
    pub summary: String,
    /// Full body or error detail
    pub detail: Value,
    /// Severity classification
    pub severity: Severity,
}

impl LogEntry {
    /// Create an entry with a fresh identifier
    pub fn new(
        timestamp_ms: u64,
        direction: Direction,
        severity: Severity,
        summary: impl Into<String>,
        detail: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp_ms,
            direction,
            summary: summary.into(),
            detail,
            severity,
        }
    }
}

/// Result of simulating a single step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Equipment replied with a payload
    Acknowledged {
        /// Reply payload (oracle entry or fallback acknowledgement)
        payload: Value,
    },
    /// Message did not request a reply and none was modeled
    NoReplyRequired,
    /// Host gave up waiting after its timeout budget
    TimedOut {
        /// Budget that elapsed
        timeout_ms: u64,
    },
    /// Message body could not be resolved
    MalformedTemplate {
        /// Why resolution failed
        reason: String,
    },
    /// A reply was demanded but none is modeled
    NoOracleEntry,
}

impl StepOutcome {
    /// Whether this outcome marks the scenario as failed
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StepOutcome::TimedOut { .. }
                | StepOutcome::MalformedTemplate { .. }
                | StepOutcome::NoOracleEntry
        )
    }

    /// Short description used in verdict notes
    pub fn describe(&self) -> String {
        match self {
            StepOutcome::Acknowledged { .. } => "acknowledged".to_string(),
            StepOutcome::NoReplyRequired => "no reply required".to_string(),
            StepOutcome::TimedOut { timeout_ms } => format!("reply timeout after {timeout_ms}ms"),
            StepOutcome::MalformedTemplate { reason } => format!("malformed template: {reason}"),
            StepOutcome::NoOracleEntry => "reply demanded but none modeled".to_string(),
        }
    }
}

/// Terminal pass/fail record of one scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Scenario that was run
    pub scenario_id: String,
    /// Completion time in milliseconds
    pub timestamp_ms: u64,
    /// Whether every step acknowledged or needed no reply
    pub passed: bool,
    /// Whether the run was cancelled before completing
    #[serde(default)]
    pub cancelled: bool,
    /// Free-text explanation
    pub notes: String,
}
