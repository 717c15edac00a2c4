//! Typed engine notifications
//!
//! The engine publishes every transcript append and every step/run boundary
//! on a broadcast channel. Observers subscribe; publishing with nobody
//! listening is not an error, and a lagging observer only loses its own
//! backlog.

use gemsim_core::{LogEntry, StepOutcome, Verdict};
use serde::Serialize;
use tokio::sync::broadcast;

/// Notification emitted by the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A run passed validation and started
    RunStarted {
        /// Scenario being run
        scenario_id: String,
        /// Number of steps in the scenario
        total_steps: usize,
    },
    /// A step is about to be sent
    StepStarted {
        /// Scenario being run
        scenario_id: String,
        /// Zero-based step position
        step_index: usize,
        /// Step name from the catalog
        step_name: String,
    },
    /// An entry was appended to the transcript
    LogAppended {
        /// The appended entry
        entry: LogEntry,
    },
    /// A step produced its outcome
    StepFinished {
        /// Scenario being run
        scenario_id: String,
        /// Zero-based step position
        step_index: usize,
        /// What the step produced
        outcome: StepOutcome,
    },
    /// A run reached its terminal verdict
    RunFinished {
        /// Final verdict of the run
        verdict: Verdict,
    },
}

/// Producer side of the engine notification channel
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per observer
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a new observer
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sender.subscribe()
    }

    /// Publish to every current observer
    pub fn publish(&self, event: EngineEvent) {
        // Err only means nobody is subscribed.
        let _ = self.sender.send(event);
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
