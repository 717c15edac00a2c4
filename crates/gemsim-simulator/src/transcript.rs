//! Message transcript (log sink)
//!
//! Append-only record of every simulated transmission, reply, informational
//! marker and error. Entries are immutable once appended and ordered by
//! emission; the only removal is a bulk clear by the owner.

use crate::events::{EngineEvent, EventBus};
use gemsim_core::effects::PhysicalTimeEffects;
use gemsim_core::{Direction, LogEntry, Severity};
use parking_lot::RwLock;
use serde_json::Value;

/// Shared, append-only transcript
#[derive(Debug, Default)]
pub struct Transcript {
    entries: RwLock<Vec<LogEntry>>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry atomically
    pub fn append(&self, entry: LogEntry) {
        self.entries.write().push(entry);
    }

    /// Snapshot of all entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().clone()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the transcript is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

/// Per-run handle that timestamps, appends and announces transcript entries
pub struct TranscriptRecorder<'a> {
    transcript: &'a Transcript,
    events: &'a EventBus,
    clock: &'a dyn PhysicalTimeEffects,
}

impl<'a> TranscriptRecorder<'a> {
    /// Bind a recorder to a transcript, event bus and clock
    pub fn new(
        transcript: &'a Transcript,
        events: &'a EventBus,
        clock: &'a dyn PhysicalTimeEffects,
    ) -> Self {
        Self {
            transcript,
            events,
            clock,
        }
    }

    /// Record one entry stamped with the current clock reading
    pub async fn record(
        &self,
        direction: Direction,
        severity: Severity,
        summary: impl Into<String>,
        detail: Value,
    ) -> LogEntry {
        let timestamp_ms = self.clock.now_ms().await;
        let entry = LogEntry::new(timestamp_ms, direction, severity, summary, detail);
        self.transcript.append(entry.clone());
        self.events.publish(EngineEvent::LogAppended {
            entry: entry.clone(),
        });
        entry
    }
}
