//! Analysis collaborator effect
//!
//! An external text-generation service that turns the transcript and verdict
//! history into a short narrative. It has no bearing on execution; callers are
//! expected to degrade to [`AnalysisReport::fallback`] when it fails.

use crate::errors::Result;
use crate::records::{LogEntry, Verdict};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Input handed to the analysis collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Transcript, oldest first
    pub transcript: Vec<LogEntry>,
    /// Verdict history, newest first
    pub verdicts: Vec<Verdict>,
}

/// Structured analysis returned by the collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Short narrative summary
    pub summary: String,
    /// Anomalies spotted in the transcript
    pub anomalies: Vec<String>,
    /// Suggested follow-ups
    pub recommendations: Vec<String>,
}

impl AnalysisReport {
    /// Static report used when the collaborator is unavailable
    pub fn fallback() -> Self {
        Self {
            summary: "Analysis unavailable; review the transcript manually.".to_string(),
            anomalies: Vec::new(),
            recommendations: vec![
                "Check error entries in the transcript for reply timeouts.".to_string(),
                "Re-run failed scenarios after adjusting delays or timeout budgets.".to_string(),
            ],
        }
    }
}

/// Text-generation collaborator that narrates a transcript
#[async_trait]
pub trait AnalysisEffects: Send + Sync {
    /// Produce a report; may fail like any remote call
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport>;
}
