//! Offline analysis handler
//!
//! Stands in for the remote text-generation collaborator when none is
//! configured. The report is derived from counts only; it never fails.

use async_trait::async_trait;
use gemsim_core::effects::{AnalysisEffects, AnalysisReport, AnalysisRequest};
use gemsim_core::{Direction, Result, Severity};
use std::collections::BTreeSet;

/// Builds an [`AnalysisReport`] from transcript and verdict counts
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptDigestHandler;

impl TranscriptDigestHandler {
    /// Create a new digest handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AnalysisEffects for TranscriptDigestHandler {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport> {
        let runs = request.verdicts.len();
        let failed: Vec<_> = request.verdicts.iter().filter(|v| !v.passed).collect();
        let errors: Vec<_> = request
            .transcript
            .iter()
            .filter(|e| e.direction == Direction::Error)
            .collect();
        let fallbacks = request
            .transcript
            .iter()
            .filter(|e| e.severity == Severity::Warning)
            .count();

        let summary = format!(
            "{runs} scenario run(s): {} passed, {} failed; {} message(s) exchanged, {} error entr{}.",
            runs - failed.len(),
            failed.len(),
            request
                .transcript
                .iter()
                .filter(|e| e.direction == Direction::HostToEquipment)
                .count(),
            errors.len(),
            if errors.len() == 1 { "y" } else { "ies" },
        );

        let mut anomalies: Vec<String> = errors
            .iter()
            .map(|e| e.summary.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        anomalies.extend(
            failed
                .iter()
                .map(|v| format!("{} failed: {}", v.scenario_id, v.notes)),
        );

        let mut recommendations = Vec::new();
        if errors.iter().any(|e| e.summary.contains("timeout")) {
            recommendations.push(
                "Raise the reply-timeout budget or investigate the slow equipment response."
                    .to_string(),
            );
        }
        if errors.iter().any(|e| e.summary.contains("no reply modeled")) {
            recommendations
                .push("Declare an expected response for steps that set the wait bit.".to_string());
        }
        if fallbacks > 0 {
            recommendations.push(format!(
                "Add reply table entries for the {fallbacks} exchange(s) that fell back to a generic acknowledgement."
            ));
        }
        tracing::debug!(runs, errors = errors.len(), fallbacks, "built transcript digest");
        if recommendations.is_empty() {
            recommendations.push("No action required.".to_string());
        }

        Ok(AnalysisReport {
            summary,
            anomalies,
            recommendations,
        })
    }
}
