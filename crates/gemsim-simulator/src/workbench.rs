//! Workbench: the orchestrating owner of all mutable simulator state
//!
//! The engine itself is stateless across runs. Everything that outlives a
//! run (catalog, per-scenario parameter values and their validation errors,
//! verdict history, transcript) lives here and is handed to the engine
//! explicitly.

use crate::cancellation::RunCancellation;
use crate::engine::{RunProgress, ScenarioEngine};
use crate::events::EngineEvent;
use crate::history::VerdictHistory;
use crate::transcript::Transcript;
use gemsim_core::effects::{AnalysisEffects, AnalysisReport, AnalysisRequest};
use gemsim_core::validation::{default_values, validate_parameters};
use gemsim_core::{
    Catalog, LogEntry, ParameterValues, Result, Scenario, SimError, ValidationErrors, Verdict,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Owns the catalog, parameter edits, verdict history and transcript
pub struct Workbench {
    catalog: Catalog,
    values: HashMap<String, ParameterValues>,
    errors: HashMap<String, ValidationErrors>,
    history: VerdictHistory,
    transcript: Arc<Transcript>,
    engine: Arc<ScenarioEngine>,
}

impl Workbench {
    /// Create a workbench over a catalog, seeding every parameter from its default
    pub fn new(catalog: Catalog, engine: ScenarioEngine) -> Self {
        let mut workbench = Self {
            catalog,
            values: HashMap::new(),
            errors: HashMap::new(),
            history: VerdictHistory::new(),
            transcript: Arc::new(Transcript::new()),
            engine: Arc::new(engine),
        };
        workbench.reseed_parameters();
        workbench
    }

    /// Scenarios in catalog order
    pub fn scenarios(&self) -> &[Scenario] {
        self.catalog.scenarios()
    }

    /// Scenario by identifier
    pub fn scenario(&self, id: &str) -> Result<&Scenario> {
        find(&self.catalog, id)
    }

    /// Current parameter values for a scenario
    pub fn parameter_values(&self, id: &str) -> Result<&ParameterValues> {
        self.scenario(id)?;
        self.values
            .get(id)
            .ok_or_else(|| SimError::not_found(format!("parameters for scenario '{id}'")))
    }

    /// Edit one parameter and recompute the scenario's validation errors
    pub fn set_parameter(
        &mut self,
        id: &str,
        key: &str,
        value: impl Into<String>,
    ) -> Result<&ValidationErrors> {
        let scenario = find(&self.catalog, id)?;
        if scenario.parameter(key).is_none() {
            return Err(SimError::not_found(format!(
                "parameter '{key}' in scenario '{id}'"
            )));
        }

        let values = self.values.entry(id.to_string()).or_default();
        values.insert(key.to_string(), value.into());
        let errors = validate_parameters(scenario, values);
        let slot = self.errors.entry(id.to_string()).or_default();
        *slot = errors;
        Ok(slot)
    }

    /// Restore a scenario's parameters to their declared defaults
    pub fn reset_parameters(&mut self, id: &str) -> Result<&ValidationErrors> {
        let scenario = find(&self.catalog, id)?;
        let values = default_values(scenario);
        let errors = validate_parameters(scenario, &values);
        self.values.insert(id.to_string(), values);
        let slot = self.errors.entry(id.to_string()).or_default();
        *slot = errors;
        Ok(slot)
    }

    /// Validation errors for a scenario, keyed by parameter
    pub fn validation_errors(&self, id: &str) -> Result<&ValidationErrors> {
        self.scenario(id)?;
        self.errors
            .get(id)
            .ok_or_else(|| SimError::not_found(format!("parameters for scenario '{id}'")))
    }

    /// Run one scenario with its current parameters
    pub async fn run_scenario(&mut self, id: &str) -> Result<Verdict> {
        self.run_scenario_with_cancellation(id, &RunCancellation::new())
            .await
    }

    /// Run one scenario; `cancel` stops it at the next step boundary
    pub async fn run_scenario_with_cancellation(
        &mut self,
        id: &str,
        cancel: &RunCancellation,
    ) -> Result<Verdict> {
        let errors = self.validation_errors(id)?;
        if !errors.is_empty() {
            return Err(SimError::validation(errors.clone()));
        }

        let scenario = self.scenario(id)?;
        let values = self.parameter_values(id)?;
        let verdict = self
            .engine
            .run_with_cancellation(scenario, values, &self.transcript, cancel)
            .await?;

        self.history.record(verdict.clone());
        Ok(verdict)
    }

    /// Run every scenario in catalog order
    ///
    /// Scenarios whose parameters are invalid are reported as errors and
    /// skipped; the remaining scenarios still run.
    pub async fn run_all(&mut self) -> Vec<(String, Result<Verdict>)> {
        let ids: Vec<String> = self.scenarios().iter().map(|s| s.id.clone()).collect();
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let result = self.run_scenario(&id).await;
            results.push((id, result));
        }
        results
    }

    /// Verdict history, newest first
    pub fn history(&self) -> &VerdictHistory {
        &self.history
    }

    /// Forget every recorded verdict
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Transcript snapshot, oldest first
    pub fn transcript(&self) -> Vec<LogEntry> {
        self.transcript.entries()
    }

    /// Shared handle to the live transcript
    pub fn transcript_handle(&self) -> Arc<Transcript> {
        self.transcript.clone()
    }

    /// Drop every transcript entry
    pub fn clear_transcript(&self) {
        self.transcript.clear();
    }

    /// Current engine progress
    pub fn progress(&self) -> RunProgress {
        self.engine.progress()
    }

    /// Shared handle to the engine, for observers and progress polling
    pub fn engine(&self) -> Arc<ScenarioEngine> {
        self.engine.clone()
    }

    /// Register an observer for engine events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.engine.subscribe()
    }

    /// Replace the catalog wholesale; on error the current catalog is kept
    pub fn import_catalog(&mut self, document: &str) -> Result<usize> {
        let count = self.catalog.import(document)?;
        self.reseed_parameters();
        info!(scenarios = count, "catalog imported");
        Ok(count)
    }

    /// Export the catalog as a document `import_catalog` accepts
    pub fn export_catalog(&self) -> Result<String> {
        self.catalog.to_json()
    }

    /// Ask the analysis collaborator for a report, degrading to a static one
    pub async fn analyze(&self, collaborator: &dyn AnalysisEffects) -> AnalysisReport {
        let request = AnalysisRequest {
            transcript: self.transcript.entries(),
            verdicts: self.history.to_vec(),
        };
        match collaborator.analyze(&request).await {
            Ok(report) => report,
            Err(err) => {
                warn!(%err, "analysis collaborator failed; using fallback report");
                AnalysisReport::fallback()
            }
        }
    }

    fn reseed_parameters(&mut self) {
        self.values.clear();
        self.errors.clear();
        for scenario in self.catalog.scenarios() {
            let values = default_values(scenario);
            let errors = validate_parameters(scenario, &values);
            self.values.insert(scenario.id.clone(), values);
            self.errors.insert(scenario.id.clone(), errors);
        }
    }
}

fn find<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a Scenario> {
    catalog
        .get(id)
        .ok_or_else(|| SimError::not_found(format!("scenario '{id}'")))
}
