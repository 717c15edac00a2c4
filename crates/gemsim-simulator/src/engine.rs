//! Scenario execution engine
//!
//! Walks a scenario's steps in declaration order, resolves each body, hands
//! the step to the [`StepSimulator`] and folds the outcomes into a verdict.
//!
//! # Failure policy
//!
//! - Reply timeouts and missing replies mark the run failed but the remaining
//!   steps still execute, so one run reports every fault.
//! - A body that cannot be resolved marks the run failed and aborts the
//!   remaining steps.
//! - Cancellation is observed before each step and during the settle delay;
//!   the run still ends in a verdict.
//!
//! One engine runs at most one scenario at a time. The engine keeps no state
//! between runs apart from the in-flight progress marker.

use crate::cancellation::RunCancellation;
use crate::events::{EngineEvent, EventBus};
use crate::step::{ResolvedStep, StepSimulator};
use crate::transcript::{Transcript, TranscriptRecorder};
use gemsim_core::effects::PhysicalTimeEffects;
use gemsim_core::validation::validate_parameters;
use gemsim_core::{
    resolve, Direction, ParameterValues, ReplyOracle, Result, Scenario, Severity, SimError,
    SimulatorConfig, StepOutcome, Verdict,
};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// What the engine is currently doing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunProgress {
    /// No run in flight
    #[default]
    Idle,
    /// A run is executing the given step
    Running {
        /// Scenario being run
        scenario_id: String,
        /// Step currently executing
        step_index: usize,
        /// Number of steps in the scenario
        total_steps: usize,
    },
}

impl RunProgress {
    /// Whether a run is in flight
    pub fn is_running(&self) -> bool {
        matches!(self, RunProgress::Running { .. })
    }
}

/// Ephemeral state of one scenario execution
pub struct RunContext<'a> {
    /// Validated parameter values
    pub values: ParameterValues,
    /// Index of the step being executed
    pub step_index: usize,
    /// Accumulated pass flag
    pub passed: bool,
    /// Transcript handle for this run
    pub log: TranscriptRecorder<'a>,
    failures: Vec<String>,
}

impl<'a> RunContext<'a> {
    fn new(values: ParameterValues, log: TranscriptRecorder<'a>) -> Self {
        Self {
            values,
            step_index: 0,
            passed: true,
            log,
            failures: Vec::new(),
        }
    }

    fn fold(&mut self, step_name: &str, outcome: &StepOutcome) {
        if outcome.is_failure() {
            self.passed = false;
            self.failures
                .push(format!("{step_name}: {}", outcome.describe()));
        }
    }
}

/// Resets the engine to idle when a run ends, however it ends.
struct RunGuard<'a> {
    state: &'a Mutex<RunProgress>,
}

impl RunGuard<'_> {
    fn at_step(&self, step_index: usize) {
        if let RunProgress::Running {
            step_index: current,
            ..
        } = &mut *self.state.lock()
        {
            *current = step_index;
        }
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock() = RunProgress::Idle;
    }
}

/// Sequences steps for a scenario and aggregates the verdict
pub struct ScenarioEngine {
    clock: Arc<dyn PhysicalTimeEffects>,
    oracle: Arc<ReplyOracle>,
    config: SimulatorConfig,
    events: EventBus,
    state: Mutex<RunProgress>,
}

impl ScenarioEngine {
    /// Create an engine over a clock and reply oracle
    pub fn new(
        clock: Arc<dyn PhysicalTimeEffects>,
        oracle: Arc<ReplyOracle>,
        config: SimulatorConfig,
    ) -> Self {
        let events = EventBus::new(config.event_capacity);
        Self {
            clock,
            oracle,
            config,
            events,
            state: Mutex::new(RunProgress::Idle),
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Reply oracle consulted by every step
    pub fn oracle(&self) -> &ReplyOracle {
        &self.oracle
    }

    /// Current run progress
    pub fn progress(&self) -> RunProgress {
        self.state.lock().clone()
    }

    /// Register an observer for engine events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Run `scenario` to completion
    pub async fn run(
        &self,
        scenario: &Scenario,
        values: &ParameterValues,
        transcript: &Transcript,
    ) -> Result<Verdict> {
        self.run_with_cancellation(scenario, values, transcript, &RunCancellation::new())
            .await
    }

    /// Run `scenario`, stopping at the next step boundary once `cancel` fires
    ///
    /// Returns `Err` only if the parameters are invalid or another run is in
    /// flight; every in-run failure ends up in the verdict.
    pub async fn run_with_cancellation(
        &self,
        scenario: &Scenario,
        values: &ParameterValues,
        transcript: &Transcript,
        cancel: &RunCancellation,
    ) -> Result<Verdict> {
        let errors = validate_parameters(scenario, values);
        if !errors.is_empty() {
            return Err(SimError::validation(errors));
        }

        let guard = self.begin(scenario)?;
        let total_steps = scenario.steps.len();
        info!(scenario = %scenario.id, total_steps, "scenario run started");
        self.events.publish(EngineEvent::RunStarted {
            scenario_id: scenario.id.clone(),
            total_steps,
        });

        let recorder = TranscriptRecorder::new(transcript, &self.events, self.clock.as_ref());
        let mut ctx = RunContext::new(values.clone(), recorder);
        let simulator = StepSimulator::new(
            self.clock.as_ref(),
            &self.oracle,
            &self.config.fallback_reply,
        );

        let mut cancelled_at = None;
        let mut aborted_at = None;

        for (index, step) in scenario.steps.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled_at = Some(index);
                break;
            }

            ctx.step_index = index;
            guard.at_step(index);
            self.events.publish(EngineEvent::StepStarted {
                scenario_id: scenario.id.clone(),
                step_index: index,
                step_name: step.name.clone(),
            });

            let outcome = match resolve(&step.message.body, &ctx.values) {
                Ok(body) => {
                    let resolved = ResolvedStep::new(step, body, &self.config);
                    simulator.simulate(&resolved, &ctx.log).await
                }
                Err(err) => {
                    warn!(scenario = %scenario.id, step = %step.name, %err, "template resolution failed");
                    ctx.log
                        .record(
                            Direction::Error,
                            Severity::Error,
                            format!("{} template could not be resolved", step.message.label()),
                            json!({ "step": step.name, "reason": err.to_string() }),
                        )
                        .await;
                    StepOutcome::MalformedTemplate {
                        reason: err.to_string(),
                    }
                }
            };

            ctx.fold(&step.name, &outcome);
            let abort = matches!(outcome, StepOutcome::MalformedTemplate { .. });
            self.events.publish(EngineEvent::StepFinished {
                scenario_id: scenario.id.clone(),
                step_index: index,
                outcome,
            });

            if abort {
                aborted_at = Some(index);
                break;
            }

            if index + 1 < total_steps {
                tokio::select! {
                    _ = self.settle() => {}
                    _ = cancel.cancelled() => {}
                }
            }
        }

        if let Some(index) = cancelled_at {
            ctx.passed = false;
            ctx.log
                .record(
                    Direction::Info,
                    Severity::Warning,
                    format!("Run cancelled before step {} of {total_steps}", index + 1),
                    json!({ "scenario": scenario.id, "completed_steps": index }),
                )
                .await;
        }

        let notes = compose_notes(&ctx, total_steps, cancelled_at, aborted_at);
        let verdict = Verdict {
            scenario_id: scenario.id.clone(),
            timestamp_ms: self.clock.now_ms().await,
            passed: ctx.passed,
            cancelled: cancelled_at.is_some(),
            notes,
        };

        info!(
            scenario = %scenario.id,
            passed = verdict.passed,
            cancelled = verdict.cancelled,
            "scenario run finished"
        );
        self.events.publish(EngineEvent::RunFinished {
            verdict: verdict.clone(),
        });
        drop(guard);
        Ok(verdict)
    }

    fn begin(&self, scenario: &Scenario) -> Result<RunGuard<'_>> {
        let mut state = self.state.lock();
        if let RunProgress::Running { scenario_id, .. } = &*state {
            return Err(SimError::already_running(scenario_id.clone()));
        }
        *state = RunProgress::Running {
            scenario_id: scenario.id.clone(),
            step_index: 0,
            total_steps: scenario.steps.len(),
        };
        Ok(RunGuard { state: &self.state })
    }

    async fn settle(&self) {
        if let Err(err) = self.clock.sleep_ms(self.config.settle_delay_ms).await {
            warn!(%err, "settle delay failed; continuing");
        }
    }
}

fn compose_notes(
    ctx: &RunContext<'_>,
    total_steps: usize,
    cancelled_at: Option<usize>,
    aborted_at: Option<usize>,
) -> String {
    let mut notes = if ctx.failures.is_empty() {
        match (total_steps, cancelled_at) {
            (0, _) => "Scenario has no steps".to_string(),
            (_, Some(_)) => "No step failures before cancellation".to_string(),
            _ => format!("All {total_steps} step(s) completed successfully"),
        }
    } else {
        format!(
            "{} step(s) failed: {}",
            ctx.failures.len(),
            ctx.failures.join("; ")
        )
    };

    if let Some(index) = aborted_at {
        let skipped = total_steps - index - 1;
        if skipped > 0 {
            notes.push_str(&format!(". Aborted; {skipped} remaining step(s) skipped"));
        }
    }
    if let Some(index) = cancelled_at {
        notes.push_str(&format!(
            ". Cancelled after {index} of {total_steps} step(s)"
        ));
    }
    notes
}
