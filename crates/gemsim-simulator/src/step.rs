//! Step simulator
//!
//! Simulates one exchange: the host sends the resolved message, the clock is
//! suspended for the simulated latency, and the reply (or its absence) is
//! classified. Each call records exactly one outbound entry and at most one
//! reply or error entry.

use crate::transcript::TranscriptRecorder;
use gemsim_core::effects::PhysicalTimeEffects;
use gemsim_core::{
    Direction, MessageTemplate, ReplyOracle, Severity, SimulatorConfig, Step, StepOutcome,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// A step whose body has been resolved and whose defaults have been applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStep {
    /// Step name
    pub name: String,
    /// Message with a concrete body
    pub message: MessageTemplate,
    /// Identifier of the anticipated reply
    pub expected_response: Option<String>,
    /// Simulated processing delay
    pub delay_ms: u64,
    /// Reply-timeout budget
    pub timeout_ms: u64,
}

impl ResolvedStep {
    /// Pair a step with its resolved body, filling in configured defaults
    pub fn new(step: &Step, body: Value, config: &SimulatorConfig) -> Self {
        let mut message = step.message.clone();
        message.body = body;
        Self {
            name: step.name.clone(),
            message,
            expected_response: step.expected_response.clone(),
            delay_ms: step.delay_or(config.default_delay_ms),
            timeout_ms: step.timeout_or(config.default_timeout_ms),
        }
    }

    /// Whether the host gives up before the simulated reply would arrive
    pub fn times_out(&self) -> bool {
        self.message.wait_bit && self.delay_ms > self.timeout_ms
    }
}

/// Simulates single exchanges against the reply oracle
pub struct StepSimulator<'a> {
    clock: &'a dyn PhysicalTimeEffects,
    oracle: &'a ReplyOracle,
    fallback_reply: &'a Value,
}

impl<'a> StepSimulator<'a> {
    /// Create a simulator over a clock, oracle and fallback acknowledgement
    pub fn new(
        clock: &'a dyn PhysicalTimeEffects,
        oracle: &'a ReplyOracle,
        fallback_reply: &'a Value,
    ) -> Self {
        Self {
            clock,
            oracle,
            fallback_reply,
        }
    }

    /// Send `step` and classify what comes back
    pub async fn simulate(&self, step: &ResolvedStep, log: &TranscriptRecorder<'_>) -> StepOutcome {
        let label = step.message.label();

        log.record(
            Direction::HostToEquipment,
            Severity::Info,
            format!("{label} {}", step.message.name).trim_end().to_string(),
            step.message.body.clone(),
        )
        .await;

        if step.times_out() {
            // The host waits out its own budget, not the full simulated delay.
            self.suspend(step.timeout_ms).await;
            warn!(step = %step.name, timeout_ms = step.timeout_ms, "reply timeout");
            log.record(
                Direction::Error,
                Severity::Error,
                format!("{label} reply timeout after {}ms", step.timeout_ms),
                json!({
                    "step": step.name,
                    "timeout_ms": step.timeout_ms,
                    "simulated_delay_ms": step.delay_ms,
                }),
            )
            .await;
            return StepOutcome::TimedOut {
                timeout_ms: step.timeout_ms,
            };
        }

        self.suspend(step.delay_ms).await;

        // W=0 messages are never answered, whatever response id is declared.
        if !step.message.wait_bit {
            debug!(step = %step.name, "no reply requested");
            return StepOutcome::NoReplyRequired;
        }

        match &step.expected_response {
            Some(response_id) => {
                let (payload, severity, summary) = match self.oracle.lookup(response_id) {
                    Some(payload) => (payload.clone(), Severity::Success, response_id.clone()),
                    None => (
                        self.fallback_reply.clone(),
                        Severity::Warning,
                        format!("{response_id} generic acknowledgement (no reply table entry)"),
                    ),
                };
                debug!(step = %step.name, response = %response_id, "reply received");
                log.record(Direction::EquipmentToHost, severity, summary, payload.clone())
                    .await;
                StepOutcome::Acknowledged { payload }
            }
            None => {
                warn!(step = %step.name, "reply demanded but none modeled");
                log.record(
                    Direction::Error,
                    Severity::Error,
                    format!("{label} demanded a reply but no reply modeled"),
                    json!({ "step": step.name }),
                )
                .await;
                StepOutcome::NoOracleEntry
            }
        }
    }

    async fn suspend(&self, ms: u64) {
        if let Err(err) = self.clock.sleep_ms(ms).await {
            warn!(%err, ms, "clock suspension failed; continuing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::transcript::Transcript;
    use gemsim_effects::SimulatedTimeHandler;

    fn step(stream: u8, function: u8, wait_bit: bool, expected: Option<&str>) -> Step {
        Step {
            name: format!("S{stream}F{function}"),
            description: String::new(),
            message: MessageTemplate {
                stream,
                function,
                wait_bit,
                name: String::new(),
                body: Value::Null,
            },
            expected_response: expected.map(str::to_string),
            simulate_delay_ms: None,
            timeout_ms: None,
        }
    }

    struct Fixture {
        clock: SimulatedTimeHandler,
        oracle: ReplyOracle,
        config: SimulatorConfig,
        transcript: Transcript,
        events: EventBus,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                clock: SimulatedTimeHandler::new_at_epoch(),
                oracle: ReplyOracle::new().with_reply("S1F2", json!({ "MDLN": "X" })),
                config: SimulatorConfig::default(),
                transcript: Transcript::new(),
                events: EventBus::new(16),
            }
        }

        async fn run(&self, step: &Step) -> StepOutcome {
            let resolved = ResolvedStep::new(step, step.message.body.clone(), &self.config);
            let recorder = TranscriptRecorder::new(&self.transcript, &self.events, &self.clock);
            StepSimulator::new(&self.clock, &self.oracle, &self.config.fallback_reply)
                .simulate(&resolved, &recorder)
                .await
        }
    }

    #[tokio::test]
    async fn test_acknowledged_from_oracle() {
        let fx = Fixture::new();
        let mut s = step(1, 1, true, Some("S1F2"));
        s.simulate_delay_ms = Some(500);
        s.timeout_ms = Some(5_000);

        let outcome = fx.run(&s).await;
        assert_eq!(
            outcome,
            StepOutcome::Acknowledged {
                payload: json!({ "MDLN": "X" })
            }
        );
        assert_eq!(fx.clock.elapsed_ms(), 500);

        let entries = fx.transcript.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].direction, Direction::HostToEquipment);
        assert_eq!(entries[0].summary, "S1F1 W");
        assert_eq!(entries[1].direction, Direction::EquipmentToHost);
        assert_eq!(entries[1].severity, Severity::Success);
        assert_eq!(entries[1].timestamp_ms, 500);
    }

    #[tokio::test]
    async fn test_timeout_suspends_for_budget_only() {
        let fx = Fixture::new();
        let mut s = step(1, 13, true, Some("S1F14"));
        s.simulate_delay_ms = Some(8_000);
        s.timeout_ms = Some(2_000);

        let outcome = fx.run(&s).await;
        assert_eq!(outcome, StepOutcome::TimedOut { timeout_ms: 2_000 });
        assert_eq!(fx.clock.elapsed_ms(), 2_000);

        let entries = fx.transcript.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].direction, Direction::Error);
        assert!(entries[1].summary.contains("timeout"));
    }

    #[tokio::test]
    async fn test_no_wait_bit_never_times_out() {
        let fx = Fixture::new();
        let mut s = step(10, 3, false, None);
        s.simulate_delay_ms = Some(9_000);
        s.timeout_ms = Some(10);

        assert_eq!(fx.run(&s).await, StepOutcome::NoReplyRequired);
        assert_eq!(fx.transcript.len(), 1);
        assert_eq!(fx.clock.elapsed_ms(), 9_000);
    }

    #[tokio::test]
    async fn test_no_wait_bit_ignores_declared_response() {
        let fx = Fixture::new();
        let mut s = step(6, 11, false, Some("S1F2"));
        s.simulate_delay_ms = Some(300);

        assert_eq!(fx.run(&s).await, StepOutcome::NoReplyRequired);
        let entries = fx.transcript.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].direction, Direction::HostToEquipment);
        assert_eq!(entries[0].summary, "S6F11");
        assert_eq!(fx.clock.elapsed_ms(), 300);
    }

    #[tokio::test]
    async fn test_delay_equal_to_budget_is_not_a_timeout() {
        let fx = Fixture::new();
        let mut s = step(1, 1, true, Some("S1F2"));
        s.simulate_delay_ms = Some(2_000);
        s.timeout_ms = Some(2_000);

        assert!(matches!(fx.run(&s).await, StepOutcome::Acknowledged { .. }));
    }

    #[tokio::test]
    async fn test_missing_oracle_entry_falls_back() {
        let fx = Fixture::new();
        let outcome = fx.run(&step(5, 3, true, Some("S5F4"))).await;

        assert_eq!(
            outcome,
            StepOutcome::Acknowledged {
                payload: json!({ "ACK": 0 })
            }
        );
        let entries = fx.transcript.entries();
        assert_eq!(entries[1].severity, Severity::Warning);
        assert_eq!(entries[1].detail, json!({ "ACK": 0 }));
    }

    #[tokio::test]
    async fn test_reply_demanded_without_expected_response() {
        let fx = Fixture::new();
        let outcome = fx.run(&step(2, 41, true, None)).await;

        assert_eq!(outcome, StepOutcome::NoOracleEntry);
        let entries = fx.transcript.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].direction, Direction::Error);
    }

    #[tokio::test]
    async fn test_defaults_fill_missing_timing() {
        let fx = Fixture::new();
        fx.run(&step(1, 1, true, Some("S1F2"))).await;
        assert_eq!(fx.clock.elapsed_ms(), fx.config.default_delay_ms);
    }
}
