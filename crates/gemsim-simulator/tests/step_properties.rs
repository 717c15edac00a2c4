//! Property tests for reply-timeout classification

use gemsim_core::{ReplyOracle, Scenario, SimulatorConfig};
use gemsim_effects::SimulatedTimeHandler;
use gemsim_simulator::{ScenarioEngine, Transcript};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn single_step(wait_bit: bool, delay_ms: u64, timeout_ms: u64) -> Scenario {
    serde_json::from_value(json!({
        "id": "prop",
        "title": "Single exchange",
        "standard": "E30",
        "steps": [{
            "name": "only",
            "message": { "stream": 1, "function": 1, "wait_bit": wait_bit, "body": [] },
            "expected_response": "S1F2",
            "simulate_delay_ms": delay_ms,
            "timeout_ms": timeout_ms
        }]
    }))
    .unwrap()
}

proptest! {
    #[test]
    fn timeout_iff_wait_bit_and_delay_exceeds_budget(
        wait_bit in any::<bool>(),
        delay_ms in 0u64..20_000,
        timeout_ms in 1u64..20_000,
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let clock = SimulatedTimeHandler::new_at_epoch();
        let engine = ScenarioEngine::new(
            Arc::new(clock.clone()),
            Arc::new(ReplyOracle::new().with_reply("S1F2", json!({ "MDLN": "X" }))),
            SimulatorConfig::default(),
        );
        let transcript = Transcript::new();
        let scenario = single_step(wait_bit, delay_ms, timeout_ms);

        let verdict = runtime
            .block_on(engine.run(&scenario, &Default::default(), &transcript))
            .unwrap();

        let expect_timeout = wait_bit && delay_ms > timeout_ms;
        prop_assert_eq!(verdict.passed, !expect_timeout);
        let expected_entries = if wait_bit { 2 } else { 1 };
        prop_assert_eq!(transcript.len(), expected_entries);
        let waited = if expect_timeout { timeout_ms } else { delay_ms };
        prop_assert_eq!(clock.elapsed_ms(), waited);
    }
}
