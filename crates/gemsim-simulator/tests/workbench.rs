//! Workbench behavior over the bundled fixture catalog

use async_trait::async_trait;
use gemsim_core::effects::{AnalysisEffects, AnalysisReport, AnalysisRequest};
use gemsim_core::{Catalog, Direction, ReplyOracle, SimError, SimulatorConfig};
use gemsim_effects::{SimulatedTimeHandler, TranscriptDigestHandler};
use gemsim_simulator::{ScenarioEngine, Workbench};
use serde_json::json;
use std::sync::Arc;

const CATALOG: &str = include_str!("../../../fixtures/catalog.json");
const REPLIES: &str = include_str!("../../../fixtures/replies.json");

fn workbench() -> Workbench {
    let engine = ScenarioEngine::new(
        Arc::new(SimulatedTimeHandler::new_at_epoch()),
        Arc::new(ReplyOracle::from_json(REPLIES).unwrap()),
        SimulatorConfig::default(),
    );
    Workbench::new(Catalog::from_json(CATALOG).unwrap(), engine)
}

struct UnreachableAnalyst;

#[async_trait]
impl AnalysisEffects for UnreachableAnalyst {
    async fn analyze(&self, _request: &AnalysisRequest) -> gemsim_core::Result<AnalysisReport> {
        Err(SimError::collaborator("connection refused"))
    }
}

#[test]
fn parameters_start_at_declared_defaults() {
    let bench = workbench();
    let values = bench.parameter_values("e30-ec-change").unwrap();

    assert_eq!(values.get("NEWVAL").map(String::as_str), Some("100"));
    assert!(bench.validation_errors("e30-ec-change").unwrap().is_empty());
}

#[tokio::test]
async fn out_of_range_value_blocks_run() {
    let mut bench = workbench();

    let errors = bench.set_parameter("e30-ec-change", "NEWVAL", "-1").unwrap();
    assert_eq!(
        errors.get("NEWVAL").map(String::as_str),
        Some("Must be at least 0")
    );

    let err = bench.run_scenario("e30-ec-change").await.unwrap_err();
    match err {
        SimError::Validation { errors } => assert!(errors.contains_key("NEWVAL")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(bench.transcript().is_empty());
    assert!(bench.history().is_empty());
}

#[tokio::test]
async fn valid_value_is_substituted_verbatim() {
    let mut bench = workbench();
    bench.set_parameter("e30-ec-change", "NEWVAL", "-1").unwrap();
    assert!(bench
        .reset_parameters("e30-ec-change")
        .unwrap()
        .is_empty());

    let verdict = bench.run_scenario("e30-ec-change").await.unwrap();
    assert!(verdict.passed);

    let sent = &bench.transcript()[0];
    assert_eq!(sent.direction, Direction::HostToEquipment);
    assert_eq!(sent.detail, json!([{ "ECID": "1001", "ECV": "100" }]));
}

#[test]
fn unknown_parameter_is_not_found() {
    let mut bench = workbench();
    let err = bench
        .set_parameter("e30-ec-change", "NOPE", "1")
        .unwrap_err();
    assert!(matches!(err, SimError::NotFound { .. }));
}

#[tokio::test]
async fn run_all_records_history_newest_first() {
    let mut bench = workbench();
    let results = bench.run_all().await;

    let ids: Vec<_> = results.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "e30-comm",
            "e30-ec-change",
            "e30-remote-cmd",
            "e30-t3-timeout",
            "e5-alarm-enable"
        ]
    );

    let history = bench.history();
    assert_eq!(history.len(), 5);
    let latest = history.latest().unwrap();
    assert_eq!(latest.scenario_id, "e5-alarm-enable");
    assert!(latest.passed);

    let timeout = history
        .iter()
        .find(|v| v.scenario_id == "e30-t3-timeout")
        .unwrap();
    assert!(!timeout.passed);

    bench.clear_history();
    assert!(bench.history().is_empty());
    assert!(!bench.transcript().is_empty());
    bench.clear_transcript();
    assert!(bench.transcript().is_empty());
}

#[test]
fn failed_import_keeps_catalog_and_edits() {
    let mut bench = workbench();
    bench.set_parameter("e30-remote-cmd", "PPID", "RECIPE-B").unwrap();

    let err = bench.import_catalog(r#"{ "not": "an array" }"#).unwrap_err();
    assert!(matches!(err, SimError::CatalogImport { .. }));
    assert_eq!(bench.scenarios().len(), 5);
    assert_eq!(
        bench
            .parameter_values("e30-remote-cmd")
            .unwrap()
            .get("PPID")
            .map(String::as_str),
        Some("RECIPE-B")
    );
}

#[test]
fn export_then_import_restores_defaults() {
    let mut bench = workbench();
    bench.set_parameter("e30-remote-cmd", "RCMD", "STOP").unwrap();

    let exported = bench.export_catalog().unwrap();
    assert_eq!(bench.import_catalog(&exported).unwrap(), 5);
    assert_eq!(
        bench
            .parameter_values("e30-remote-cmd")
            .unwrap()
            .get("RCMD")
            .map(String::as_str),
        Some("START")
    );
}

#[tokio::test]
async fn analysis_failure_degrades_to_fallback() {
    let mut bench = workbench();
    bench.run_scenario("e30-comm").await.unwrap();

    let report = bench.analyze(&UnreachableAnalyst).await;
    assert_eq!(report, AnalysisReport::fallback());
}

#[tokio::test]
async fn digest_analysis_reports_timeouts() {
    let mut bench = workbench();
    bench.run_scenario("e30-t3-timeout").await.unwrap();

    let report = bench.analyze(&TranscriptDigestHandler::new()).await;
    assert!(report.summary.contains("1 failed"));
    assert!(!report.anomalies.is_empty());
}
