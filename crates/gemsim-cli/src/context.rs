//! Loading the catalog, reply table, config and clock for a command

use anyhow::{Context, Result};
use gemsim_core::effects::PhysicalTimeEffects;
use gemsim_core::{Catalog, ReplyOracle, SimulatorConfig};
use gemsim_effects::{RealTimeHandler, SimulatedTimeHandler};
use gemsim_simulator::{ScenarioEngine, Workbench};
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Everything a subcommand needs
pub struct CliContext {
    pub workbench: Workbench,
}

impl CliContext {
    pub fn load(
        config: Option<&Path>,
        catalog: &Path,
        replies: Option<&Path>,
        realtime: bool,
    ) -> Result<Self> {
        let config = match config {
            Some(path) => SimulatorConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SimulatorConfig::default(),
        };
        debug!(?config, "simulator config");

        let catalog = Catalog::from_file(catalog)
            .with_context(|| format!("loading catalog {}", catalog.display()))?;

        let oracle = match replies {
            Some(path) => {
                let document = std::fs::read_to_string(path)
                    .with_context(|| format!("reading reply table {}", path.display()))?;
                ReplyOracle::from_json(&document)
                    .with_context(|| format!("parsing reply table {}", path.display()))?
            }
            None => ReplyOracle::new(),
        };
        info!(
            scenarios = catalog.len(),
            replies = oracle.len(),
            realtime,
            "loaded catalog"
        );

        let clock: Arc<dyn PhysicalTimeEffects> = if realtime {
            Arc::new(RealTimeHandler::new())
        } else {
            Arc::new(SimulatedTimeHandler::new(wall_clock_ms()))
        };

        let engine = ScenarioEngine::new(clock, Arc::new(oracle), config);
        Ok(Self {
            workbench: Workbench::new(catalog, engine),
        })
    }
}

/// Simulated runs start at the current wall time so printed timestamps read naturally.
fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
