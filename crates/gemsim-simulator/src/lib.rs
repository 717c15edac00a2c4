//! Gemsim Simulator - scenario execution
//!
//! Runs catalog scenarios against a clock and reply oracle:
//!
//! - [`StepSimulator`]: one host message, the simulated latency, the reply
//! - [`ScenarioEngine`]: step sequencing, failure policy, verdicts
//! - [`Transcript`]: append-only message log shared with observers
//! - [`Workbench`]: owner of the catalog, parameter edits, history and transcript
//!
//! ```rust,ignore
//! use gemsim_effects::SimulatedTimeHandler;
//! use gemsim_simulator::{ScenarioEngine, Workbench};
//!
//! let engine = ScenarioEngine::new(Arc::new(SimulatedTimeHandler::new_at_epoch()), oracle, config);
//! let mut workbench = Workbench::new(catalog, engine);
//! let verdict = workbench.run_scenario("e30-comm").await?;
//! ```

#![forbid(unsafe_code)]

pub mod cancellation;
pub mod engine;
pub mod events;
pub mod history;
pub mod step;
pub mod transcript;
pub mod workbench;

pub use cancellation::RunCancellation;
pub use engine::{RunContext, RunProgress, ScenarioEngine};
pub use events::{EngineEvent, EventBus};
pub use history::VerdictHistory;
pub use step::{ResolvedStep, StepSimulator};
pub use transcript::{Transcript, TranscriptRecorder};
pub use workbench::Workbench;
