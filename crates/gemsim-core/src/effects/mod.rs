//! Effect interfaces (pure signatures)
//!
//! Handlers live in `gemsim-effects`. The simulator only talks to the clock
//! and the analysis collaborator through these traits so that tests can swap
//! in deterministic implementations.

pub mod analysis;
pub mod time;

pub use analysis::{AnalysisEffects, AnalysisReport, AnalysisRequest};
pub use time::{PhysicalTime, PhysicalTimeEffects, TimeError};
