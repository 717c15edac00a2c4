//! Gemsim Core - data model and pure components
//!
//! Everything a scenario run needs that does not depend on a runtime:
//!
//! - `scenario`: scenarios, steps, message templates, parameter declarations
//! - `records`: transcript entries, step outcomes, verdicts
//! - `validation` / `resolver`: parameter checks and `{{KEY}}` substitution
//! - `oracle`: canned equipment replies
//! - `catalog`: all-or-nothing catalog import and export
//! - `effects`: clock and analysis interfaces (handlers live in `gemsim-effects`)

#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod effects;
pub mod errors;
pub mod oracle;
pub mod records;
pub mod resolver;
pub mod scenario;
pub mod validation;

pub use catalog::Catalog;
pub use config::SimulatorConfig;
pub use errors::{Result, SimError};
pub use oracle::ReplyOracle;
pub use records::{Direction, LogEntry, Severity, StepOutcome, Verdict};
pub use resolver::{resolve, ResolveError};
pub use scenario::{MessageLabel, MessageTemplate, ParameterDeclaration, ParameterKind, Scenario, Step};
pub use validation::{ParameterValues, ValidationErrors};
