//! Gemsim effect handlers
//!
//! Implementations of the effect traits declared in `gemsim-core`:
//!
//! - [`RealTimeHandler`]: wall clock and tokio timers
//! - [`SimulatedTimeHandler`]: virtual clock that jumps forward on every sleep
//! - [`TranscriptDigestHandler`]: offline analysis built from transcript counts

#![forbid(unsafe_code)]

pub mod analysis;
pub mod time;

pub use analysis::TranscriptDigestHandler;
pub use time::{RealTimeHandler, SimulatedTimeHandler};
