//! Clock effect
//!
//! Every suspension in a run (processing delay, reply timeout, settle delay)
//! goes through [`PhysicalTimeEffects::sleep_ms`], and every timestamp is read
//! from [`PhysicalTimeEffects::physical_time`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for time operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum TimeError {
    /// No clock source is available
    #[error("Time service unavailable")]
    ServiceUnavailable,
    /// The clock failed to read or suspend
    #[error("Operation failed: {reason}")]
    OperationFailed {
        /// What went wrong
        reason: String,
    },
}

/// Wall-clock reading in milliseconds since the UNIX epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhysicalTime {
    /// Milliseconds since the UNIX epoch
    pub ts_ms: u64,
}

/// Clock capability injected into the step simulator and engine
#[async_trait]
pub trait PhysicalTimeEffects: Send + Sync {
    /// Read the clock
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError>;
    /// Suspend for `ms` milliseconds of this clock's time
    async fn sleep_ms(&self, ms: u64) -> Result<(), TimeError>;

    /// Current timestamp in milliseconds, `0` if the clock is unavailable.
    async fn now_ms(&self) -> u64 {
        self.physical_time().await.map(|t| t.ts_ms).unwrap_or(0)
    }
}
