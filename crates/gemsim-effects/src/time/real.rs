//! Production clock handler

use async_trait::async_trait;
use gemsim_core::effects::{PhysicalTime, PhysicalTimeEffects, TimeError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Real time handler for interactive runs
///
/// Stateless; delegates to the system clock and tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeHandler;

impl RealTimeHandler {
    /// Create a new real time handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PhysicalTimeEffects for RealTimeHandler {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| TimeError::OperationFailed {
                reason: e.to_string(),
            })?;
        Ok(PhysicalTime {
            ts_ms: since_epoch.as_millis() as u64,
        })
    }

    async fn sleep_ms(&self, ms: u64) -> Result<(), TimeError> {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_physical_time_is_after_epoch() {
        let handler = RealTimeHandler::new();
        let now = handler.physical_time().await.unwrap();
        assert!(now.ts_ms > 0);
    }

    #[tokio::test]
    async fn test_sleep_waits() {
        let handler = RealTimeHandler::new();
        let start = std::time::Instant::now();
        handler.sleep_ms(10).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
