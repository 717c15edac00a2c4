//! Simulated time effect handler for testing

use async_trait::async_trait;
use gemsim_core::effects::{PhysicalTime, PhysicalTimeEffects, TimeError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Virtual clock for deterministic runs
///
/// `sleep_ms` advances the clock by exactly the requested amount and yields
/// to the scheduler instead of waiting. Clones share the same clock.
#[derive(Debug, Clone)]
pub struct SimulatedTimeHandler {
    /// Clock value the handler was created with
    start_ms: u64,
    /// Current simulated time in milliseconds
    current_ms: Arc<Mutex<u64>>,
}

impl SimulatedTimeHandler {
    /// Create a new simulated time handler starting at the given time
    pub fn new(start_ms: u64) -> Self {
        Self {
            start_ms,
            current_ms: Arc::new(Mutex::new(start_ms)),
        }
    }

    /// Create a simulated time handler starting at Unix epoch
    pub fn new_at_epoch() -> Self {
        Self::new(0)
    }

    /// Move the clock forward without suspending
    pub fn advance(&self, ms: u64) {
        let mut now = self.current_ms.lock();
        *now = now.saturating_add(ms);
    }

    /// Current simulated time
    pub fn now(&self) -> u64 {
        *self.current_ms.lock()
    }

    /// Simulated time elapsed since creation
    pub fn elapsed_ms(&self) -> u64 {
        self.now() - self.start_ms
    }
}

impl Default for SimulatedTimeHandler {
    fn default() -> Self {
        Self::new_at_epoch()
    }
}

#[async_trait]
impl PhysicalTimeEffects for SimulatedTimeHandler {
    async fn physical_time(&self) -> Result<PhysicalTime, TimeError> {
        Ok(PhysicalTime { ts_ms: self.now() })
    }

    async fn sleep_ms(&self, ms: u64) -> Result<(), TimeError> {
        self.advance(ms);
        tokio::task::yield_now().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sleep_advances_exactly() {
        let clock = SimulatedTimeHandler::new(1_000);
        clock.sleep_ms(2_000).await.unwrap();
        clock.sleep_ms(500).await.unwrap();

        assert_eq!(clock.elapsed_ms(), 2_500);
        assert_eq!(clock.physical_time().await.unwrap().ts_ms, 3_500);
    }

    #[tokio::test]
    async fn test_clones_share_clock() {
        let clock = SimulatedTimeHandler::new_at_epoch();
        let other = clock.clone();
        other.advance(42);
        assert_eq!(clock.now_ms().await, 42);
    }
}
