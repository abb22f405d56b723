use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use vigil_common::types::Snapshot;

use crate::error::SendError;
use crate::Sender;

/// Behavior knobs for [`MockSender`].
#[derive(Debug, Clone)]
pub struct MockSenderConfig {
    /// Simulated network delay.
    pub delay: Duration,
    /// 0.0 never fails, 1.0 always fails.
    pub failure_rate: f64,
    /// Log headline snapshot fields on each send.
    pub verbose: bool,
}

impl Default for MockSenderConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(100),
            failure_rate: 0.0,
            verbose: true,
        }
    }
}

/// Local sender for disconnected operation: simulates a delivery
/// delay and an optional synthetic failure rate without any network
/// traffic.
pub struct MockSender {
    config: MockSenderConfig,
}

impl MockSender {
    pub fn new(config: MockSenderConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Sender for MockSender {
    async fn send(
        &self,
        cancel: &CancellationToken,
        snapshot: &Snapshot,
    ) -> Result<(), SendError> {
        if !self.config.delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(SendError::Cancelled),
                _ = tokio::time::sleep(self.config.delay) => {}
            }
        }

        if self.config.failure_rate > 0.0
            && rand::thread_rng().gen::<f64>() < self.config.failure_rate
        {
            return Err(SendError::Simulated);
        }

        if self.config.verbose {
            tracing::info!(
                agent_id = %snapshot.agent_id,
                timestamp_ms = snapshot.timestamp_ms,
                collect_duration_ms = snapshot.collect_duration_ms,
                cpu_usage_percent = snapshot.cpu.usage_percent,
                memory_usage_percent = snapshot.memory.usage_percent,
                disk_usage_percent = snapshot.disk.usage_percent,
                "snapshot delivered (mock)"
            );
        }

        Ok(())
    }

    fn close(&self) -> Result<(), SendError> {
        Ok(())
    }
}
