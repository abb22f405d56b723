use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use vigil_collector::Orchestrator;
use vigil_sender::Sender;

/// Lifecycle of the collection loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Timer-driven collect-then-deliver loop.
///
/// Strictly serial: one cycle fully finishes before the next tick is
/// honored, and ticks landing mid-cycle are coalesced. Probe and
/// delivery failures are absorbed at the cycle boundary; nothing
/// inside the loop terminates the process.
pub struct AgentLoop {
    agent_id: String,
    interval: Duration,
    orchestrator: Orchestrator,
    sender: Box<dyn Sender>,
    state: LoopState,
}

impl AgentLoop {
    pub fn new(
        agent_id: String,
        interval: Duration,
        orchestrator: Orchestrator,
        sender: Box<dyn Sender>,
    ) -> Self {
        Self {
            agent_id,
            interval,
            orchestrator,
            sender,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Runs until the token is cancelled, then drains the in-flight
    /// cycle and closes the transport exactly once.
    pub async fn run(&mut self, cancel: CancellationToken) {
        self.state = LoopState::Running;
        tracing::info!(
            agent_id = %self.agent_id,
            interval_secs = self.interval.as_secs(),
            "agent loop started"
        );

        // The first cycle fires immediately; telemetry should not wait
        // a full interval after startup.
        self.run_cycle(&cancel).await;

        let mut tick = interval_at(Instant::now() + self.interval, self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tick.tick() => {
                    if cancel.is_cancelled() {
                        break;
                    }
                    self.run_cycle(&cancel).await;
                }
            }
        }

        self.state = LoopState::Stopping;
        tracing::info!("agent loop stopping");
        if let Err(err) = self.sender.close() {
            tracing::warn!(error = %err, "failed to close sender");
        }
        self.state = LoopState::Stopped;
        tracing::info!("agent loop stopped");
    }

    async fn run_cycle(&self, cancel: &CancellationToken) {
        let (snapshot, collect_err) = self.orchestrator.collect(cancel, &self.agent_id).await;

        if let Some(err) = collect_err {
            if err.is_cancelled() {
                tracing::debug!("collection cancelled");
                return;
            }
            // A partial snapshot is still worth delivering.
            tracing::warn!(
                failed = err.failures().len(),
                error = %err,
                "metric collection partially failed"
            );
        }

        if cancel.is_cancelled() {
            return;
        }

        match self.sender.send(cancel, &snapshot).await {
            Ok(()) => tracing::debug!(
                collect_duration_ms = snapshot.collect_duration_ms,
                "snapshot delivered"
            ),
            Err(err) if err.is_cancelled() => tracing::debug!("delivery cancelled"),
            Err(err) => tracing::error!(error = %err, "snapshot delivery failed"),
        }
    }
}
