use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use vigil_common::types::{CpuStats, DiskStats, MemoryStats};

use crate::error::ProbeError;
use crate::orchestrator::Orchestrator;
use crate::{Probe, ProbeSample};

/// Scripted probe: sleeps for `delay` (honoring the token), then
/// returns its sample or fails with a simulated sensor fault.
struct FakeProbe {
    name: &'static str,
    delay: Duration,
    sample: Option<ProbeSample>,
}

#[async_trait]
impl Probe for FakeProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn sample(&self, cancel: &CancellationToken) -> Result<ProbeSample, ProbeError> {
        if cancel.is_cancelled() {
            return Err(ProbeError::Cancelled);
        }
        if !self.delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
        match self.sample {
            Some(sample) => Ok(sample),
            None => Err(ProbeError::Unavailable(
                "simulated sensor fault".to_string(),
            )),
        }
    }
}

fn probe(name: &'static str, delay_ms: u64, sample: Option<ProbeSample>) -> Arc<dyn Probe> {
    Arc::new(FakeProbe {
        name,
        delay: Duration::from_millis(delay_ms),
        sample,
    })
}

fn cpu_sample() -> ProbeSample {
    ProbeSample::Cpu(CpuStats {
        usage_percent: 42.0,
        load_1: 0.5,
        load_5: 0.4,
        load_15: 0.3,
    })
}

fn memory_sample() -> ProbeSample {
    ProbeSample::Memory(MemoryStats {
        used_mb: 1024,
        total_mb: 4096,
        usage_percent: 25.0,
        available_mb: 3072,
    })
}

fn disk_sample() -> ProbeSample {
    ProbeSample::Disk(DiskStats {
        used_gb: 10,
        total_gb: 100,
        usage_percent: 10.0,
    })
}

#[tokio::test]
async fn all_probes_succeeding_yields_no_error() {
    let orchestrator = Orchestrator::with_probes(vec![
        probe("cpu", 0, Some(cpu_sample())),
        probe("memory", 0, Some(memory_sample())),
        probe("disk", 0, Some(disk_sample())),
    ]);

    let cancel = CancellationToken::new();
    let (snapshot, err) = orchestrator.collect(&cancel, "web-01").await;

    assert!(err.is_none());
    assert_eq!(snapshot.agent_id, "web-01");
    assert!(snapshot.timestamp_ms > 0);
    assert!(snapshot.collect_duration_ms >= 0);
    assert_eq!(snapshot.cpu.usage_percent, 42.0);
    assert_eq!(snapshot.memory.total_mb, 4096);
    assert_eq!(snapshot.disk.total_gb, 100);
}

#[tokio::test]
async fn failing_probe_keeps_siblings_and_reports_its_name() {
    let orchestrator = Orchestrator::with_probes(vec![
        probe("cpu", 0, None),
        probe("memory", 0, Some(memory_sample())),
        probe("disk", 0, Some(disk_sample())),
    ]);

    let cancel = CancellationToken::new();
    let (snapshot, err) = orchestrator.collect(&cancel, "web-01").await;

    assert_eq!(snapshot.cpu, CpuStats::default());
    assert_eq!(snapshot.memory.used_mb, 1024);
    assert_eq!(snapshot.disk.used_gb, 10);

    let err = err.expect("aggregate error expected");
    assert_eq!(err.failures().len(), 1);
    let message = err.to_string();
    assert!(message.contains("cpu"));
    assert!(!message.contains("memory"));
    assert!(!message.contains("disk"));
}

#[tokio::test]
async fn every_failing_probe_is_mentioned_exactly_once() {
    let orchestrator = Orchestrator::with_probes(vec![
        probe("cpu", 0, None),
        probe("memory", 0, None),
        probe("disk", 0, Some(disk_sample())),
    ]);

    let cancel = CancellationToken::new();
    let (_, err) = orchestrator.collect(&cancel, "web-01").await;

    let message = err.expect("aggregate error expected").to_string();
    assert_eq!(message.matches("cpu").count(), 1);
    assert_eq!(message.matches("memory").count(), 1);
    assert!(!message.contains("disk"));
}

#[tokio::test]
async fn duration_covers_the_slowest_probe() {
    let orchestrator = Orchestrator::with_probes(vec![
        probe("cpu", 10, Some(cpu_sample())),
        probe("memory", 80, Some(memory_sample())),
        probe("disk", 0, Some(disk_sample())),
    ]);

    let cancel = CancellationToken::new();
    let (snapshot, err) = orchestrator.collect(&cancel, "web-01").await;

    assert!(err.is_none());
    assert!(snapshot.collect_duration_ms >= 80);
}

#[tokio::test]
async fn cancellation_aborts_a_slow_probe_promptly() {
    let orchestrator = Orchestrator::with_probes(vec![probe("cpu", 5_000, Some(cpu_sample()))]);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        });
    }

    let start = Instant::now();
    let (_, err) = orchestrator.collect(&cancel, "web-01").await;

    assert!(start.elapsed() < Duration::from_secs(1));
    let err = err.expect("cancellation failure expected");
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn pre_cancelled_token_fails_every_probe() {
    let orchestrator = Orchestrator::with_probes(vec![
        probe("cpu", 0, Some(cpu_sample())),
        probe("memory", 0, Some(memory_sample())),
    ]);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let (snapshot, err) = orchestrator.collect(&cancel, "web-01").await;

    assert_eq!(snapshot.cpu, CpuStats::default());
    assert_eq!(snapshot.memory, MemoryStats::default());
    let err = err.expect("cancellation failure expected");
    assert!(err.is_cancelled());
    assert_eq!(err.failures().len(), 2);
}

#[tokio::test]
async fn mixed_cancellation_and_fault_is_not_reported_as_cancelled() {
    let orchestrator = Orchestrator::with_probes(vec![
        probe("cpu", 0, None),
        probe("memory", 200, Some(memory_sample())),
    ]);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });
    }

    let (_, err) = orchestrator.collect(&cancel, "web-01").await;
    let err = err.expect("aggregate error expected");
    assert!(!err.is_cancelled());
    assert_eq!(err.failures().len(), 2);
}
