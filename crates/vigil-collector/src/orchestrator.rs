use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use vigil_common::types::Snapshot;

use crate::cpu::CpuProbe;
use crate::disk::DiskProbe;
use crate::error::{CollectError, ProbeError, ProbeFailure};
use crate::memory::MemoryProbe;
use crate::{Probe, ProbeSample};

/// Runs the registered probes concurrently against one fresh snapshot
/// per cycle.
///
/// Fan-out keeps total latency bounded by the slowest probe rather
/// than the sum; a failing sensor must not blank out otherwise-healthy
/// readings, so siblings are never aborted early and partial results
/// are merged.
pub struct Orchestrator {
    probes: Vec<Arc<dyn Probe>>,
}

impl Orchestrator {
    /// Creates an orchestrator with the default probe set (CPU,
    /// memory, disk).
    pub fn new() -> Self {
        let probes: Vec<Arc<dyn Probe>> = vec![
            Arc::new(CpuProbe::new()),
            Arc::new(MemoryProbe::new()),
            Arc::new(DiskProbe::new()),
        ];
        Self::with_probes(probes)
    }

    pub fn with_probes(probes: Vec<Arc<dyn Probe>>) -> Self {
        Self { probes }
    }

    /// Runs every probe to completion and returns the merged snapshot.
    ///
    /// The snapshot is returned unconditionally, even if every probe
    /// failed; the error is `Some` only if at least one probe failed
    /// and wraps every individual failure. `collect_duration_ms` spans
    /// the whole fan-out, entry to last join.
    pub async fn collect(
        &self,
        cancel: &CancellationToken,
        agent_id: &str,
    ) -> (Snapshot, Option<CollectError>) {
        let start = Instant::now();
        let mut snapshot = Snapshot {
            agent_id: agent_id.to_string(),
            timestamp_ms: Utc::now().timestamp_millis(),
            ..Snapshot::default()
        };

        let mut handles = Vec::with_capacity(self.probes.len());
        for probe in &self.probes {
            let probe = Arc::clone(probe);
            let cancel = cancel.clone();
            let name = probe.name();
            handles.push((
                name,
                tokio::spawn(async move { probe.sample(&cancel).await }),
            ));
        }

        let mut failures = Vec::new();
        for (name, handle) in handles {
            match handle.await {
                Ok(Ok(sample)) => install(&mut snapshot, sample),
                Ok(Err(err)) => {
                    if !err.is_cancelled() {
                        tracing::warn!(probe = name, error = %err, "metric collection failed");
                    }
                    failures.push(ProbeFailure {
                        probe: name,
                        source: err,
                    });
                }
                Err(err) => {
                    tracing::warn!(probe = name, error = %err, "probe task panicked");
                    failures.push(ProbeFailure {
                        probe: name,
                        source: ProbeError::Unavailable(format!("probe task failed: {err}")),
                    });
                }
            }
        }

        snapshot.collect_duration_ms = start.elapsed().as_millis() as i64;

        if failures.is_empty() {
            (snapshot, None)
        } else {
            (snapshot, Some(CollectError::new(failures)))
        }
    }
}

fn install(snapshot: &mut Snapshot, sample: ProbeSample) {
    match sample {
        ProbeSample::Cpu(cpu) => snapshot.cpu = cpu,
        ProbeSample::Memory(memory) => snapshot.memory = memory,
        ProbeSample::Disk(disk) => snapshot.disk = disk,
    }
}
