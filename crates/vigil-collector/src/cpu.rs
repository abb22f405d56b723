use std::time::Duration;

use async_trait::async_trait;
use sysinfo::System;
use tokio_util::sync::CancellationToken;
use vigil_common::types::CpuStats;

use crate::error::ProbeError;
use crate::{Probe, ProbeSample};

/// Window between the two CPU refreshes that usage is computed over.
const SAMPLE_WINDOW: Duration = Duration::from_secs(1);

/// Samples global CPU usage and system load averages.
pub struct CpuProbe;

impl CpuProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Probe for CpuProbe {
    fn name(&self) -> &'static str {
        "cpu"
    }

    async fn sample(&self, cancel: &CancellationToken) -> Result<ProbeSample, ProbeError> {
        if cancel.is_cancelled() {
            return Err(ProbeError::Cancelled);
        }

        // Usage is a delta between two refreshes. The window sleep
        // races the token so shutdown is never delayed by an
        // in-progress sample.
        let mut system = System::new();
        system.refresh_cpu_all();
        tokio::select! {
            _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
            _ = tokio::time::sleep(SAMPLE_WINDOW) => {}
        }
        system.refresh_cpu_all();

        let load = System::load_average();
        Ok(ProbeSample::Cpu(CpuStats {
            usage_percent: f64::from(system.global_cpu_usage()).round(),
            load_1: load.one,
            load_5: load.five,
            load_15: load.fifteen,
        }))
    }
}
