use async_trait::async_trait;
use sysinfo::System;
use tokio_util::sync::CancellationToken;
use vigil_common::types::MemoryStats;

use crate::error::ProbeError;
use crate::{Probe, ProbeSample};

/// Samples virtual memory usage in whole megabytes.
pub struct MemoryProbe;

impl MemoryProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Probe for MemoryProbe {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn sample(&self, cancel: &CancellationToken) -> Result<ProbeSample, ProbeError> {
        if cancel.is_cancelled() {
            return Err(ProbeError::Cancelled);
        }

        let mut system = System::new();
        system.refresh_memory();

        let total = system.total_memory();
        if total == 0 {
            return Err(ProbeError::Unavailable(
                "no memory information reported".to_string(),
            ));
        }
        let used = system.used_memory();

        Ok(ProbeSample::Memory(MemoryStats {
            used_mb: used / 1024 / 1024,
            total_mb: total / 1024 / 1024,
            usage_percent: (used as f64 / total as f64 * 100.0).round(),
            available_mb: system.available_memory() / 1024 / 1024,
        }))
    }
}
