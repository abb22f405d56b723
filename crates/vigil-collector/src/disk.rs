use std::path::Path;

use async_trait::async_trait;
use sysinfo::Disks;
use tokio_util::sync::CancellationToken;
use vigil_common::types::DiskStats;

use crate::error::ProbeError;
use crate::{Probe, ProbeSample};

/// Samples root filesystem usage in whole gigabytes.
pub struct DiskProbe;

impl DiskProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Probe for DiskProbe {
    fn name(&self) -> &'static str {
        "disk"
    }

    async fn sample(&self, cancel: &CancellationToken) -> Result<ProbeSample, ProbeError> {
        if cancel.is_cancelled() {
            return Err(ProbeError::Cancelled);
        }

        let disks = Disks::new_with_refreshed_list();
        let root = disks
            .iter()
            .find(|disk| disk.mount_point() == Path::new("/"))
            .ok_or_else(|| ProbeError::Unavailable("no root filesystem entry".to_string()))?;

        let total = root.total_space();
        if total == 0 {
            return Err(ProbeError::Unavailable(
                "root filesystem reports zero capacity".to_string(),
            ));
        }
        let used = total.saturating_sub(root.available_space());

        Ok(ProbeSample::Disk(DiskStats {
            used_gb: used / 1024 / 1024 / 1024,
            total_gb: total / 1024 / 1024 / 1024,
            usage_percent: (used as f64 / total as f64 * 100.0).round(),
        }))
    }
}
