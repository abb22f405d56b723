//! Metric probes and the collection orchestrator for the vigil agent.
//!
//! Each [`Probe`] implementation reads one category of system
//! resources (CPU, memory, disk) and returns its block of a
//! [`vigil_common::types::Snapshot`]. The [`Orchestrator`] fans the
//! registered probes out concurrently and merges partial results when
//! some of them fail.

pub mod cpu;
pub mod disk;
pub mod error;
pub mod memory;
pub mod orchestrator;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use vigil_common::types::{CpuStats, DiskStats, MemoryStats};

pub use error::{CollectError, ProbeError, ProbeFailure};
pub use orchestrator::Orchestrator;

/// One probe's portion of a snapshot.
///
/// Probes own disjoint field blocks, so a completed sample is
/// installed into the snapshot without any locking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeSample {
    Cpu(CpuStats),
    Memory(MemoryStats),
    Disk(DiskStats),
}

/// A system resource probe run by the orchestrator each cycle.
///
/// Implementations check the token before doing any work, and any
/// longer sampling window must stay cancellable so a shutdown signal
/// is not held up by an in-progress reading.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Returns the probe name (e.g. `"cpu"`), used for logging and
    /// failure reports.
    fn name(&self) -> &'static str;

    /// Reads this probe's resource category.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Cancelled`] if the token fired, or
    /// [`ProbeError::Unavailable`] if the underlying system reading
    /// could not be obtained.
    async fn sample(&self, cancel: &CancellationToken) -> Result<ProbeSample, ProbeError>;
}
