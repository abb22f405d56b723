use serde::{Deserialize, Serialize};

/// One timestamped set of resource readings produced by a single
/// collection cycle.
///
/// A snapshot is mutable only while the orchestrator is filling it in;
/// once handed to a sender it is read-only for the duration of that
/// send, retries included. Blocks belonging to probes that failed keep
/// their zero value; a partial snapshot is still deliverable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub agent_id: String,
    /// Milliseconds since epoch, stamped once at cycle start.
    pub timestamp_ms: i64,
    /// Wall-clock span of the concurrent probe run.
    pub collect_duration_ms: i64,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub disk: DiskStats,
}

/// CPU usage and load averages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuStats {
    /// Global usage percent, rounded to the nearest integer value.
    pub usage_percent: f64,
    pub load_1: f64,
    pub load_5: f64,
    pub load_15: f64,
}

/// Memory usage in whole megabytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub used_mb: u64,
    pub total_mb: u64,
    /// Rounded to the nearest integer value.
    pub usage_percent: f64,
    pub available_mb: u64,
}

/// Root filesystem usage in whole gigabytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskStats {
    pub used_gb: u64,
    pub total_gb: u64,
    /// Rounded to the nearest integer value.
    pub usage_percent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        Snapshot {
            agent_id: "web-01".to_string(),
            timestamp_ms: 1_700_000_000_123,
            collect_duration_ms: 42,
            cpu: CpuStats {
                usage_percent: 37.0,
                load_1: 0.52,
                load_5: 0.61,
                load_15: 0.7,
            },
            memory: MemoryStats {
                used_mb: 2048,
                total_mb: 16384,
                usage_percent: 13.0,
                available_mb: 14336,
            },
            disk: DiskStats {
                used_gb: 120,
                total_gb: 512,
                usage_percent: 23.0,
            },
        }
    }

    #[test]
    fn snapshot_round_trip_is_lossless() {
        let snapshot = sample();
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn snapshot_wire_keys_match_schema() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["agent_id"], "web-01");
        assert_eq!(value["timestamp_ms"], 1_700_000_000_123i64);
        assert_eq!(value["collect_duration_ms"], 42);
        assert_eq!(value["cpu"]["usage_percent"], 37.0);
        assert_eq!(value["cpu"]["load_1"], 0.52);
        assert_eq!(value["cpu"]["load_5"], 0.61);
        assert_eq!(value["cpu"]["load_15"], 0.7);
        assert_eq!(value["memory"]["used_mb"], 2048);
        assert_eq!(value["memory"]["total_mb"], 16384);
        assert_eq!(value["memory"]["usage_percent"], 13.0);
        assert_eq!(value["memory"]["available_mb"], 14336);
        assert_eq!(value["disk"]["used_gb"], 120);
        assert_eq!(value["disk"]["total_gb"], 512);
        assert_eq!(value["disk"]["usage_percent"], 23.0);
    }

    #[test]
    fn default_snapshot_has_zeroed_blocks() {
        let snapshot = Snapshot::default();
        assert_eq!(snapshot.cpu, CpuStats::default());
        assert_eq!(snapshot.memory.total_mb, 0);
        assert_eq!(snapshot.disk.usage_percent, 0.0);
    }
}
