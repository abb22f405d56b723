use std::fmt;

/// Why a single probe produced no reading.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The cancellation token fired before or during the reading.
    #[error("collection cancelled")]
    Cancelled,

    /// The underlying system reading could not be obtained.
    #[error("{0}")]
    Unavailable(String),
}

impl ProbeError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProbeError::Cancelled)
    }
}

/// A named probe failure from one collection cycle.
#[derive(Debug, thiserror::Error)]
#[error("{probe}: {source}")]
pub struct ProbeFailure {
    pub probe: &'static str,
    #[source]
    pub source: ProbeError,
}

/// Aggregate of every probe failure from one cycle.
///
/// Never blocks snapshot delivery; the loop surfaces it for
/// observability only. Each failing probe appears exactly once.
#[derive(Debug)]
pub struct CollectError {
    failures: Vec<ProbeFailure>,
}

impl CollectError {
    pub(crate) fn new(failures: Vec<ProbeFailure>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[ProbeFailure] {
        &self.failures
    }

    /// True when every failure is a cancellation, i.e. the cycle was
    /// cut short by shutdown rather than by broken sensors.
    pub fn is_cancelled(&self) -> bool {
        self.failures.iter().all(|f| f.source.is_cancelled())
    }
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} probe(s) failed: ", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CollectError {}
