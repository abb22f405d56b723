/// A single delivery attempt's failure cause.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// Connection, DNS, or timeout failure below the HTTP layer.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; the body is kept for diagnosability.
    #[error("server returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Why a snapshot could not be delivered.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The snapshot could not be encoded. A data invariant violation,
    /// never retried.
    #[error("failed to encode snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    /// The token fired before an attempt, mid-request, or during a
    /// backoff sleep.
    #[error("send cancelled")]
    Cancelled,

    /// Every allowed attempt failed.
    #[error("failed to deliver snapshot after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: AttemptError },

    /// Synthetic failure from the mock sender.
    #[error("simulated delivery failure")]
    Simulated,
}

impl SendError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SendError::Cancelled)
    }
}
