//! Snapshot delivery for the vigil agent.
//!
//! A [`Sender`] gets one snapshot to its destination per cycle. The
//! network-backed [`http::HttpSender`] retries transient failures with
//! exponential backoff; [`mock::MockSender`] stands in when no real
//! endpoint is configured.

pub mod error;
pub mod http;
pub mod mock;


use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use vigil_common::types::Snapshot;

pub use error::{AttemptError, SendError};
pub use http::{HttpSender, HttpSenderConfig};
pub use mock::{MockSender, MockSenderConfig};

/// Delivers snapshots to their destination, network-backed or local.
///
/// Which implementation runs is a configuration choice made once at
/// startup. Sends are serialized by the agent loop; `close` is called
/// once during shutdown, never during an in-flight send.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Delivers one snapshot.
    ///
    /// Delivery either fully succeeds or fully fails for the cycle;
    /// there is no partial success.
    ///
    /// # Errors
    ///
    /// [`SendError::Cancelled`] when the token fires at any suspend
    /// point; [`SendError::Exhausted`] when every allowed attempt
    /// failed.
    async fn send(&self, cancel: &CancellationToken, snapshot: &Snapshot)
        -> Result<(), SendError>;

    /// Releases any pooled resources. Idempotent.
    fn close(&self) -> Result<(), SendError>;
}
