use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use vigil_common::types::Snapshot;

use crate::error::{AttemptError, SendError};
use crate::Sender;

const USER_AGENT: &str = concat!("vigil-agent/", env!("CARGO_PKG_VERSION"));

/// Retry and timeout tunables for [`HttpSender`].
#[derive(Debug, Clone)]
pub struct HttpSenderConfig {
    /// Retries after the first attempt; 3 means up to 4 requests.
    pub max_retries: u32,
    /// First backoff delay, doubled on each retry.
    pub initial_retry_delay: Duration,
    /// Cap on the doubled delay.
    pub max_retry_delay: Duration,
    /// Deadline for one request attempt.
    pub request_timeout: Duration,
    /// Overall client deadline, connection establishment included.
    pub client_timeout: Duration,
}

impl Default for HttpSenderConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_retry_delay: Duration::from_secs(1),
            max_retry_delay: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            client_timeout: Duration::from_secs(30),
        }
    }
}

/// Network-backed sender: serialize once, then POST with bounded
/// exponential-backoff retry.
pub struct HttpSender {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    config: HttpSenderConfig,
}

impl HttpSender {
    /// Builds a sender with a pooled HTTP client, ready for use.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Client`] if the client cannot be
    /// constructed.
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        config: HttpSenderConfig,
    ) -> Result<Self, SendError> {
        let client = reqwest::Client::builder()
            .timeout(config.client_timeout)
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(60))
            .user_agent(USER_AGENT)
            .build()
            .map_err(SendError::Client)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
            config,
        })
    }

    async fn send_with_retry(
        &self,
        cancel: &CancellationToken,
        payload: Vec<u8>,
    ) -> Result<(), SendError> {
        let mut delay = self.config.initial_retry_delay;
        let mut attempt = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(SendError::Cancelled);
            }

            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(SendError::Cancelled),
                outcome = self.execute_request(payload.clone()) => outcome,
            };

            let err = match outcome {
                Ok(()) => {
                    if attempt > 0 {
                        tracing::info!(attempts = attempt + 1, "snapshot delivered after retries");
                    }
                    return Ok(());
                }
                Err(err) => err,
            };

            if attempt >= self.config.max_retries {
                tracing::error!(
                    attempts = attempt + 1,
                    error = %err,
                    "snapshot delivery failed, retries exhausted"
                );
                return Err(SendError::Exhausted {
                    attempts: attempt + 1,
                    last: err,
                });
            }

            tracing::warn!(
                attempt = attempt + 1,
                max_retries = self.config.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "send attempt failed, retrying"
            );
            tokio::select! {
                _ = cancel.cancelled() => return Err(SendError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
            delay = (delay * 2).min(self.config.max_retry_delay);
            attempt += 1;
        }
    }

    /// One POST attempt, bounded by the per-request timeout.
    async fn execute_request(&self, payload: Vec<u8>) -> Result<(), AttemptError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.config.request_timeout)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.token)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            // Drain the body so the pooled connection can be reused.
            let _ = response.bytes().await;
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(AttemptError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Sender for HttpSender {
    async fn send(
        &self,
        cancel: &CancellationToken,
        snapshot: &Snapshot,
    ) -> Result<(), SendError> {
        // Encoding failure aborts before the first attempt; it is a
        // data invariant violation, not a transient fault.
        let payload = serde_json::to_vec(snapshot)?;
        self.send_with_retry(cancel, payload).await
    }

    fn close(&self) -> Result<(), SendError> {
        // Pooled connections are torn down when the client drops.
        Ok(())
    }
}
