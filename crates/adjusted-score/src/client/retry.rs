//! Fixed-wait retry policy for client calls.

use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::error::{ClientError, ClientResult};

/// Decides whether an error is worth another attempt.
pub type RetryPredicate = fn(&ClientError) -> bool;

/// Retry a call up to `max_attempts` times, sleeping `wait` between attempts,
/// as long as `retryable` accepts the error.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub wait: Duration,
    pub retryable: RetryPredicate,
}

impl RetryPolicy {
    #[must_use]
    pub const fn fixed(max_attempts: u32, wait: Duration, retryable: RetryPredicate) -> Self {
        Self { max_attempts, wait, retryable }
    }

    /// Policy for DBLP rate limiting: only 429s are retried.
    #[must_use]
    pub fn rate_limit(config: &Config) -> Self {
        Self::fixed(
            config.rate_limit_attempts,
            config.rate_limit_backoff,
            ClientError::is_retryable,
        )
    }

    /// Run `operation`, retrying per this policy. The last error is returned
    /// once attempts are exhausted.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Err(e) if attempt < self.max_attempts && (self.retryable)(&e) => {
                    tracing::info!(
                        attempt,
                        max_attempts = self.max_attempts,
                        wait_secs = self.wait.as_secs(),
                        error = %e,
                        "Retrying after fixed wait"
                    );
                    tokio::time::sleep(self.wait).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }
}
