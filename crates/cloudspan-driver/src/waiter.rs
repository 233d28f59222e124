//! Long-running operation waiter
//!
//! Some providers answer a mutating call with an operation handle instead of
//! the finished resource. The waiter polls such a handle until it reaches a
//! terminal state, the configured timeout elapses, or the call is cancelled.
//! It never cancels the provider-side operation.

use crate::error::{DriverError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

/// Polling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Time between two status checks (milliseconds)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Maximum total wait (milliseconds)
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_poll_interval() -> u64 {
    2000 // 2s
}
fn default_timeout() -> u64 {
    600_000 // 10 min
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            timeout_ms: default_timeout(),
        }
    }
}

impl WaitConfig {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval_ms: poll_interval.as_millis() as u64,
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// State reported by one poll of an operation handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState {
    Running,
    Succeeded,
    Failed(String),
}

/// Provider operation handle that can be polled
#[async_trait]
pub trait LongRunningOperation: Send + Sync {
    /// Short description used in logs and error messages
    fn describe(&self) -> String;

    /// Ask the provider for the current state of the operation
    async fn poll(&self) -> Result<OperationState>;
}

/// Blocks until an operation handle is terminal
#[derive(Debug, Clone)]
pub struct OperationWaiter {
    config: WaitConfig,
    cancel: CancellationToken,
}

impl OperationWaiter {
    pub fn new(config: WaitConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    pub fn config(&self) -> &WaitConfig {
        &self.config
    }

    /// Poll `operation` until it succeeds or fails
    ///
    /// # Returns
    /// * `Ok(())` - provider reported success
    /// * `Err(OperationFailed)` - provider reported failure
    /// * `Err(OperationTimeout)` - still running once the timeout elapsed
    /// * `Err(Cancelled)` - the token fired while waiting
    pub async fn wait(&self, operation: &dyn LongRunningOperation) -> Result<()> {
        let timeout = self.config.timeout();
        let interval = self.config.poll_interval();
        let deadline = Instant::now() + timeout;
        let mut attempt: u32 = 0;

        tracing::debug!(
            "Waiting for {} (interval: {:?}, timeout: {:?})",
            operation.describe(),
            interval,
            timeout
        );

        loop {
            if self.cancel.is_cancelled() {
                return Err(DriverError::Cancelled);
            }

            let state = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::warn!("Stopped waiting for {}: cancelled", operation.describe());
                    return Err(DriverError::Cancelled);
                }
                state = operation.poll() => state?,
            };
            attempt += 1;

            match state {
                OperationState::Succeeded => {
                    tracing::debug!("{} finished after {} polls", operation.describe(), attempt);
                    return Ok(());
                }
                OperationState::Failed(detail) => {
                    return Err(DriverError::OperationFailed(format!(
                        "{}: {}",
                        operation.describe(),
                        detail
                    )));
                }
                OperationState::Running => {}
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(
                    "Gave up waiting for {} after {:?}; the operation keeps running on the provider",
                    operation.describe(),
                    timeout
                );
                return Err(DriverError::OperationTimeout(timeout));
            }

            let nap = interval.min(deadline - now);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::warn!("Stopped waiting for {}: cancelled", operation.describe());
                    return Err(DriverError::Cancelled);
                }
                _ = sleep(nap) => {}
            }
        }
    }
}
