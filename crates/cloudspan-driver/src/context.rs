//! Execution context threaded from a connection into its handlers

use crate::error::{DriverError, Result};
use crate::waiter::{LongRunningOperation, OperationWaiter, WaitConfig};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Cancellation token plus waiter configuration for provider calls
///
/// A connection owns the root context; every handler it creates receives a
/// child, so cancelling the connection cancels all in-flight handler calls.
#[derive(Debug, Clone)]
pub struct CallContext {
    cancel: CancellationToken,
    wait: WaitConfig,
}

impl CallContext {
    pub fn new(wait: WaitConfig) -> Self {
        Self {
            cancel: CancellationToken::new(),
            wait,
        }
    }

    /// Context whose token is cancelled together with this one
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            wait: self.wait.clone(),
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn wait_config(&self) -> &WaitConfig {
        &self.wait
    }

    /// Run one provider call, resolving to `Cancelled` if the token fires first
    ///
    /// Provider errors are classified through their `Into<DriverError>` impl.
    pub async fn call<F, T, E>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: Into<DriverError>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(DriverError::Cancelled),
            result = fut => result.map_err(Into::into),
        }
    }

    /// Block until `operation` is terminal
    pub async fn wait(&self, operation: &dyn LongRunningOperation) -> Result<()> {
        OperationWaiter::new(self.wait.clone(), self.cancel.clone())
            .wait(operation)
            .await
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new(WaitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_call_passes_result_through() {
        let ctx = CallContext::default();
        let value: u32 = ctx
            .call(async { Ok::<_, DriverError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_parent_cancels_child_calls() {
        let root = CallContext::default();
        let child = root.child();
        root.token().cancel();

        let result: Result<()> = child
            .call(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok::<_, DriverError>(())
            })
            .await;
        assert!(matches!(result, Err(DriverError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancelling_child_leaves_parent_alive() {
        let root = CallContext::default();
        let child = root.child();
        child.token().cancel();
        assert!(!root.token().is_cancelled());
    }
}
