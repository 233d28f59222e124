//! ARM async operations as long-running operations

use crate::api::{ArmApi, OperationRef, OperationStatus};
use async_trait::async_trait;
use cloudspan_driver::{LongRunningOperation, OperationState, Result};
use std::sync::Arc;

pub fn operation_state(status: &OperationStatus) -> OperationState {
    match status.status.as_deref() {
        Some(s) if s.eq_ignore_ascii_case("Succeeded") => OperationState::Succeeded,
        Some(s) if s.eq_ignore_ascii_case("Failed") || s.eq_ignore_ascii_case("Canceled") => {
            let detail = status
                .error
                .as_ref()
                .map(|e| {
                    format!(
                        "{}: {}",
                        e.code.as_deref().unwrap_or(s),
                        e.message.as_deref().unwrap_or("-")
                    )
                })
                .unwrap_or_else(|| s.to_string());
            OperationState::Failed(detail)
        }
        _ => OperationState::Running,
    }
}

/// Operation followed through its status URL
pub struct AzureOperation {
    api: Arc<dyn ArmApi>,
    operation: OperationRef,
}

impl AzureOperation {
    pub fn new(api: Arc<dyn ArmApi>, operation: OperationRef) -> Self {
        Self { api, operation }
    }
}

#[async_trait]
impl LongRunningOperation for AzureOperation {
    fn describe(&self) -> String {
        // the URL ends in the operation id
        let url = self.operation.url();
        format!(
            "operation {}",
            url.split('?').next().unwrap_or(url).rsplit('/').next().unwrap_or("-")
        )
    }

    async fn poll(&self) -> Result<OperationState> {
        let status = self.api.get_operation(&self.operation).await?;
        Ok(operation_state(&status))
    }
}
