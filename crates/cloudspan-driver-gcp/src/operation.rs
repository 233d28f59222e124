//! Compute Engine operations as long-running operations

use crate::api::{ComputeApi, Operation, OperationScope};
use async_trait::async_trait;
use cloudspan_driver::{DriverError, LongRunningOperation, OperationState, Result};
use std::sync::Arc;

/// Map one operation snapshot onto the waiter's state
pub fn operation_state(op: &Operation) -> OperationState {
    if let Some(error) = op.error.as_ref().filter(|e| !e.errors.is_empty()) {
        let detail = error
            .errors
            .iter()
            .map(|e| {
                format!(
                    "{}: {}",
                    e.code.as_deref().unwrap_or("ERROR"),
                    e.message.as_deref().unwrap_or("-")
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        return OperationState::Failed(detail);
    }
    match op.status.as_deref() {
        Some("DONE") => OperationState::Succeeded,
        _ => OperationState::Running,
    }
}

/// Operation handle polled against the zonal, regional or global endpoint
pub struct GcpOperation {
    api: Arc<dyn ComputeApi>,
    scope: OperationScope,
    name: String,
}

impl GcpOperation {
    pub fn new(api: Arc<dyn ComputeApi>, scope: OperationScope, op: &Operation) -> Result<Self> {
        let name = op
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| DriverError::TranslationError("operation has no name".to_string()))?;
        Ok(Self { api, scope, name })
    }
}

#[async_trait]
impl LongRunningOperation for GcpOperation {
    fn describe(&self) -> String {
        format!("operation {} ({})", self.name, self.scope)
    }

    async fn poll(&self) -> Result<OperationState> {
        let op = self.api.get_operation(&self.scope, &self.name).await?;
        Ok(operation_state(&op))
    }
}
