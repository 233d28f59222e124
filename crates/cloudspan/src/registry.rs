use cloudspan_driver::{DriverRegistry, WaitConfig};
use cloudspan_driver_azure::AzureDriver;
use cloudspan_driver_gcp::GcpDriver;
use cloudspan_driver_generic::GenericDriver;
use cloudspan_driver_mock::MockDriver;
use std::sync::Arc;

/// Every built-in driver, sharing one wait configuration
pub fn build(wait: WaitConfig) -> DriverRegistry {
    DriverRegistry::new()
        .with(Arc::new(GenericDriver::new().with_wait_config(wait.clone())))
        .with(Arc::new(GcpDriver::new().with_wait_config(wait.clone())))
        .with(Arc::new(AzureDriver::new().with_wait_config(wait.clone())))
        .with(Arc::new(MockDriver::new().with_wait_config(wait)))
}
