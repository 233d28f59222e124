//! Mock driver

use crate::connection::MockConnection;
use crate::store::MockCloud;
use async_trait::async_trait;
use cloudspan_driver::{
    CapabilityInfo, CloudConnection, CloudDriver, CredentialInfo, DriverError, RegionInfo, Result,
    WaitConfig,
};
use std::sync::Arc;

pub const DRIVER_NAME: &str = "mock";
const DRIVER_VERSION: &str = "MOCK DRIVER Version 1.0";

/// Test driver backed by an in-memory store
pub struct MockDriver {
    name: String,
    capability: CapabilityInfo,
    expected_token: Option<String>,
    cloud: Arc<MockCloud>,
    wait: WaitConfig,
}

impl MockDriver {
    /// Driver declaring every handler, accepting any credential
    pub fn new() -> Self {
        Self {
            name: DRIVER_NAME.to_string(),
            capability: CapabilityInfo::all(),
            expected_token: None,
            cloud: Arc::new(MockCloud::new()),
            wait: WaitConfig::default(),
        }
    }

    /// Register under a different name (several stubs side by side)
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_capability(mut self, capability: CapabilityInfo) -> Self {
        self.capability = capability;
        self
    }

    /// Require `auth_token` in the credential and reject any other value
    pub fn requiring_token(mut self, token: impl Into<String>) -> Self {
        self.expected_token = Some(token.into());
        self
    }

    pub fn with_wait_config(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// The store shared by every connection of this driver
    pub fn cloud(&self) -> Arc<MockCloud> {
        self.cloud.clone()
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CloudDriver for MockDriver {
    fn name(&self) -> &str {
        &self.name
    }

    fn driver_version(&self) -> &str {
        DRIVER_VERSION
    }

    fn capability(&self) -> CapabilityInfo {
        self.capability
    }

    async fn connect_cloud(
        &self,
        credential: CredentialInfo,
        region: RegionInfo,
    ) -> Result<Box<dyn CloudConnection>> {
        region.require_region()?;

        if let Some(expected) = &self.expected_token {
            let token = CredentialInfo::require(credential.auth_token(), "auth_token")?;
            if token != expected {
                return Err(DriverError::connection_failed(
                    self.name.clone(),
                    "token rejected by mock provider",
                ));
            }
        }

        tracing::debug!("Connected to {} in {}", self.name, region.region());
        Ok(Box::new(MockConnection::new(
            self.cloud.clone(),
            self.capability,
            credential,
            region,
            self.wait.clone(),
        )))
    }
}
