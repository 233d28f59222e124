//! GCP driver

use crate::api::GcpConnector;
use crate::connection::GcpConnection;
use crate::rest::RestConnector;
use async_trait::async_trait;
use cloudspan_driver::{
    CapabilityInfo, CloudConnection, CloudDriver, CredentialInfo, DriverError, RegionInfo,
    ResourceKind, Result, WaitConfig,
};
use std::sync::Arc;

pub const DRIVER_NAME: &str = "gcp";
const DRIVER_VERSION: &str = "GCP DRIVER Version 1.0";

pub fn capability() -> CapabilityInfo {
    CapabilityInfo::none()
        .with(ResourceKind::Vm, true)
        .with(ResourceKind::Image, true)
        .with(ResourceKind::PublicIp, true)
        .with(ResourceKind::VNetwork, true)
}

/// Credential shape check; no network access
pub fn validate_credential(credential: &CredentialInfo) -> Result<()> {
    if credential.auth_token().is_none() && credential.client_secret().is_none() {
        return Err(DriverError::InvalidCredential(
            "either auth_token or a service-account key in client_secret is required".to_string(),
        ));
    }
    if credential.auth_token().is_some() {
        CredentialInfo::require(credential.project_id(), "project_id")?;
    }
    Ok(())
}

pub struct GcpDriver {
    connector: Arc<dyn GcpConnector>,
    wait: WaitConfig,
}

impl GcpDriver {
    pub fn new() -> Self {
        Self::with_connector(Arc::new(RestConnector::new()))
    }

    pub fn with_connector(connector: Arc<dyn GcpConnector>) -> Self {
        Self {
            connector,
            wait: WaitConfig::default(),
        }
    }

    pub fn with_wait_config(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }
}

impl Default for GcpDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CloudDriver for GcpDriver {
    fn name(&self) -> &str {
        DRIVER_NAME
    }

    fn driver_version(&self) -> &str {
        DRIVER_VERSION
    }

    fn capability(&self) -> CapabilityInfo {
        capability()
    }

    async fn connect_cloud(
        &self,
        credential: CredentialInfo,
        region: RegionInfo,
    ) -> Result<Box<dyn CloudConnection>> {
        validate_credential(&credential)?;
        region.require_region()?;
        let zone = region.require_zone()?.to_string();

        let session = self.connector.connect(&credential, &region).await?;
        tracing::info!(
            "Connected to GCP project {} ({})",
            session.project_id,
            zone
        );

        Ok(Box::new(GcpConnection::new(
            session,
            capability(),
            region,
            zone,
            self.wait.clone(),
        )))
    }
}
