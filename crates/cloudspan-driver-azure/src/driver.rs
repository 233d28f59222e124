//! Azure driver

use crate::api::AzureConnector;
use crate::connection::AzureConnection;
use crate::rest::RestConnector;
use async_trait::async_trait;
use cloudspan_driver::{
    CapabilityInfo, CloudConnection, CloudDriver, CredentialInfo, RegionInfo, ResourceKind,
    Result, WaitConfig,
};
use std::sync::Arc;

pub const DRIVER_NAME: &str = "azure";
const DRIVER_VERSION: &str = "AZURE DRIVER Version 1.0";

pub fn capability() -> CapabilityInfo {
    CapabilityInfo::all().with(ResourceKind::KeyPair, false)
}

/// Credential shape check; no network access
pub fn validate_credential(credential: &CredentialInfo) -> Result<()> {
    CredentialInfo::require(credential.subscription_id(), "subscription_id")?;
    if credential.auth_token().is_none() {
        CredentialInfo::require(credential.tenant_id(), "tenant_id")?;
        CredentialInfo::require(credential.client_id(), "client_id")?;
        CredentialInfo::require(credential.client_secret(), "client_secret")?;
    }
    Ok(())
}

pub struct AzureDriver {
    connector: Arc<dyn AzureConnector>,
    wait: WaitConfig,
}

impl AzureDriver {
    pub fn new() -> Self {
        Self::with_connector(Arc::new(RestConnector::new()))
    }

    pub fn with_connector(connector: Arc<dyn AzureConnector>) -> Self {
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

impl Default for AzureDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CloudDriver for AzureDriver {
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
        let group = region.require_resource_group()?.to_string();

        let session = self.connector.connect(&credential, &region).await?;
        tracing::info!(
            "Connected to Azure subscription {} ({}/{})",
            session.subscription_id,
            region.region(),
            group
        );

        Ok(Box::new(AzureConnection::new(
            session,
            capability(),
            region,
            group,
            self.wait.clone(),
        )))
    }
}
