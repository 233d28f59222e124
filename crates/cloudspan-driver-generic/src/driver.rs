//! Generic provider driver

use crate::api::GenericConnector;
use crate::connection::GenericConnection;
use crate::rest::RestConnector;
use async_trait::async_trait;
use cloudspan_driver::{
    CapabilityInfo, CloudConnection, CloudDriver, CredentialInfo, DriverError, RegionInfo,
    ResourceKind, Result, WaitConfig,
};
use std::sync::Arc;

pub const DRIVER_NAME: &str = "generic";
const DRIVER_VERSION: &str = "GENERIC DRIVER Version 1.0";

/// Handlers the generic provider offers
pub fn capability() -> CapabilityInfo {
    CapabilityInfo::all().with(ResourceKind::VNic, false)
}

/// Check the credential shape before anything goes over the wire
///
/// Requires the identity endpoint plus either a token or username/password.
pub fn validate_credential(credential: &CredentialInfo) -> Result<()> {
    CredentialInfo::require(credential.identity_endpoint(), "identity_endpoint")?;
    if credential.auth_token().is_some() {
        return Ok(());
    }
    match (credential.username(), credential.password()) {
        (Some(_), Some(_)) => Ok(()),
        _ => Err(DriverError::InvalidCredential(
            "either auth_token or username and password are required".to_string(),
        )),
    }
}

pub struct GenericDriver {
    connector: Arc<dyn GenericConnector>,
    wait: WaitConfig,
}

impl GenericDriver {
    pub fn new() -> Self {
        Self::with_connector(Arc::new(RestConnector::new()))
    }

    /// Use another client implementation (tests, proxies)
    pub fn with_connector(connector: Arc<dyn GenericConnector>) -> Self {
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

impl Default for GenericDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CloudDriver for GenericDriver {
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

        tracing::debug!("Connecting to generic provider in {}", region.region());
        let api = self.connector.connect(&credential, &region).await?;
        tracing::info!("Connected to generic provider in {}", region.region());

        Ok(Box::new(GenericConnection::new(
            api,
            capability(),
            region,
            self.wait.clone(),
        )))
    }
}
