//! Driver trait and registry

use crate::capability::CapabilityInfo;
use crate::connection::CloudConnection;
use crate::credential::{ConnectionInfo, CredentialInfo, RegionInfo};
use crate::error::{DriverError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Provider entry point
///
/// All providers (generic IaaS, GCP, Azure, test stubs) implement this trait
/// to turn credentials into a live [`CloudConnection`].
#[async_trait]
pub trait CloudDriver: Send + Sync {
    /// Registry key (e.g. "gcp", "azure")
    fn name(&self) -> &str;

    fn driver_version(&self) -> &str;

    /// Fixed per driver
    fn capability(&self) -> CapabilityInfo;

    /// Validate credentials, authenticate once, and wrap the session
    ///
    /// Fails with `InvalidCredential` / `InvalidRegion` before any network
    /// call, and with `ConnectionFailed` if the handshake is rejected. Never
    /// retries.
    async fn connect_cloud(
        &self,
        credential: CredentialInfo,
        region: RegionInfo,
    ) -> Result<Box<dyn CloudConnection>>;

    async fn connect(&self, info: ConnectionInfo) -> Result<Box<dyn CloudConnection>> {
        self.connect_cloud(info.credential, info.region).await
    }
}

/// Provider name → driver, built once by the process entry point
#[derive(Default, Clone)]
pub struct DriverRegistry {
    drivers: BTreeMap<String, Arc<dyn CloudDriver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver under its own name, replacing any previous one
    pub fn register(&mut self, driver: Arc<dyn CloudDriver>) -> &mut Self {
        let name = driver.name().to_string();
        if self.drivers.insert(name.clone(), driver).is_some() {
            tracing::warn!("Driver {} registered twice; keeping the latest", name);
        } else {
            tracing::debug!("Registered driver: {}", name);
        }
        self
    }

    pub fn with(mut self, driver: Arc<dyn CloudDriver>) -> Self {
        self.register(driver);
        self
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn CloudDriver>> {
        self.drivers
            .get(name)
            .cloned()
            .ok_or_else(|| DriverError::DriverNotFound(name.to_string()))
    }

    /// Registered driver names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.drivers.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn CloudDriver>> {
        self.drivers.values()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Look up `name` and connect with `info`
    pub async fn connect(
        &self,
        name: &str,
        info: ConnectionInfo,
    ) -> Result<Box<dyn CloudConnection>> {
        let driver = self.get(name)?;
        tracing::info!("Connecting with driver {} ({})", name, driver.driver_version());
        driver.connect(info).await
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.names())
            .finish()
    }
}
