//! Virtual networks

use crate::capability::ResourceKind;
use crate::error::Result;
use crate::resources::validate_name;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VNetworkReqInfo {
    pub name: String,
    /// CIDR of the network; providers with automatic addressing accept `None`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_prefix: Option<String>,
}

impl VNetworkReqInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address_prefix: None,
        }
    }

    pub fn with_address_prefix(mut self, cidr: impl Into<String>) -> Self {
        self.address_prefix = Some(cidr.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(ResourceKind::VNetwork, &self.name)
    }
}

/// Canonical virtual network record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VNetworkInfo {
    pub id: String,
    pub name: String,
    pub address_prefix: Option<String>,
    pub subnets: Vec<String>,
    pub status: String,
}

#[async_trait]
pub trait VNetworkHandler: Send + Sync {
    async fn create_vnetwork(&self, req: VNetworkReqInfo) -> Result<VNetworkInfo>;

    async fn list_vnetwork(&self) -> Result<Vec<VNetworkInfo>>;

    async fn get_vnetwork(&self, id: &str) -> Result<VNetworkInfo>;

    async fn delete_vnetwork(&self, id: &str) -> Result<bool>;
}
