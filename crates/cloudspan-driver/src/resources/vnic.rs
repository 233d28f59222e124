//! Virtual network interfaces

use crate::capability::ResourceKind;
use crate::error::Result;
use crate::resources::{require_field, validate_name};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VNicReqInfo {
    pub name: String,
    pub vnetwork_name: String,
    pub subnet_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip_id: Option<String>,
}

impl VNicReqInfo {
    pub fn new(
        name: impl Into<String>,
        vnetwork_name: impl Into<String>,
        subnet_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            vnetwork_name: vnetwork_name.into(),
            subnet_name: subnet_name.into(),
            ..Default::default()
        }
    }

    pub fn with_security_group(mut self, id: impl Into<String>) -> Self {
        self.security_group_id = Some(id.into());
        self
    }

    pub fn with_public_ip(mut self, id: impl Into<String>) -> Self {
        self.public_ip_id = Some(id.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(ResourceKind::VNic, &self.name)?;
        require_field(ResourceKind::VNic, "vnetwork_name", &self.vnetwork_name)?;
        require_field(ResourceKind::VNic, "subnet_name", &self.subnet_name)?;
        Ok(())
    }
}

/// Canonical network interface record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VNicInfo {
    pub id: String,
    pub name: String,
    pub mac_address: Option<String>,
    pub private_ip: Option<String>,
    pub public_ip_id: Option<String>,
    pub security_group_id: Option<String>,
    pub attached_vm_id: Option<String>,
    pub status: String,
}

#[async_trait]
pub trait VNicHandler: Send + Sync {
    async fn create_vnic(&self, req: VNicReqInfo) -> Result<VNicInfo>;

    async fn list_vnic(&self) -> Result<Vec<VNicInfo>>;

    async fn get_vnic(&self, id: &str) -> Result<VNicInfo>;

    async fn delete_vnic(&self, id: &str) -> Result<bool>;
}
