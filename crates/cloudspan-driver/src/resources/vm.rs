//! Virtual machines

use crate::capability::ResourceKind;
use crate::credential::RegionInfo;
use crate::error::Result;
use crate::resources::{require_field, validate_name};
use crate::status::VmStatus;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request to create and boot a VM
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmReqInfo {
    pub name: String,
    /// Canonical image id (or provider image reference)
    pub image_id: String,
    /// Machine size / flavor
    pub spec_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnetwork_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_group_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_pair_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_password: Option<String>,
}

impl VmReqInfo {
    pub fn new(
        name: impl Into<String>,
        image_id: impl Into<String>,
        spec_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            image_id: image_id.into(),
            spec_id: spec_id.into(),
            ..Default::default()
        }
    }

    pub fn with_vnetwork(mut self, vnetwork_id: impl Into<String>) -> Self {
        self.vnetwork_id = Some(vnetwork_id.into());
        self
    }

    pub fn with_vnic(mut self, vnic_id: impl Into<String>) -> Self {
        self.vnic_id = Some(vnic_id.into());
        self
    }

    pub fn with_public_ip(mut self, public_ip_id: impl Into<String>) -> Self {
        self.public_ip_id = Some(public_ip_id.into());
        self
    }

    pub fn with_security_group(mut self, security_group_id: impl Into<String>) -> Self {
        self.security_group_ids.push(security_group_id.into());
        self
    }

    pub fn with_login(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.login_user = Some(user.into());
        self.login_password = Some(password.into());
        self
    }

    /// Check the fields every provider needs
    pub fn validate(&self) -> Result<()> {
        validate_name(ResourceKind::Vm, &self.name)?;
        require_field(ResourceKind::Vm, "image_id", &self.image_id)?;
        require_field(ResourceKind::Vm, "spec_id", &self.spec_id)?;
        Ok(())
    }
}

/// Canonical VM record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmInfo {
    pub id: String,
    pub name: String,
    pub region: RegionInfo,
    /// Image the VM was booted from, when the provider still reports it
    pub image_id: Option<String>,
    pub spec_id: String,
    pub vnic_id: Option<String>,
    pub vnetwork_id: Option<String>,
    pub public_ip: Option<String>,
    pub private_ip: Option<String>,
    pub security_group_ids: Vec<String>,
    pub key_pair_name: Option<String>,
    pub guest_user_id: Option<String>,
    pub guest_boot_disk: Option<String>,
    pub status: VmStatus,
    pub status_detail: String,
}

/// Status of one VM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmStatusInfo {
    pub id: String,
    pub status: VmStatus,
    pub detail: String,
}

/// VM handler contract
///
/// `start_vm` creates and boots a VM; `terminate_vm` deletes it. The other
/// lifecycle calls act on an existing VM and return the status observed once
/// the provider has finished (waiting on long-running operations where the
/// provider uses them).
#[async_trait]
pub trait VmHandler: Send + Sync {
    async fn start_vm(&self, req: VmReqInfo) -> Result<VmInfo>;

    /// Stop the VM
    async fn suspend_vm(&self, id: &str) -> Result<VmStatus>;

    /// Start a stopped VM
    async fn resume_vm(&self, id: &str) -> Result<VmStatus>;

    async fn reboot_vm(&self, id: &str) -> Result<VmStatus>;

    async fn terminate_vm(&self, id: &str) -> Result<VmStatus>;

    async fn list_vm_status(&self) -> Result<Vec<VmStatusInfo>>;

    async fn get_vm_status(&self, id: &str) -> Result<VmStatusInfo>;

    async fn list_vm(&self) -> Result<Vec<VmInfo>>;

    async fn get_vm(&self, id: &str) -> Result<VmInfo>;
}
