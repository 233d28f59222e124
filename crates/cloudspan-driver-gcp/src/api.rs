//! Compute Engine records and the client boundary
//!
//! Records mirror the Compute Engine v1 JSON resources, keeping only the
//! fields the handlers translate. Every field is optional; presence is
//! checked at translation time.

use crate::error::Result;
use async_trait::async_trait;
use cloudspan_driver::{CredentialInfo, RegionInfo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Scope literal for global resources (images, networks)
pub const GLOBAL: &str = "global";

/// Where an operation (and the resource it acts on) lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationScope {
    Zone(String),
    Region(String),
    Global,
}

impl OperationScope {
    /// URL path segment: `zones/<z>`, `regions/<r>` or `global`
    pub fn path(&self) -> String {
        match self {
            OperationScope::Zone(zone) => format!("zones/{}", zone),
            OperationScope::Region(region) => format!("regions/{}", region),
            OperationScope::Global => GLOBAL.to_string(),
        }
    }
}

impl fmt::Display for OperationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceAction {
    Start,
    Stop,
    Reset,
}

impl InstanceAction {
    pub fn verb(&self) -> &'static str {
        match self {
            InstanceAction::Start => "start",
            InstanceAction::Stop => "stop",
            InstanceAction::Reset => "reset",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Instance {
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    /// URL ending in `machineTypes/<type>`
    pub machine_type: Option<String>,
    /// URL ending in `zones/<zone>`
    pub zone: Option<String>,
    pub network_interfaces: Option<Vec<NetworkInterface>>,
    pub disks: Option<Vec<AttachedDisk>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkInterface {
    pub network: Option<String>,
    #[serde(rename = "networkIP")]
    pub network_ip: Option<String>,
    pub access_configs: Option<Vec<AccessConfig>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessConfig {
    pub name: Option<String>,
    #[serde(rename = "natIP")]
    pub nat_ip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttachedDisk {
    pub boot: Option<bool>,
    pub device_name: Option<String>,
    pub source: Option<String>,
    pub licenses: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Image {
    pub id: Option<String>,
    pub name: Option<String>,
    /// READY, PENDING, FAILED, DELETING
    pub status: Option<String>,
    pub family: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    pub id: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    /// RESERVING, RESERVED, IN_USE
    pub status: Option<String>,
    pub region: Option<String>,
    /// URLs of the resources using the address
    pub users: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Network {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "IPv4Range")]
    pub ipv4_range: Option<String>,
    pub auto_create_subnetworks: Option<bool>,
    pub subnetworks: Option<Vec<String>>,
}

/// Handle returned by every mutating call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Operation {
    pub name: Option<String>,
    /// PENDING, RUNNING, DONE
    pub status: Option<String>,
    pub target_link: Option<String>,
    pub error: Option<OperationError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationError {
    pub errors: Vec<OperationErrorItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationErrorItem {
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceInsert {
    pub name: String,
    /// `zones/<zone>/machineTypes/<type>`
    pub machine_type: String,
    pub disks: Vec<AttachedDiskInsert>,
    pub network_interfaces: Vec<NetworkInterfaceInsert>,
    pub service_accounts: Vec<ServiceAccountRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDiskInsert {
    pub boot: bool,
    pub auto_delete: bool,
    pub initialize_params: DiskInitializeParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskInitializeParams {
    pub source_image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceInsert {
    pub network: String,
    pub access_configs: Vec<AccessConfigInsert>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessConfigInsert {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(rename = "natIP", skip_serializing_if = "Option::is_none")]
    pub nat_ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceAccountRef {
    pub email: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInsert {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressInsert {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkInsert {
    pub name: String,
    #[serde(rename = "autoCreateSubnetworks", skip_serializing_if = "Option::is_none")]
    pub auto_create_subnetworks: Option<bool>,
    #[serde(rename = "IPv4Range", skip_serializing_if = "Option::is_none")]
    pub ipv4_range: Option<String>,
}

/// Authenticated Compute Engine client for one project
///
/// Mutating calls return the operation handle without waiting.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn list_instances(&self, zone: &str) -> Result<Vec<Instance>>;
    async fn get_instance(&self, zone: &str, name: &str) -> Result<Instance>;
    async fn insert_instance(&self, zone: &str, body: &InstanceInsert) -> Result<Operation>;
    async fn instance_action(&self, zone: &str, name: &str, action: InstanceAction)
    -> Result<Operation>;
    async fn delete_instance(&self, zone: &str, name: &str) -> Result<Operation>;

    async fn list_images(&self) -> Result<Vec<Image>>;
    async fn get_image(&self, name: &str) -> Result<Image>;
    async fn insert_image(&self, body: &ImageInsert) -> Result<Operation>;
    async fn delete_image(&self, name: &str) -> Result<Operation>;

    async fn list_addresses(&self, region: &str) -> Result<Vec<Address>>;
    async fn get_address(&self, region: &str, name: &str) -> Result<Address>;
    async fn insert_address(&self, region: &str, body: &AddressInsert) -> Result<Operation>;
    async fn delete_address(&self, region: &str, name: &str) -> Result<Operation>;

    async fn list_networks(&self) -> Result<Vec<Network>>;
    async fn get_network(&self, name: &str) -> Result<Network>;
    async fn insert_network(&self, body: &NetworkInsert) -> Result<Operation>;
    async fn delete_network(&self, name: &str) -> Result<Operation>;

    async fn get_operation(&self, scope: &OperationScope, name: &str) -> Result<Operation>;
}

/// Project-bound session produced at connect time
#[derive(Clone)]
pub struct ComputeSession {
    pub api: Arc<dyn ComputeApi>,
    pub project_id: String,
    /// Service account attached to new instances, when known
    pub service_account: Option<String>,
}

/// Turns connect-time inputs into an authenticated [`ComputeApi`]
#[async_trait]
pub trait GcpConnector: Send + Sync {
    async fn connect(
        &self,
        credential: &CredentialInfo,
        region: &RegionInfo,
    ) -> cloudspan_driver::Result<ComputeSession>;
}
