//! ARM records and the client boundary
//!
//! The client speaks raw JSON per resource type; handlers decode it into the
//! typed records below. Records keep only the properties the handlers
//! translate and every field is optional.

use crate::error::Result;
use async_trait::async_trait;
use cloudspan_driver::{CredentialInfo, DriverError, RegionInfo, ResourceKind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// ARM resource types used by the handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    VirtualMachines,
    Images,
    PublicIpAddresses,
    NetworkSecurityGroups,
    VirtualNetworks,
    NetworkInterfaces,
}

impl ResourceType {
    /// `<namespace>/<type>` as it appears in resource paths
    pub fn provider_path(&self) -> &'static str {
        match self {
            ResourceType::VirtualMachines => "Microsoft.Compute/virtualMachines",
            ResourceType::Images => "Microsoft.Compute/images",
            ResourceType::PublicIpAddresses => "Microsoft.Network/publicIPAddresses",
            ResourceType::NetworkSecurityGroups => "Microsoft.Network/networkSecurityGroups",
            ResourceType::VirtualNetworks => "Microsoft.Network/virtualNetworks",
            ResourceType::NetworkInterfaces => "Microsoft.Network/networkInterfaces",
        }
    }

    pub fn api_version(&self) -> &'static str {
        match self {
            ResourceType::VirtualMachines | ResourceType::Images => "2024-03-01",
            _ => "2023-09-01",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmAction {
    PowerOff,
    Start,
    Restart,
}

impl VmAction {
    pub fn verb(&self) -> &'static str {
        match self {
            VmAction::PowerOff => "powerOff",
            VmAction::Start => "start",
            VmAction::Restart => "restart",
        }
    }
}

/// Where a mutation that continues asynchronously is followed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRef {
    /// `Azure-AsyncOperation` URL, answering with an [`OperationStatus`] document
    AsyncOperation(String),
    /// `Location` URL, answering 202 while running and 200/201/204 once done
    Location(String),
}

impl OperationRef {
    pub fn url(&self) -> &str {
        match self {
            OperationRef::AsyncOperation(url) | OperationRef::Location(url) => url,
        }
    }
}

/// Outcome of a PUT: the resource as accepted, plus the operation to follow
/// when provisioning continues asynchronously
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted {
    pub resource: Value,
    pub operation: Option<OperationRef>,
}

/// Body of an `Azure-AsyncOperation` status URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationStatus {
    /// InProgress, Succeeded, Failed, Canceled
    pub status: Option<String>,
    pub error: Option<ErrorDetail>,
}

impl OperationStatus {
    pub fn new(status: &str) -> Self {
        Self {
            status: Some(status.to_string()),
            error: None,
        }
    }

    pub fn failed(code: Option<String>, message: Option<String>) -> Self {
        Self {
            status: Some("Failed".to_string()),
            error: Some(ErrorDetail { code, message }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorDetail {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Reference to another resource by path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubResource {
    pub id: Option<String>,
}

impl SubResource {
    pub fn to(path: String) -> Self {
        Self { id: Some(path) }
    }
}

/// Common envelope of every ARM resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, bound = "P: Serialize + DeserializeOwned + Default")]
pub struct Resource<P> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<P>,
}

// Virtual machines

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VmProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_profile: Option<HardwareProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_profile: Option<StorageProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_profile: Option<OsProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_profile: Option<NetworkProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_view: Option<InstanceView>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HardwareProfile {
    pub vm_size: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_reference: Option<ImageReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_disk: Option<OsDisk>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OsDisk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Linux or Windows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OsProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_username: Option<String>,
    /// Write-only; ARM never returns it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkProfile {
    pub network_interfaces: Vec<SubResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceView {
    /// Codes such as `PowerState/running`, `ProvisioningState/succeeded`
    pub statuses: Vec<InstanceViewStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceViewStatus {
    pub code: Option<String>,
}

impl InstanceView {
    /// Value of the first status code with `prefix` (`PowerState`, ...)
    pub fn axis(&self, prefix: &str) -> Option<&str> {
        self.statuses.iter().find_map(|s| {
            s.code
                .as_deref()?
                .split_once('/')
                .filter(|(p, _)| *p == prefix)
                .map(|(_, value)| value)
        })
    }
}

// Images

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_virtual_machine: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_profile: Option<StorageProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

// Public IP addresses

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PublicIpProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(rename = "publicIPAllocationMethod", skip_serializing_if = "Option::is_none")]
    pub allocation_method: Option<String>,
    /// Set while attached; points at a NIC ip configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_configuration: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

// Network security groups

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NsgProperties {
    pub security_rules: Vec<Resource<SecurityRuleProperties>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecurityRuleProperties {
    /// Tcp, Udp, Icmp or *
    pub protocol: Option<String>,
    /// Inbound or Outbound
    pub direction: Option<String>,
    /// Allow or Deny
    pub access: Option<String>,
    pub priority: Option<u32>,
    pub source_address_prefix: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_address_prefixes: Vec<String>,
    pub source_port_range: Option<String>,
    pub destination_address_prefix: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub destination_address_prefixes: Vec<String>,
    /// `*`, `22` or `8000-8080`
    pub destination_port_range: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub destination_port_ranges: Vec<String>,
}

// Virtual networks

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VNetProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_space: Option<AddressSpace>,
    pub subnets: Vec<Resource<SubnetProperties>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddressSpace {
    pub address_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubnetProperties {
    pub address_prefix: Option<String>,
}

// Network interfaces

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NicProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    pub ip_configurations: Vec<Resource<IpConfigurationProperties>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_security_group: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_machine: Option<SubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IpConfigurationProperties {
    #[serde(rename = "privateIPAddress", skip_serializing_if = "Option::is_none")]
    pub private_ip_address: Option<String>,
    #[serde(rename = "privateIPAllocationMethod", skip_serializing_if = "Option::is_none")]
    pub private_ip_allocation_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<SubResource>,
    #[serde(rename = "publicIPAddress", skip_serializing_if = "Option::is_none")]
    pub public_ip_address: Option<SubResource>,
}

pub type VirtualMachine = Resource<VmProperties>;
pub type Image = Resource<ImageProperties>;
pub type PublicIpAddress = Resource<PublicIpProperties>;
pub type NetworkSecurityGroup = Resource<NsgProperties>;
pub type VirtualNetwork = Resource<VNetProperties>;
pub type NetworkInterface = Resource<NicProperties>;

/// Authenticated ARM client for one subscription
///
/// Mutating calls return the operation to follow, if any.
#[async_trait]
pub trait ArmApi: Send + Sync {
    async fn list(&self, group: &str, kind: ResourceType) -> Result<Vec<Value>>;
    async fn get(&self, group: &str, kind: ResourceType, name: &str) -> Result<Value>;
    /// Create-only PUT: fails with [`AzureError::Conflict`] when `name` already exists
    ///
    /// [`AzureError::Conflict`]: crate::AzureError::Conflict
    async fn put(&self, group: &str, kind: ResourceType, name: &str, body: Value)
    -> Result<Accepted>;
    async fn delete(
        &self,
        group: &str,
        kind: ResourceType,
        name: &str,
    ) -> Result<Option<OperationRef>>;
    async fn vm_action(
        &self,
        group: &str,
        name: &str,
        action: VmAction,
    ) -> Result<Option<OperationRef>>;
    async fn get_operation(&self, operation: &OperationRef) -> Result<OperationStatus>;
}

/// Subscription-bound session produced at connect time
#[derive(Clone)]
pub struct ArmSession {
    pub api: Arc<dyn ArmApi>,
    pub subscription_id: String,
}

/// Turns connect-time inputs into an authenticated [`ArmApi`]
#[async_trait]
pub trait AzureConnector: Send + Sync {
    async fn connect(
        &self,
        credential: &CredentialInfo,
        region: &RegionInfo,
    ) -> cloudspan_driver::Result<ArmSession>;
}

/// Decode a raw resource, mapping malformed JSON to `TranslationError`
pub fn decode<T: DeserializeOwned>(
    kind: ResourceKind,
    value: Value,
) -> cloudspan_driver::Result<T> {
    serde_json::from_value(value).map_err(|e| {
        DriverError::TranslationError(format!("malformed {} resource: {}", kind, e))
    })
}

/// Encode a request body
pub fn body<T: Serialize>(kind: ResourceKind, request: &T) -> cloudspan_driver::Result<Value> {
    serde_json::to_value(request)
        .map_err(|e| DriverError::InvalidRequest(format!("{} request: {}", kind, e)))
}
