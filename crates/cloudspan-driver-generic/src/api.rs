//! Native records and the client boundary of the generic provider
//!
//! The generic provider exposes one REST collection per resource kind under
//! `/regions/<region>/`. Servers, templates, adaptive IPs, security groups,
//! subnets and keypairs all follow the same list/get/create/delete shape, so
//! the client trait is collection-oriented and speaks JSON. Handlers decode
//! the JSON into the typed records below and translate from there.

use crate::error::Result;
use async_trait::async_trait;
use cloudspan_driver::{CredentialInfo, DriverError, RegionInfo, ResourceKind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// REST collections of the generic provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Servers,
    Templates,
    AdaptiveIps,
    SecurityGroups,
    Subnets,
    Keypairs,
}

impl Collection {
    pub fn path(&self) -> &'static str {
        match self {
            Collection::Servers => "servers",
            Collection::Templates => "templates",
            Collection::AdaptiveIps => "adaptive-ips",
            Collection::SecurityGroups => "security-groups",
            Collection::Subnets => "subnets",
            Collection::Keypairs => "keypairs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerAction {
    Start,
    Stop,
    Reboot,
}

/// Authenticated client for one region of the generic provider
#[async_trait]
pub trait GenericApi: Send + Sync {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Value>;

    /// Create a record; the provider answers with the stored record
    async fn create(&self, collection: Collection, body: Value) -> Result<Value>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<()>;

    async fn server_action(&self, id: &str, action: ServerAction) -> Result<()>;
}

/// Turns connect-time inputs into an authenticated [`GenericApi`]
#[async_trait]
pub trait GenericConnector: Send + Sync {
    async fn connect(
        &self,
        credential: &CredentialInfo,
        region: &RegionInfo,
    ) -> cloudspan_driver::Result<Arc<dyn GenericApi>>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Server {
    pub id: Option<String>,
    pub name: Option<String>,
    pub state: Option<String>,
    pub template_id: Option<String>,
    pub spec: Option<String>,
    pub subnet_id: Option<String>,
    pub adaptive_ip: Option<String>,
    pub private_ip: Option<String>,
    pub security_group_ids: Option<Vec<String>>,
    pub keypair_name: Option<String>,
    pub admin_user: Option<String>,
    pub root_disk: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Template {
    pub id: Option<String>,
    pub name: Option<String>,
    pub state: Option<String>,
    pub os: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdaptiveIp {
    pub id: Option<String>,
    pub name: Option<String>,
    pub ip: Option<String>,
    pub state: Option<String>,
    pub server_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecurityGroup {
    pub id: Option<String>,
    pub name: Option<String>,
    pub rules: Option<Vec<SecurityRule>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecurityRule {
    /// "inbound" / "outbound"
    pub direction: Option<String>,
    pub protocol: Option<String>,
    pub port_min: Option<u16>,
    pub port_max: Option<u16>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Subnet {
    pub id: Option<String>,
    pub name: Option<String>,
    /// CIDR
    pub addr: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Keypair {
    pub id: Option<String>,
    pub name: Option<String>,
    pub fingerprint: Option<String>,
    pub public_key: Option<String>,
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCreate {
    pub name: String,
    pub template_id: String,
    pub spec: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adaptive_ip_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_group_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keypair_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameOnly {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityGroupCreate {
    pub name: String,
    pub rules: Vec<SecurityRule>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubnetCreate {
    pub name: String,
    pub addr: String,
}

/// Decode one provider record, failing with `TranslationError`
pub fn decode<T: DeserializeOwned>(
    kind: ResourceKind,
    value: Value,
) -> cloudspan_driver::Result<T> {
    serde_json::from_value(value).map_err(|e| {
        DriverError::TranslationError(format!("malformed {} record: {}", kind, e))
    })
}

/// Encode a request body
pub fn body<T: Serialize>(kind: ResourceKind, request: &T) -> cloudspan_driver::Result<Value> {
    serde_json::to_value(request)
        .map_err(|e| DriverError::InvalidRequest(format!("{} request: {}", kind, e)))
}
