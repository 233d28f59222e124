//! Public IP addresses

use crate::capability::ResourceKind;
use crate::error::Result;
use crate::resources::validate_name;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicIpReqInfo {
    pub name: String,
}

impl PublicIpReqInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(ResourceKind::PublicIp, &self.name)
    }
}

/// Canonical public IP status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicIpStatus {
    /// Allocation in progress
    Reserving,
    /// Allocated, not attached
    Reserved,
    /// Attached to a VM or NIC
    InUse,
    Unknown,
}

impl fmt::Display for PublicIpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PublicIpStatus::Reserving => "RESERVING",
            PublicIpStatus::Reserved => "RESERVED",
            PublicIpStatus::InUse => "IN_USE",
            PublicIpStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Canonical public IP record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicIpInfo {
    pub id: String,
    pub name: String,
    pub ip_address: Option<String>,
    pub status: PublicIpStatus,
    /// Canonical id of the resource the address is attached to
    pub attached_to: Option<String>,
}

#[async_trait]
pub trait PublicIpHandler: Send + Sync {
    async fn create_public_ip(&self, req: PublicIpReqInfo) -> Result<PublicIpInfo>;

    async fn list_public_ip(&self) -> Result<Vec<PublicIpInfo>>;

    async fn get_public_ip(&self, id: &str) -> Result<PublicIpInfo>;

    async fn delete_public_ip(&self, id: &str) -> Result<bool>;
}
