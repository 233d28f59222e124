//! Capability descriptor
//!
//! Each driver declares, once, which resource handlers it implements.
//! Connection factories consult the descriptor before building a handler.

use crate::error::{DriverError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resource kinds a connection can manufacture handlers for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Vm,
    Image,
    PublicIp,
    Security,
    VNetwork,
    VNic,
    KeyPair,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Vm,
        ResourceKind::Image,
        ResourceKind::PublicIp,
        ResourceKind::Security,
        ResourceKind::VNetwork,
        ResourceKind::VNic,
        ResourceKind::KeyPair,
    ];

    /// Handler name as reported in capability listings
    pub fn handler_name(&self) -> &'static str {
        match self {
            ResourceKind::Vm => "VMHandler",
            ResourceKind::Image => "ImageHandler",
            ResourceKind::PublicIp => "PublicIPHandler",
            ResourceKind::Security => "SecurityHandler",
            ResourceKind::VNetwork => "VNetworkHandler",
            ResourceKind::VNic => "VNicHandler",
            ResourceKind::KeyPair => "KeyPairHandler",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Vm => write!(f, "VM"),
            ResourceKind::Image => write!(f, "Image"),
            ResourceKind::PublicIp => write!(f, "PublicIP"),
            ResourceKind::Security => write!(f, "Security"),
            ResourceKind::VNetwork => write!(f, "VNetwork"),
            ResourceKind::VNic => write!(f, "VNic"),
            ResourceKind::KeyPair => write!(f, "KeyPair"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "vm" => Ok(ResourceKind::Vm),
            "image" => Ok(ResourceKind::Image),
            "publicip" => Ok(ResourceKind::PublicIp),
            "security" | "securitygroup" => Ok(ResourceKind::Security),
            "vnetwork" | "network" => Ok(ResourceKind::VNetwork),
            "vnic" | "nic" => Ok(ResourceKind::VNic),
            "keypair" | "key" => Ok(ResourceKind::KeyPair),
            _ => Err(DriverError::InvalidRequest(format!(
                "unknown resource kind '{}'",
                s
            ))),
        }
    }
}

/// Static declaration of the handlers a driver implements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityInfo {
    pub vm_handler: bool,
    pub image_handler: bool,
    pub public_ip_handler: bool,
    pub security_handler: bool,
    pub vnetwork_handler: bool,
    pub vnic_handler: bool,
    pub key_pair_handler: bool,
}

impl CapabilityInfo {
    /// Capability with no handlers
    pub fn none() -> Self {
        Self::default()
    }

    /// Capability with every handler
    pub fn all() -> Self {
        ResourceKind::ALL
            .iter()
            .fold(Self::none(), |cap, kind| cap.with(*kind, true))
    }

    pub fn with(mut self, kind: ResourceKind, supported: bool) -> Self {
        *self.slot(kind) = supported;
        self
    }

    pub fn supports(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Vm => self.vm_handler,
            ResourceKind::Image => self.image_handler,
            ResourceKind::PublicIp => self.public_ip_handler,
            ResourceKind::Security => self.security_handler,
            ResourceKind::VNetwork => self.vnetwork_handler,
            ResourceKind::VNic => self.vnic_handler,
            ResourceKind::KeyPair => self.key_pair_handler,
        }
    }

    /// Fail with `UnsupportedOperation` unless `kind` is declared
    pub fn ensure(&self, kind: ResourceKind) -> Result<()> {
        if self.supports(kind) {
            Ok(())
        } else {
            Err(DriverError::UnsupportedOperation(kind))
        }
    }

    /// (kind, supported) pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, bool)> + '_ {
        ResourceKind::ALL
            .iter()
            .map(move |kind| (*kind, self.supports(*kind)))
    }

    fn slot(&mut self, kind: ResourceKind) -> &mut bool {
        match kind {
            ResourceKind::Vm => &mut self.vm_handler,
            ResourceKind::Image => &mut self.image_handler,
            ResourceKind::PublicIp => &mut self.public_ip_handler,
            ResourceKind::Security => &mut self.security_handler,
            ResourceKind::VNetwork => &mut self.vnetwork_handler,
            ResourceKind::VNic => &mut self.vnic_handler,
            ResourceKind::KeyPair => &mut self.key_pair_handler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_and_ensure() {
        let cap = CapabilityInfo::all().with(ResourceKind::Image, false);
        assert!(cap.supports(ResourceKind::Vm));
        assert!(!cap.supports(ResourceKind::Image));
        assert!(matches!(
            cap.ensure(ResourceKind::Image),
            Err(DriverError::UnsupportedOperation(ResourceKind::Image))
        ));
        assert_eq!(cap.iter().filter(|(_, ok)| *ok).count(), 6);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("public-ip".parse::<ResourceKind>().unwrap(), ResourceKind::PublicIp);
        assert_eq!("VNic".parse::<ResourceKind>().unwrap(), ResourceKind::VNic);
        assert!("bucket".parse::<ResourceKind>().is_err());
    }
}
