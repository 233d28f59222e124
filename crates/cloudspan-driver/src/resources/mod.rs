//! Canonical resource records and handler contracts
//!
//! One module per resource kind. Each defines the request record the caller
//! fills in, the canonical record handlers return, and the `#[async_trait]`
//! handler contract providers implement.

pub mod image;
pub mod key_pair;
pub mod public_ip;
pub mod security;
pub mod vm;
pub mod vnetwork;
pub mod vnic;

pub use image::{ImageHandler, ImageInfo, ImageReqInfo};
pub use key_pair::{KeyPairHandler, KeyPairInfo, KeyPairReqInfo};
pub use public_ip::{PublicIpHandler, PublicIpInfo, PublicIpReqInfo, PublicIpStatus};
pub use security::{Direction, SecurityHandler, SecurityInfo, SecurityReqInfo, SecurityRuleInfo};
pub use vm::{VmHandler, VmInfo, VmReqInfo, VmStatusInfo};
pub use vnetwork::{VNetworkHandler, VNetworkInfo, VNetworkReqInfo};
pub use vnic::{VNicHandler, VNicInfo, VNicReqInfo};

use crate::capability::ResourceKind;
use crate::error::{DriverError, Result};
use crate::id::SEPARATOR;

/// Check a requested resource name before any provider call
///
/// Names end up inside composite ids, so they may not contain the id separator.
pub fn validate_name(kind: ResourceKind, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DriverError::InvalidRequest(format!("{} name is required", kind)));
    }
    if name.contains(SEPARATOR) || name.contains('/') || name.trim() != name {
        return Err(DriverError::InvalidRequest(format!(
            "{} name '{}' contains invalid characters",
            kind, name
        )));
    }
    Ok(())
}

/// Fail with `InvalidRequest` when a required request field is empty
pub fn require_field<'a>(kind: ResourceKind, field: &str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(DriverError::InvalidRequest(format!(
            "{} request is missing {}",
            kind, field
        )));
    }
    Ok(value)
}
