//! Live provider session

use crate::capability::{CapabilityInfo, ResourceKind};
use crate::credential::RegionInfo;
use crate::error::{DriverError, Result};
use crate::resources::{
    ImageHandler, KeyPairHandler, PublicIpHandler, SecurityHandler, VNetworkHandler, VNicHandler,
    VmHandler,
};
use tokio_util::sync::CancellationToken;

/// Authenticated session bound to one provider account and region
///
/// Factories are cheap and never touch the network. A driver that does not
/// implement a kind leaves the default factory in place, which always fails
/// with `UnsupportedOperation`; a driver that does implement it must still
/// refuse when its capability says otherwise (see [`CloudConnection::ensure`]).
pub trait CloudConnection: Send + Sync {
    /// Capability of the driver that created this connection
    fn capability(&self) -> CapabilityInfo;

    fn region(&self) -> &RegionInfo;

    /// Token that cancels every in-flight call made through this connection
    fn cancellation_token(&self) -> CancellationToken;

    fn ensure(&self, kind: ResourceKind) -> Result<()> {
        self.capability().ensure(kind)
    }

    fn create_vm_handler(&self) -> Result<Box<dyn VmHandler>> {
        Err(DriverError::UnsupportedOperation(ResourceKind::Vm))
    }

    fn create_image_handler(&self) -> Result<Box<dyn ImageHandler>> {
        Err(DriverError::UnsupportedOperation(ResourceKind::Image))
    }

    fn create_public_ip_handler(&self) -> Result<Box<dyn PublicIpHandler>> {
        Err(DriverError::UnsupportedOperation(ResourceKind::PublicIp))
    }

    fn create_security_handler(&self) -> Result<Box<dyn SecurityHandler>> {
        Err(DriverError::UnsupportedOperation(ResourceKind::Security))
    }

    fn create_vnetwork_handler(&self) -> Result<Box<dyn VNetworkHandler>> {
        Err(DriverError::UnsupportedOperation(ResourceKind::VNetwork))
    }

    fn create_vnic_handler(&self) -> Result<Box<dyn VNicHandler>> {
        Err(DriverError::UnsupportedOperation(ResourceKind::VNic))
    }

    fn create_key_pair_handler(&self) -> Result<Box<dyn KeyPairHandler>> {
        Err(DriverError::UnsupportedOperation(ResourceKind::KeyPair))
    }

    /// Whether the factory for `kind` hands out a handler
    fn can_create(&self, kind: ResourceKind) -> bool {
        match kind {
            ResourceKind::Vm => self.create_vm_handler().is_ok(),
            ResourceKind::Image => self.create_image_handler().is_ok(),
            ResourceKind::PublicIp => self.create_public_ip_handler().is_ok(),
            ResourceKind::Security => self.create_security_handler().is_ok(),
            ResourceKind::VNetwork => self.create_vnetwork_handler().is_ok(),
            ResourceKind::VNic => self.create_vnic_handler().is_ok(),
            ResourceKind::KeyPair => self.create_key_pair_handler().is_ok(),
        }
    }
}

/// Check that every factory agrees with the declared capability
///
/// Returns the kinds where they disagree.
pub fn capability_mismatches(conn: &dyn CloudConnection) -> Vec<ResourceKind> {
    conn.capability()
        .iter()
        .filter(|(kind, declared)| conn.can_create(*kind) != *declared)
        .map(|(kind, _)| kind)
        .collect()
}
