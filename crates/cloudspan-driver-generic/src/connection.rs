//! Generic provider connection

use crate::api::GenericApi;
use crate::image::GenericImageHandler;
use crate::key_pair::GenericKeyPairHandler;
use crate::public_ip::GenericPublicIpHandler;
use crate::security::GenericSecurityHandler;
use crate::vm::GenericVmHandler;
use crate::vnetwork::GenericVNetworkHandler;
use cloudspan_driver::{
    CallContext, CapabilityInfo, CloudConnection, ImageHandler, KeyPairHandler, PublicIpHandler,
    RegionInfo, ResourceKind, Result, SecurityHandler, VNetworkHandler, VmHandler, WaitConfig,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Fields every generic handler is bound to
pub(crate) struct Binding {
    pub api: Arc<dyn GenericApi>,
    pub region: RegionInfo,
    pub ctx: CallContext,
}

pub struct GenericConnection {
    api: Arc<dyn GenericApi>,
    capability: CapabilityInfo,
    region: RegionInfo,
    ctx: CallContext,
}

impl GenericConnection {
    pub(crate) fn new(
        api: Arc<dyn GenericApi>,
        capability: CapabilityInfo,
        region: RegionInfo,
        wait: WaitConfig,
    ) -> Self {
        Self {
            api,
            capability,
            region,
            ctx: CallContext::new(wait),
        }
    }

    fn bind(&self, kind: ResourceKind) -> Result<Binding> {
        self.ensure(kind)?;
        Ok(Binding {
            api: self.api.clone(),
            region: self.region.clone(),
            ctx: self.ctx.child(),
        })
    }
}

// VNic is not implemented: network interfaces are implicit in generic servers.
impl CloudConnection for GenericConnection {
    fn capability(&self) -> CapabilityInfo {
        self.capability
    }

    fn region(&self) -> &RegionInfo {
        &self.region
    }

    fn cancellation_token(&self) -> CancellationToken {
        self.ctx.token().clone()
    }

    fn create_vm_handler(&self) -> Result<Box<dyn VmHandler>> {
        Ok(Box::new(GenericVmHandler(self.bind(ResourceKind::Vm)?)))
    }

    fn create_image_handler(&self) -> Result<Box<dyn ImageHandler>> {
        Ok(Box::new(GenericImageHandler(self.bind(ResourceKind::Image)?)))
    }

    fn create_public_ip_handler(&self) -> Result<Box<dyn PublicIpHandler>> {
        Ok(Box::new(GenericPublicIpHandler(self.bind(ResourceKind::PublicIp)?)))
    }

    fn create_security_handler(&self) -> Result<Box<dyn SecurityHandler>> {
        Ok(Box::new(GenericSecurityHandler(self.bind(ResourceKind::Security)?)))
    }

    fn create_vnetwork_handler(&self) -> Result<Box<dyn VNetworkHandler>> {
        Ok(Box::new(GenericVNetworkHandler(self.bind(ResourceKind::VNetwork)?)))
    }

    fn create_key_pair_handler(&self) -> Result<Box<dyn KeyPairHandler>> {
        Ok(Box::new(GenericKeyPairHandler(self.bind(ResourceKind::KeyPair)?)))
    }
}
