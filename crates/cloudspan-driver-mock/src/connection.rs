//! Mock connection

use crate::handlers::{
    MockImageHandler, MockKeyPairHandler, MockPublicIpHandler, MockSecurityHandler,
    MockVNetworkHandler, MockVNicHandler, MockVmHandler,
};
use crate::store::MockCloud;
use cloudspan_driver::{
    CallContext, CapabilityInfo, CloudConnection, CredentialInfo, ImageHandler, KeyPairHandler,
    PublicIpHandler, RegionInfo, ResourceKind, Result, SecurityHandler, VNetworkHandler,
    VNicHandler, VmHandler, WaitConfig,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Fields every mock handler is bound to
#[derive(Clone)]
pub(crate) struct Binding {
    pub cloud: Arc<MockCloud>,
    pub region: RegionInfo,
    /// Id scope: the resource group if set, otherwise the region
    pub scope: String,
    pub ctx: CallContext,
}

pub struct MockConnection {
    cloud: Arc<MockCloud>,
    capability: CapabilityInfo,
    #[allow(dead_code)]
    credential: CredentialInfo,
    region: RegionInfo,
    ctx: CallContext,
}

impl MockConnection {
    pub(crate) fn new(
        cloud: Arc<MockCloud>,
        capability: CapabilityInfo,
        credential: CredentialInfo,
        region: RegionInfo,
        wait: WaitConfig,
    ) -> Self {
        Self {
            cloud,
            capability,
            credential,
            region,
            ctx: CallContext::new(wait),
        }
    }

    fn bind(&self, kind: ResourceKind) -> Result<Binding> {
        self.ensure(kind)?;
        let scope = self
            .region
            .resource_group()
            .unwrap_or(self.region.region())
            .to_string();
        Ok(Binding {
            cloud: self.cloud.clone(),
            region: self.region.clone(),
            scope,
            ctx: self.ctx.child(),
        })
    }
}

impl CloudConnection for MockConnection {
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
        Ok(Box::new(MockVmHandler(self.bind(ResourceKind::Vm)?)))
    }

    fn create_image_handler(&self) -> Result<Box<dyn ImageHandler>> {
        Ok(Box::new(MockImageHandler(self.bind(ResourceKind::Image)?)))
    }

    fn create_public_ip_handler(&self) -> Result<Box<dyn PublicIpHandler>> {
        Ok(Box::new(MockPublicIpHandler(self.bind(ResourceKind::PublicIp)?)))
    }

    fn create_security_handler(&self) -> Result<Box<dyn SecurityHandler>> {
        Ok(Box::new(MockSecurityHandler(self.bind(ResourceKind::Security)?)))
    }

    fn create_vnetwork_handler(&self) -> Result<Box<dyn VNetworkHandler>> {
        Ok(Box::new(MockVNetworkHandler(self.bind(ResourceKind::VNetwork)?)))
    }

    fn create_vnic_handler(&self) -> Result<Box<dyn VNicHandler>> {
        Ok(Box::new(MockVNicHandler(self.bind(ResourceKind::VNic)?)))
    }

    fn create_key_pair_handler(&self) -> Result<Box<dyn KeyPairHandler>> {
        Ok(Box::new(MockKeyPairHandler(self.bind(ResourceKind::KeyPair)?)))
    }
}
