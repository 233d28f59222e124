//! GCP connection

use crate::api::{ComputeApi, ComputeSession, Operation, OperationScope};
use crate::image::GcpImageHandler;
use crate::operation::GcpOperation;
use crate::public_ip::GcpPublicIpHandler;
use crate::vm::GcpVmHandler;
use crate::vnetwork::GcpVNetworkHandler;
use cloudspan_driver::{
    CallContext, CapabilityInfo, CloudConnection, ImageHandler, PublicIpHandler, RegionInfo,
    ResourceKind, Result, VNetworkHandler, VmHandler, WaitConfig,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Fields every GCP handler is bound to
pub(crate) struct Binding {
    pub api: Arc<dyn ComputeApi>,
    pub region: RegionInfo,
    pub zone: String,
    pub service_account: Option<String>,
    pub ctx: CallContext,
}

impl Binding {
    /// Block until `op` is done, polling it in `scope`
    pub async fn complete(&self, scope: OperationScope, op: Operation) -> Result<()> {
        let operation = GcpOperation::new(self.api.clone(), scope, &op)?;
        self.ctx.wait(&operation).await
    }
}

pub struct GcpConnection {
    session: ComputeSession,
    capability: CapabilityInfo,
    region: RegionInfo,
    zone: String,
    ctx: CallContext,
}

impl GcpConnection {
    pub(crate) fn new(
        session: ComputeSession,
        capability: CapabilityInfo,
        region: RegionInfo,
        zone: String,
        wait: WaitConfig,
    ) -> Self {
        Self {
            session,
            capability,
            region,
            zone,
            ctx: CallContext::new(wait),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.session.project_id
    }

    fn bind(&self, kind: ResourceKind) -> Result<Binding> {
        self.ensure(kind)?;
        Ok(Binding {
            api: self.session.api.clone(),
            region: self.region.clone(),
            zone: self.zone.clone(),
            service_account: self.session.service_account.clone(),
            ctx: self.ctx.child(),
        })
    }
}

impl CloudConnection for GcpConnection {
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
        Ok(Box::new(GcpVmHandler(self.bind(ResourceKind::Vm)?)))
    }

    fn create_image_handler(&self) -> Result<Box<dyn ImageHandler>> {
        Ok(Box::new(GcpImageHandler(self.bind(ResourceKind::Image)?)))
    }

    fn create_public_ip_handler(&self) -> Result<Box<dyn PublicIpHandler>> {
        Ok(Box::new(GcpPublicIpHandler(self.bind(ResourceKind::PublicIp)?)))
    }

    fn create_vnetwork_handler(&self) -> Result<Box<dyn VNetworkHandler>> {
        Ok(Box::new(GcpVNetworkHandler(self.bind(ResourceKind::VNetwork)?)))
    }
}
