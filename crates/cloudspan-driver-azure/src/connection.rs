//! Azure connection

use crate::api::{Accepted, ArmApi, ArmSession, OperationRef, ResourceType};
use crate::image::AzureImageHandler;
use crate::operation::AzureOperation;
use crate::path::resource_path;
use crate::public_ip::AzurePublicIpHandler;
use crate::security::AzureSecurityHandler;
use crate::vm::AzureVmHandler;
use crate::vnetwork::AzureVNetworkHandler;
use crate::vnic::AzureVNicHandler;
use cloudspan_driver::{
    CallContext, CapabilityInfo, CloudConnection, DriverError, ImageHandler, PublicIpHandler,
    RegionInfo, ResourceKind, Result, SecurityHandler, VNetworkHandler, VNicHandler, VmHandler,
    WaitConfig, id,
};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Fields every Azure handler is bound to
pub(crate) struct Binding {
    pub api: Arc<dyn ArmApi>,
    pub subscription_id: String,
    pub region: RegionInfo,
    pub group: String,
    pub ctx: CallContext,
}

impl Binding {
    pub fn location(&self) -> &str {
        self.region.region()
    }

    /// Name part of a canonical id in the bound resource group
    pub fn name_of(&self, resource_id: &str) -> Result<String> {
        id::decode_in_scope(resource_id, &self.group)
    }

    /// Full ARM path of a canonical id of type `kind`
    pub fn path_of(&self, kind: ResourceType, resource_id: &str) -> Result<String> {
        let name = self.name_of(resource_id)?;
        Ok(resource_path(&self.subscription_id, &self.group, kind, &name))
    }

    pub async fn fetch(&self, kind: ResourceType, name: &str) -> Result<Value> {
        self.ctx.call(self.api.get(&self.group, kind, name)).await
    }

    /// Fails early on a taken name; the create-only PUT catches later races
    pub async fn ensure_absent(&self, kind: ResourceType, name: &str) -> Result<()> {
        match self.fetch(kind, name).await {
            Ok(_) => Err(DriverError::AlreadyExists(id::encode(&self.group, name)?)),
            Err(DriverError::NotFound(_)) => Ok(()),
            Err(other) => Err(other),
        }
    }

    /// Create `name`, wait for provisioning, and read it back
    pub async fn create(&self, kind: ResourceType, name: &str, body: Value) -> Result<Value> {
        self.ensure_absent(kind, name).await?;
        let Accepted { operation, .. } = self
            .ctx
            .call(self.api.put(&self.group, kind, name, body))
            .await
            .map_err(|e| match e {
                DriverError::AlreadyExists(_) => match id::encode(&self.group, name) {
                    Ok(canonical) => DriverError::AlreadyExists(canonical),
                    Err(invalid) => invalid,
                },
                other => other,
            })?;
        self.complete(operation).await?;
        self.fetch(kind, name).await
    }

    pub async fn remove(&self, kind: ResourceType, name: &str) -> Result<()> {
        let operation = self
            .ctx
            .call(self.api.delete(&self.group, kind, name))
            .await?;
        self.complete(operation).await
    }

    /// Block until the operation, if any, is done
    pub async fn complete(&self, operation: Option<OperationRef>) -> Result<()> {
        match operation {
            Some(operation) => {
                self.ctx
                    .wait(&AzureOperation::new(self.api.clone(), operation))
                    .await
            }
            None => Ok(()),
        }
    }
}

pub struct AzureConnection {
    session: ArmSession,
    capability: CapabilityInfo,
    region: RegionInfo,
    group: String,
    ctx: CallContext,
}

impl AzureConnection {
    pub(crate) fn new(
        session: ArmSession,
        capability: CapabilityInfo,
        region: RegionInfo,
        group: String,
        wait: WaitConfig,
    ) -> Self {
        Self {
            session,
            capability,
            region,
            group,
            ctx: CallContext::new(wait),
        }
    }

    pub fn subscription_id(&self) -> &str {
        &self.session.subscription_id
    }

    fn bind(&self, kind: ResourceKind) -> Result<Binding> {
        self.ensure(kind)?;
        Ok(Binding {
            api: self.session.api.clone(),
            subscription_id: self.session.subscription_id.clone(),
            region: self.region.clone(),
            group: self.group.clone(),
            ctx: self.ctx.child(),
        })
    }
}

impl CloudConnection for AzureConnection {
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
        Ok(Box::new(AzureVmHandler(self.bind(ResourceKind::Vm)?)))
    }

    fn create_image_handler(&self) -> Result<Box<dyn ImageHandler>> {
        Ok(Box::new(AzureImageHandler(self.bind(ResourceKind::Image)?)))
    }

    fn create_public_ip_handler(&self) -> Result<Box<dyn PublicIpHandler>> {
        Ok(Box::new(AzurePublicIpHandler(self.bind(ResourceKind::PublicIp)?)))
    }

    fn create_security_handler(&self) -> Result<Box<dyn SecurityHandler>> {
        Ok(Box::new(AzureSecurityHandler(self.bind(ResourceKind::Security)?)))
    }

    fn create_vnetwork_handler(&self) -> Result<Box<dyn VNetworkHandler>> {
        Ok(Box::new(AzureVNetworkHandler(self.bind(ResourceKind::VNetwork)?)))
    }

    fn create_vnic_handler(&self) -> Result<Box<dyn VNicHandler>> {
        Ok(Box::new(AzureVNicHandler(self.bind(ResourceKind::VNic)?)))
    }
}
