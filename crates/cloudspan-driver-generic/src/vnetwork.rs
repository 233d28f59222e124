//! Subnets as virtual networks
//!
//! Generic subnets are flat: one address range, no child subnets.

use crate::api::{Collection, Subnet, SubnetCreate, body, decode};
use crate::connection::Binding;
use async_trait::async_trait;
use cloudspan_driver::id::validate_opaque;
use cloudspan_driver::translate::{require_str, translate_all};
use cloudspan_driver::{
    DriverError, NO_STATUS, ResourceKind, Result, VNetworkHandler, VNetworkInfo, VNetworkReqInfo,
};

const KIND: ResourceKind = ResourceKind::VNetwork;

pub fn translate_subnet(subnet: Subnet) -> Result<VNetworkInfo> {
    Ok(VNetworkInfo {
        id: require_str(subnet.id.as_deref(), KIND, "id")?,
        name: require_str(subnet.name.as_deref(), KIND, "name")?,
        address_prefix: subnet.addr,
        subnets: Vec::new(),
        status: subnet.state.unwrap_or_else(|| NO_STATUS.to_string()),
    })
}

pub struct GenericVNetworkHandler(pub(crate) Binding);

#[async_trait]
impl VNetworkHandler for GenericVNetworkHandler {
    async fn create_vnetwork(&self, req: VNetworkReqInfo) -> Result<VNetworkInfo> {
        req.validate()?;
        let addr = req.address_prefix.ok_or_else(|| {
            DriverError::InvalidRequest("generic subnets require an address_prefix".to_string())
        })?;
        let request = body(
            KIND,
            &SubnetCreate {
                name: req.name,
                addr,
            },
        )?;

        let value = self
            .0
            .ctx
            .call(self.0.api.create(Collection::Subnets, request))
            .await?;
        let network = translate_subnet(decode(KIND, value)?)?;
        tracing::info!("Created subnet {} ({})", network.name, network.id);
        Ok(network)
    }

    async fn list_vnetwork(&self) -> Result<Vec<VNetworkInfo>> {
        let values = self.0.ctx.call(self.0.api.list(Collection::Subnets)).await?;
        translate_all(values, |v| decode(KIND, v).and_then(translate_subnet))
    }

    async fn get_vnetwork(&self, id: &str) -> Result<VNetworkInfo> {
        validate_opaque(id)?;
        let value = self
            .0
            .ctx
            .call(self.0.api.get(Collection::Subnets, id))
            .await?;
        translate_subnet(decode(KIND, value)?)
    }

    async fn delete_vnetwork(&self, id: &str) -> Result<bool> {
        validate_opaque(id)?;
        self.0
            .ctx
            .call(self.0.api.delete(Collection::Subnets, id))
            .await?;
        tracing::info!("Deleted subnet {}", id);
        Ok(true)
    }
}
