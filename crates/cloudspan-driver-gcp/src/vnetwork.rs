//! Global VPC networks

use crate::api::{GLOBAL, Network, NetworkInsert, OperationScope};
use crate::connection::Binding;
use async_trait::async_trait;
use cloudspan_driver::translate::{last_segment, require_str, translate_all};
use cloudspan_driver::{
    NO_STATUS, ResourceKind, Result, VNetworkHandler, VNetworkInfo, VNetworkReqInfo, id,
};

const KIND: ResourceKind = ResourceKind::VNetwork;

/// Networks carry no lifecycle status, so the placeholder is reported
pub fn translate_network(network: Network) -> Result<VNetworkInfo> {
    let name = require_str(network.name.as_deref(), KIND, "name")?;
    Ok(VNetworkInfo {
        id: id::encode(GLOBAL, &name)?,
        name,
        address_prefix: network.ipv4_range,
        subnets: network
            .subnetworks
            .unwrap_or_default()
            .into_iter()
            .map(|url| last_segment(&url).to_string())
            .collect(),
        status: NO_STATUS.to_string(),
    })
}

pub struct GcpVNetworkHandler(pub(crate) Binding);

impl GcpVNetworkHandler {
    async fn fetch(&self, name: &str) -> Result<VNetworkInfo> {
        let network = self.0.ctx.call(self.0.api.get_network(name)).await?;
        translate_network(network)
    }
}

#[async_trait]
impl VNetworkHandler for GcpVNetworkHandler {
    async fn create_vnetwork(&self, req: VNetworkReqInfo) -> Result<VNetworkInfo> {
        req.validate()?;
        // a legacy network takes the range; without one, subnets are created per region
        let body = NetworkInsert {
            auto_create_subnetworks: req.address_prefix.is_none().then_some(true),
            ipv4_range: req.address_prefix,
            name: req.name,
        };

        tracing::info!("Creating network {}", body.name);
        let op = self.0.ctx.call(self.0.api.insert_network(&body)).await?;
        self.0.complete(OperationScope::Global, op).await?;
        self.fetch(&body.name).await
    }

    async fn list_vnetwork(&self) -> Result<Vec<VNetworkInfo>> {
        let networks = self.0.ctx.call(self.0.api.list_networks()).await?;
        translate_all(networks, translate_network)
    }

    async fn get_vnetwork(&self, vnet_id: &str) -> Result<VNetworkInfo> {
        let name = id::decode_in_scope(vnet_id, GLOBAL)?;
        self.fetch(&name).await
    }

    async fn delete_vnetwork(&self, vnet_id: &str) -> Result<bool> {
        let name = id::decode_in_scope(vnet_id, GLOBAL)?;
        let op = self.0.ctx.call(self.0.api.delete_network(&name)).await?;
        self.0.complete(OperationScope::Global, op).await?;
        tracing::info!("Deleted network {}", vnet_id);
        Ok(true)
    }
}
