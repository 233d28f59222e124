//! Virtual networks
//!
//! Each network is created with a single `default` subnet spanning the
//! whole address space, which is what VNics attach to unless told otherwise.

use crate::api::{
    AddressSpace, Resource, ResourceType, SubnetProperties, VNetProperties, VirtualNetwork, body,
    decode,
};
use crate::connection::Binding;
use crate::path::id_from_path;
use async_trait::async_trait;
use cloudspan_driver::translate::{require_str, translate_all};
use cloudspan_driver::{
    NO_STATUS, ResourceKind, Result, VNetworkHandler, VNetworkInfo, VNetworkReqInfo,
};

const KIND: ResourceKind = ResourceKind::VNetwork;
pub const DEFAULT_ADDRESS_PREFIX: &str = "10.0.0.0/16";
pub const DEFAULT_SUBNET: &str = "default";

pub fn translate_vnetwork(network: VirtualNetwork, group: &str) -> Result<VNetworkInfo> {
    let props = network.properties.unwrap_or_default();
    Ok(VNetworkInfo {
        id: id_from_path(&require_str(network.id.as_deref(), KIND, "id")?, group, "vnetwork id")?,
        name: require_str(network.name.as_deref(), KIND, "name")?,
        address_prefix: props
            .address_space
            .and_then(|s| s.address_prefixes.into_iter().next()),
        subnets: props.subnets.into_iter().filter_map(|s| s.name).collect(),
        status: props
            .provisioning_state
            .unwrap_or_else(|| NO_STATUS.to_string()),
    })
}

pub struct AzureVNetworkHandler(pub(crate) Binding);

#[async_trait]
impl VNetworkHandler for AzureVNetworkHandler {
    async fn create_vnetwork(&self, req: VNetworkReqInfo) -> Result<VNetworkInfo> {
        req.validate()?;
        let prefix = req
            .address_prefix
            .clone()
            .unwrap_or_else(|| DEFAULT_ADDRESS_PREFIX.to_string());
        let request: VirtualNetwork = Resource {
            location: Some(self.0.location().to_string()),
            properties: Some(VNetProperties {
                address_space: Some(AddressSpace {
                    address_prefixes: vec![prefix.clone()],
                }),
                subnets: vec![Resource {
                    name: Some(DEFAULT_SUBNET.to_string()),
                    properties: Some(SubnetProperties {
                        address_prefix: Some(prefix.clone()),
                    }),
                    ..Default::default()
                }],
                provisioning_state: None,
            }),
            ..Default::default()
        };

        tracing::info!("Creating vnetwork {} ({}) in {}", req.name, prefix, self.0.group);
        let value = self
            .0
            .create(ResourceType::VirtualNetworks, &req.name, body(KIND, &request)?)
            .await?;
        translate_vnetwork(decode(KIND, value)?, &self.0.group)
    }

    async fn list_vnetwork(&self) -> Result<Vec<VNetworkInfo>> {
        let values = self
            .0
            .ctx
            .call(self.0.api.list(&self.0.group, ResourceType::VirtualNetworks))
            .await?;
        translate_all(values, |v| {
            decode(KIND, v).and_then(|n| translate_vnetwork(n, &self.0.group))
        })
    }

    async fn get_vnetwork(&self, vnetwork_id: &str) -> Result<VNetworkInfo> {
        let name = self.0.name_of(vnetwork_id)?;
        let value = self.0.fetch(ResourceType::VirtualNetworks, &name).await?;
        translate_vnetwork(decode(KIND, value)?, &self.0.group)
    }

    async fn delete_vnetwork(&self, vnetwork_id: &str) -> Result<bool> {
        let name = self.0.name_of(vnetwork_id)?;
        self.0.remove(ResourceType::VirtualNetworks, &name).await?;
        tracing::info!("Deleted vnetwork {}", vnetwork_id);
        Ok(true)
    }
}
