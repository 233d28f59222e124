//! Network interfaces
//!
//! Azure attaches addresses and security groups to the NIC rather than the
//! VM, so this handler is where a VM's networking is put together.

use crate::api::{
    IpConfigurationProperties, NetworkInterface, NicProperties, Resource, ResourceType,
    SubResource, body, decode,
};
use crate::connection::Binding;
use crate::path::{ResourcePath, id_from_path, resource_path};
use async_trait::async_trait;
use cloudspan_driver::translate::{require_str, translate_all};
use cloudspan_driver::{
    NO_STATUS, ResourceKind, Result, VNicHandler, VNicInfo, VNicReqInfo,
};

const KIND: ResourceKind = ResourceKind::VNic;
const IP_CONFIGURATION: &str = "ipconfig1";

fn optional_id(reference: Option<SubResource>, group: &str, what: &str) -> Result<Option<String>> {
    reference
        .and_then(|r| r.id)
        .map(|path| id_from_path(&path, group, what))
        .transpose()
}

pub fn translate_vnic(nic: NetworkInterface, group: &str) -> Result<VNicInfo> {
    let props = nic.properties.unwrap_or_default();
    let primary = props
        .ip_configurations
        .into_iter()
        .next()
        .and_then(|c| c.properties)
        .unwrap_or_default();

    Ok(VNicInfo {
        id: id_from_path(&require_str(nic.id.as_deref(), KIND, "id")?, group, "vnic id")?,
        name: require_str(nic.name.as_deref(), KIND, "name")?,
        mac_address: props.mac_address,
        private_ip: primary.private_ip_address,
        public_ip_id: optional_id(primary.public_ip_address, group, "public ip")?,
        security_group_id: optional_id(props.network_security_group, group, "security group")?,
        attached_vm_id: optional_id(props.virtual_machine, group, "virtual machine")?,
        status: props
            .provisioning_state
            .unwrap_or_else(|| NO_STATUS.to_string()),
    })
}

/// Canonical id of the virtual network a subnet path belongs to
pub fn vnetwork_of_subnet(subnet_path: &str, group: &str) -> Result<String> {
    ResourcePath::parse(subnet_path)?.parent_id("virtualNetworks", group)
}

pub struct AzureVNicHandler(pub(crate) Binding);

impl AzureVNicHandler {
    fn subnet_path(&self, req: &VNicReqInfo) -> String {
        format!(
            "{}/subnets/{}",
            resource_path(
                &self.0.subscription_id,
                &self.0.group,
                ResourceType::VirtualNetworks,
                &req.vnetwork_name
            ),
            req.subnet_name
        )
    }

    fn reference(
        &self,
        kind: ResourceType,
        resource_id: Option<&str>,
    ) -> Result<Option<SubResource>> {
        resource_id
            .map(|id| self.0.path_of(kind, id).map(SubResource::to))
            .transpose()
    }
}

#[async_trait]
impl VNicHandler for AzureVNicHandler {
    async fn create_vnic(&self, req: VNicReqInfo) -> Result<VNicInfo> {
        req.validate()?;
        let request: NetworkInterface = Resource {
            location: Some(self.0.location().to_string()),
            properties: Some(NicProperties {
                ip_configurations: vec![Resource {
                    name: Some(IP_CONFIGURATION.to_string()),
                    properties: Some(IpConfigurationProperties {
                        private_ip_allocation_method: Some("Dynamic".to_string()),
                        subnet: Some(SubResource::to(self.subnet_path(&req))),
                        public_ip_address: self.reference(
                            ResourceType::PublicIpAddresses,
                            req.public_ip_id.as_deref(),
                        )?,
                        ..Default::default()
                    }),
                    ..Default::default()
                }],
                network_security_group: self.reference(
                    ResourceType::NetworkSecurityGroups,
                    req.security_group_id.as_deref(),
                )?,
                ..Default::default()
            }),
            ..Default::default()
        };

        tracing::info!(
            "Creating vnic {} on {}/{}",
            req.name,
            req.vnetwork_name,
            req.subnet_name
        );
        let value = self
            .0
            .create(ResourceType::NetworkInterfaces, &req.name, body(KIND, &request)?)
            .await?;
        translate_vnic(decode(KIND, value)?, &self.0.group)
    }

    async fn list_vnic(&self) -> Result<Vec<VNicInfo>> {
        let values = self
            .0
            .ctx
            .call(self.0.api.list(&self.0.group, ResourceType::NetworkInterfaces))
            .await?;
        translate_all(values, |v| {
            decode(KIND, v).and_then(|n| translate_vnic(n, &self.0.group))
        })
    }

    async fn get_vnic(&self, vnic_id: &str) -> Result<VNicInfo> {
        let name = self.0.name_of(vnic_id)?;
        let value = self.0.fetch(ResourceType::NetworkInterfaces, &name).await?;
        translate_vnic(decode(KIND, value)?, &self.0.group)
    }

    async fn delete_vnic(&self, vnic_id: &str) -> Result<bool> {
        let name = self.0.name_of(vnic_id)?;
        self.0.remove(ResourceType::NetworkInterfaces, &name).await?;
        tracing::info!("Deleted vnic {}", vnic_id);
        Ok(true)
    }
}
