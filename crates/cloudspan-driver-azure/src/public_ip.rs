//! Static public IP addresses

use crate::api::{PublicIpAddress, PublicIpProperties, Resource, ResourceType, body, decode};
use crate::connection::Binding;
use crate::path::{ResourcePath, id_from_path};
use async_trait::async_trait;
use cloudspan_driver::translate::{require_str, translate_all};
use cloudspan_driver::{
    DriverError, PublicIpHandler, PublicIpInfo, PublicIpReqInfo, PublicIpStatus, ResourceKind,
    Result,
};

const KIND: ResourceKind = ResourceKind::PublicIp;

/// Attachment wins over provisioning state
fn ip_status(props: &PublicIpProperties) -> PublicIpStatus {
    if props.ip_configuration.is_some() {
        return PublicIpStatus::InUse;
    }
    match props.provisioning_state.as_deref() {
        Some(s) if s.eq_ignore_ascii_case("Succeeded") => PublicIpStatus::Reserved,
        Some(s) if s.eq_ignore_ascii_case("Creating") || s.eq_ignore_ascii_case("Updating") => {
            PublicIpStatus::Reserving
        }
        _ => PublicIpStatus::Unknown,
    }
}

pub fn translate_public_ip(ip: PublicIpAddress, group: &str) -> Result<PublicIpInfo> {
    let props = ip.properties.unwrap_or_default();
    let status = ip_status(&props);
    // the attachment points at `networkInterfaces/<nic>/ipConfigurations/<cfg>`
    let attached_to = props
        .ip_configuration
        .and_then(|c| c.id)
        .map(|path| {
            ResourcePath::parse(&path)
                .and_then(|p| p.parent_id("networkInterfaces", group))
                .map_err(|e| DriverError::TranslationError(format!("ip configuration: {}", e)))
        })
        .transpose()?;

    Ok(PublicIpInfo {
        id: id_from_path(&require_str(ip.id.as_deref(), KIND, "id")?, group, "public ip id")?,
        name: require_str(ip.name.as_deref(), KIND, "name")?,
        ip_address: props.ip_address,
        status,
        attached_to,
    })
}

pub struct AzurePublicIpHandler(pub(crate) Binding);

#[async_trait]
impl PublicIpHandler for AzurePublicIpHandler {
    async fn create_public_ip(&self, req: PublicIpReqInfo) -> Result<PublicIpInfo> {
        req.validate()?;
        let request: PublicIpAddress = Resource {
            location: Some(self.0.location().to_string()),
            properties: Some(PublicIpProperties {
                allocation_method: Some("Static".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        tracing::info!("Allocating public IP {} in {}", req.name, self.0.group);
        let value = self
            .0
            .create(ResourceType::PublicIpAddresses, &req.name, body(KIND, &request)?)
            .await?;
        translate_public_ip(decode(KIND, value)?, &self.0.group)
    }

    async fn list_public_ip(&self) -> Result<Vec<PublicIpInfo>> {
        let values = self
            .0
            .ctx
            .call(self.0.api.list(&self.0.group, ResourceType::PublicIpAddresses))
            .await?;
        translate_all(values, |v| {
            decode(KIND, v).and_then(|ip| translate_public_ip(ip, &self.0.group))
        })
    }

    async fn get_public_ip(&self, ip_id: &str) -> Result<PublicIpInfo> {
        let name = self.0.name_of(ip_id)?;
        let value = self.0.fetch(ResourceType::PublicIpAddresses, &name).await?;
        translate_public_ip(decode(KIND, value)?, &self.0.group)
    }

    async fn delete_public_ip(&self, ip_id: &str) -> Result<bool> {
        let name = self.0.name_of(ip_id)?;
        self.0.remove(ResourceType::PublicIpAddresses, &name).await?;
        tracing::info!("Released public IP {}", ip_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const IP: &str =
        "/subscriptions/0000/resourceGroups/rg1/providers/Microsoft.Network/publicIPAddresses/ip1";

    #[test]
    fn test_reserved_and_attached() {
        let reserved: PublicIpAddress = decode(
            KIND,
            json!({"id": IP, "name": "ip1", "properties": {"ipAddress": "20.1.2.3", "provisioningState": "Succeeded"}}),
        )
        .unwrap();
        let info = translate_public_ip(reserved, "rg1").unwrap();
        assert_eq!(info.id, "rg1:ip1");
        assert_eq!(info.status, PublicIpStatus::Reserved);
        assert!(info.attached_to.is_none());

        let attached: PublicIpAddress = decode(
            KIND,
            json!({"id": IP, "name": "ip1", "properties": {
                "provisioningState": "Succeeded",
                "ipConfiguration": {"id": "/subscriptions/0000/resourceGroups/rg1/providers/Microsoft.Network/networkInterfaces/nic1/ipConfigurations/ipconfig1"}
            }}),
        )
        .unwrap();
        let info = translate_public_ip(attached, "rg1").unwrap();
        assert_eq!(info.status, PublicIpStatus::InUse);
        assert_eq!(info.attached_to.as_deref(), Some("rg1:nic1"));
    }

    #[test]
    fn test_creating_is_reserving() {
        let props = PublicIpProperties {
            provisioning_state: Some("Creating".into()),
            ..Default::default()
        };
        assert_eq!(ip_status(&props), PublicIpStatus::Reserving);
        assert_eq!(ip_status(&PublicIpProperties::default()), PublicIpStatus::Unknown);
    }
}
