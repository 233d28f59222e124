//! Adaptive IPs as public IPs

use crate::api::{AdaptiveIp, Collection, NameOnly, body, decode};
use crate::connection::Binding;
use async_trait::async_trait;
use cloudspan_driver::id::validate_opaque;
use cloudspan_driver::translate::{require_str, translate_all};
use cloudspan_driver::{
    PublicIpHandler, PublicIpInfo, PublicIpReqInfo, PublicIpStatus, ResourceKind, Result,
};

const KIND: ResourceKind = ResourceKind::PublicIp;

fn address_status(state: Option<&str>) -> PublicIpStatus {
    match state.map(str::to_ascii_uppercase).as_deref() {
        Some("ALLOCATING") => PublicIpStatus::Reserving,
        Some("AVAILABLE") => PublicIpStatus::Reserved,
        Some("ATTACHED") => PublicIpStatus::InUse,
        _ => PublicIpStatus::Unknown,
    }
}

pub fn translate_adaptive_ip(ip: AdaptiveIp) -> Result<PublicIpInfo> {
    Ok(PublicIpInfo {
        id: require_str(ip.id.as_deref(), KIND, "id")?,
        name: require_str(ip.name.as_deref(), KIND, "name")?,
        status: address_status(ip.state.as_deref()),
        ip_address: ip.ip,
        attached_to: ip.server_id,
    })
}

pub struct GenericPublicIpHandler(pub(crate) Binding);

#[async_trait]
impl PublicIpHandler for GenericPublicIpHandler {
    async fn create_public_ip(&self, req: PublicIpReqInfo) -> Result<PublicIpInfo> {
        req.validate()?;
        let request = body(KIND, &NameOnly { name: req.name })?;

        let value = self
            .0
            .ctx
            .call(self.0.api.create(Collection::AdaptiveIps, request))
            .await?;
        let ip = translate_adaptive_ip(decode(KIND, value)?)?;
        tracing::info!("Allocated adaptive IP {} ({})", ip.name, ip.id);
        Ok(ip)
    }

    async fn list_public_ip(&self) -> Result<Vec<PublicIpInfo>> {
        let values = self
            .0
            .ctx
            .call(self.0.api.list(Collection::AdaptiveIps))
            .await?;
        translate_all(values, |v| decode(KIND, v).and_then(translate_adaptive_ip))
    }

    async fn get_public_ip(&self, id: &str) -> Result<PublicIpInfo> {
        validate_opaque(id)?;
        let value = self
            .0
            .ctx
            .call(self.0.api.get(Collection::AdaptiveIps, id))
            .await?;
        translate_adaptive_ip(decode(KIND, value)?)
    }

    async fn delete_public_ip(&self, id: &str) -> Result<bool> {
        validate_opaque(id)?;
        self.0
            .ctx
            .call(self.0.api.delete(Collection::AdaptiveIps, id))
            .await?;
        tracing::info!("Released adaptive IP {}", id);
        Ok(true)
    }
}
