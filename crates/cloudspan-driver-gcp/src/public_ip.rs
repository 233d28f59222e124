//! Regional static addresses as public IPs

use crate::api::{Address, AddressInsert, OperationScope};
use crate::connection::Binding;
use async_trait::async_trait;
use cloudspan_driver::translate::{require_str, translate_all};
use cloudspan_driver::{
    PublicIpHandler, PublicIpInfo, PublicIpReqInfo, PublicIpStatus, ResourceKind, Result, id,
};

const KIND: ResourceKind = ResourceKind::PublicIp;

fn address_status(status: Option<&str>) -> PublicIpStatus {
    match status {
        Some("RESERVING") => PublicIpStatus::Reserving,
        Some("RESERVED") => PublicIpStatus::Reserved,
        Some("IN_USE") => PublicIpStatus::InUse,
        _ => PublicIpStatus::Unknown,
    }
}

/// `.../zones/<zone>/instances/<name>` → `<zone>:<name>`; other users are kept verbatim
fn user_id(url: &str) -> String {
    let segments: Vec<&str> = url.trim_end_matches('/').split('/').collect();
    match segments.as_slice() {
        [.., "zones", zone, "instances", name] => {
            id::encode(zone, name).unwrap_or_else(|_| url.to_string())
        }
        _ => url.to_string(),
    }
}

pub fn translate_address(address: Address, region: &str) -> Result<PublicIpInfo> {
    let name = require_str(address.name.as_deref(), KIND, "name")?;
    Ok(PublicIpInfo {
        id: id::encode(region, &name)?,
        name,
        ip_address: address.address,
        status: address_status(address.status.as_deref()),
        attached_to: address
            .users
            .as_ref()
            .and_then(|users| users.first())
            .map(|u| user_id(u)),
    })
}

pub struct GcpPublicIpHandler(pub(crate) Binding);

impl GcpPublicIpHandler {
    fn region(&self) -> &str {
        self.0.region.region()
    }

    fn scope(&self) -> OperationScope {
        OperationScope::Region(self.region().to_string())
    }

    async fn fetch(&self, name: &str) -> Result<PublicIpInfo> {
        let address = self
            .0
            .ctx
            .call(self.0.api.get_address(self.region(), name))
            .await?;
        translate_address(address, self.region())
    }
}

#[async_trait]
impl PublicIpHandler for GcpPublicIpHandler {
    async fn create_public_ip(&self, req: PublicIpReqInfo) -> Result<PublicIpInfo> {
        req.validate()?;
        let body = AddressInsert { name: req.name };

        tracing::info!("Reserving address {} in {}", body.name, self.region());
        let op = self
            .0
            .ctx
            .call(self.0.api.insert_address(self.region(), &body))
            .await?;
        self.0.complete(self.scope(), op).await?;
        self.fetch(&body.name).await
    }

    async fn list_public_ip(&self) -> Result<Vec<PublicIpInfo>> {
        let addresses = self
            .0
            .ctx
            .call(self.0.api.list_addresses(self.region()))
            .await?;
        translate_all(addresses, |a| translate_address(a, self.region()))
    }

    async fn get_public_ip(&self, ip_id: &str) -> Result<PublicIpInfo> {
        let name = id::decode_in_scope(ip_id, self.region())?;
        self.fetch(&name).await
    }

    async fn delete_public_ip(&self, ip_id: &str) -> Result<bool> {
        let name = id::decode_in_scope(ip_id, self.region())?;
        let op = self
            .0
            .ctx
            .call(self.0.api.delete_address(self.region(), &name))
            .await?;
        self.0.complete(self.scope(), op).await?;
        tracing::info!("Released address {}", ip_id);
        Ok(true)
    }
}
