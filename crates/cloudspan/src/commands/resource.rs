//! Kind-generic list / get / create / delete

use super::{print_json, read_request};
use anyhow::bail;
use cloudspan_driver::{
    CloudConnection, ImageReqInfo, KeyPairReqInfo, PublicIpReqInfo, ResourceKind,
    SecurityReqInfo, VNetworkReqInfo, VNicReqInfo,
};
use serde_json::json;
use std::path::Path;

pub async fn list(conn: &dyn CloudConnection, kind: ResourceKind) -> anyhow::Result<()> {
    match kind {
        ResourceKind::Vm => print_json(&conn.create_vm_handler()?.list_vm().await?),
        ResourceKind::Image => print_json(&conn.create_image_handler()?.list_image().await?),
        ResourceKind::PublicIp => {
            print_json(&conn.create_public_ip_handler()?.list_public_ip().await?)
        }
        ResourceKind::Security => {
            print_json(&conn.create_security_handler()?.list_security().await?)
        }
        ResourceKind::VNetwork => {
            print_json(&conn.create_vnetwork_handler()?.list_vnetwork().await?)
        }
        ResourceKind::VNic => print_json(&conn.create_vnic_handler()?.list_vnic().await?),
        ResourceKind::KeyPair => print_json(&conn.create_key_pair_handler()?.list_key().await?),
    }
}

pub async fn get(conn: &dyn CloudConnection, kind: ResourceKind, id: &str) -> anyhow::Result<()> {
    match kind {
        ResourceKind::Vm => print_json(&conn.create_vm_handler()?.get_vm(id).await?),
        ResourceKind::Image => print_json(&conn.create_image_handler()?.get_image(id).await?),
        ResourceKind::PublicIp => {
            print_json(&conn.create_public_ip_handler()?.get_public_ip(id).await?)
        }
        ResourceKind::Security => {
            print_json(&conn.create_security_handler()?.get_security(id).await?)
        }
        ResourceKind::VNetwork => {
            print_json(&conn.create_vnetwork_handler()?.get_vnetwork(id).await?)
        }
        ResourceKind::VNic => print_json(&conn.create_vnic_handler()?.get_vnic(id).await?),
        ResourceKind::KeyPair => print_json(&conn.create_key_pair_handler()?.get_key(id).await?),
    }
}

pub async fn create(
    conn: &dyn CloudConnection,
    kind: ResourceKind,
    request: &Path,
) -> anyhow::Result<()> {
    match kind {
        ResourceKind::Vm => bail!("VMs are created with `vm start`"),
        ResourceKind::Image => {
            let req: ImageReqInfo = read_request(request)?;
            print_json(&conn.create_image_handler()?.create_image(req).await?)
        }
        ResourceKind::PublicIp => {
            let req: PublicIpReqInfo = read_request(request)?;
            print_json(&conn.create_public_ip_handler()?.create_public_ip(req).await?)
        }
        ResourceKind::Security => {
            let req: SecurityReqInfo = read_request(request)?;
            print_json(&conn.create_security_handler()?.create_security(req).await?)
        }
        ResourceKind::VNetwork => {
            let req: VNetworkReqInfo = read_request(request)?;
            print_json(&conn.create_vnetwork_handler()?.create_vnetwork(req).await?)
        }
        ResourceKind::VNic => {
            let req: VNicReqInfo = read_request(request)?;
            print_json(&conn.create_vnic_handler()?.create_vnic(req).await?)
        }
        ResourceKind::KeyPair => {
            let req: KeyPairReqInfo = read_request(request)?;
            print_json(&conn.create_key_pair_handler()?.create_key(req).await?)
        }
    }
}

pub async fn delete(
    conn: &dyn CloudConnection,
    kind: ResourceKind,
    id: &str,
) -> anyhow::Result<()> {
    let deleted = match kind {
        ResourceKind::Vm => bail!("VMs are removed with `vm terminate`"),
        ResourceKind::Image => conn.create_image_handler()?.delete_image(id).await?,
        ResourceKind::PublicIp => conn.create_public_ip_handler()?.delete_public_ip(id).await?,
        ResourceKind::Security => conn.create_security_handler()?.delete_security(id).await?,
        ResourceKind::VNetwork => conn.create_vnetwork_handler()?.delete_vnetwork(id).await?,
        ResourceKind::VNic => conn.create_vnic_handler()?.delete_vnic(id).await?,
        ResourceKind::KeyPair => conn.create_key_pair_handler()?.delete_key(id).await?,
    };
    print_json(&json!({ "id": id, "deleted": deleted }))
}
