//! Mock resource handlers
//!
//! Every mutation is applied synchronously; there are no long-running
//! operations. Ids are `scope:name` like the composite-id providers.

use crate::connection::Binding;
use crate::store::{MockState, find, in_scope, insert_new, remove};
use async_trait::async_trait;
use cloudspan_driver::id;
use cloudspan_driver::{
    DriverError, ImageHandler, ImageInfo, ImageReqInfo, KeyPairHandler, KeyPairInfo,
    KeyPairReqInfo, PublicIpHandler, PublicIpInfo, PublicIpReqInfo, PublicIpStatus, Result,
    SecurityHandler, SecurityInfo, SecurityReqInfo, VNetworkHandler, VNetworkInfo,
    VNetworkReqInfo, VNicHandler, VNicInfo, VNicReqInfo, VmHandler, VmInfo, VmReqInfo, VmStatus,
    VmStatusInfo,
};

impl Binding {
    /// Apply `f` to the store unless the call was cancelled
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut MockState) -> Result<T> + Send,
        T: Send,
    {
        self.ctx
            .call(async { f(&mut self.cloud.state()) })
            .await
    }

    fn id_for(&self, name: &str) -> Result<String> {
        id::encode(&self.scope, name)
    }

    fn check_id(&self, id: &str) -> Result<()> {
        id::decode_in_scope(id, &self.scope).map(|_| ())
    }
}

fn status_info(vm: &VmInfo) -> VmStatusInfo {
    VmStatusInfo {
        id: vm.id.clone(),
        status: vm.status,
        detail: vm.status_detail.clone(),
    }
}

/// Move a VM through `transitional` into `target`
fn transition(
    state: &mut MockState,
    id: &str,
    transitional: VmStatus,
    target: VmStatus,
) -> Result<VmStatus> {
    let vm = state
        .vms
        .get_mut(id)
        .ok_or_else(|| DriverError::NotFound(id.to_string()))?;
    vm.status.ensure_transition(id, transitional)?;
    vm.status = target;
    vm.status_detail = target.to_string();
    Ok(target)
}

pub struct MockVmHandler(pub(crate) Binding);

#[async_trait]
impl VmHandler for MockVmHandler {
    async fn start_vm(&self, req: VmReqInfo) -> Result<VmInfo> {
        req.validate()?;
        let vm_id = self.0.id_for(&req.name)?;
        if let Some(vnic) = &req.vnic_id {
            self.0.check_id(vnic)?;
        }
        if let Some(ip) = &req.public_ip_id {
            self.0.check_id(ip)?;
        }
        let region = self.0.region.clone();

        let vm = self
            .0
            .run(move |state| {
                if state.vms.contains_key(&vm_id) {
                    return Err(DriverError::AlreadyExists(vm_id));
                }
                if let Some(vnic) = &req.vnic_id {
                    find(&state.vnics, vnic)?;
                }
                let public_ip = match &req.public_ip_id {
                    Some(ip_id) => {
                        let ip = state
                            .public_ips
                            .get_mut(ip_id)
                            .ok_or_else(|| DriverError::NotFound(ip_id.clone()))?;
                        if ip.status == PublicIpStatus::InUse {
                            return Err(DriverError::OperationFailed(format!(
                                "public IP {} is already in use",
                                ip_id
                            )));
                        }
                        ip.status = PublicIpStatus::InUse;
                        ip.attached_to = Some(vm_id.clone());
                        ip.ip_address.clone()
                    }
                    None => None,
                };

                let vm = VmInfo {
                    id: vm_id.clone(),
                    name: req.name.clone(),
                    region,
                    image_id: Some(req.image_id.clone()),
                    spec_id: req.spec_id.clone(),
                    vnic_id: req.vnic_id.clone(),
                    vnetwork_id: req.vnetwork_id.clone(),
                    public_ip,
                    private_ip: None,
                    security_group_ids: req.security_group_ids.clone(),
                    key_pair_name: req.key_pair_name.clone(),
                    guest_user_id: req.login_user.clone(),
                    guest_boot_disk: Some(format!("{}-osdisk", req.name)),
                    status: VmStatus::Running,
                    status_detail: VmStatus::Running.to_string(),
                };
                insert_new(&mut state.vms, &vm_id, vm.clone())?;
                Ok(vm)
            })
            .await?;

        tracing::info!("Started mock VM {}", vm.id);
        Ok(vm)
    }

    async fn suspend_vm(&self, id: &str) -> Result<VmStatus> {
        self.0.check_id(id)?;
        self.0
            .run(|state| transition(state, id, VmStatus::Suspending, VmStatus::Suspended))
            .await
    }

    async fn resume_vm(&self, id: &str) -> Result<VmStatus> {
        self.0.check_id(id)?;
        self.0
            .run(|state| transition(state, id, VmStatus::Resuming, VmStatus::Running))
            .await
    }

    async fn reboot_vm(&self, id: &str) -> Result<VmStatus> {
        self.0.check_id(id)?;
        self.0
            .run(|state| transition(state, id, VmStatus::Rebooting, VmStatus::Running))
            .await
    }

    async fn terminate_vm(&self, id: &str) -> Result<VmStatus> {
        self.0.check_id(id)?;
        self.0
            .run(|state| {
                transition(state, id, VmStatus::Terminating, VmStatus::Terminated)?;
                remove(&mut state.vms, id)?;
                for ip in state.public_ips.values_mut() {
                    if ip.attached_to.as_deref() == Some(id) {
                        ip.status = PublicIpStatus::Reserved;
                        ip.attached_to = None;
                    }
                }
                Ok(VmStatus::Terminated)
            })
            .await
    }

    async fn list_vm_status(&self) -> Result<Vec<VmStatusInfo>> {
        let scope = self.0.scope.clone();
        self.0
            .run(move |state| Ok(in_scope(&state.vms, &scope).iter().map(status_info).collect()))
            .await
    }

    async fn get_vm_status(&self, id: &str) -> Result<VmStatusInfo> {
        self.0.check_id(id)?;
        self.0.run(|state| find(&state.vms, id).map(status_info)).await
    }

    async fn list_vm(&self) -> Result<Vec<VmInfo>> {
        let scope = self.0.scope.clone();
        self.0.run(move |state| Ok(in_scope(&state.vms, &scope))).await
    }

    async fn get_vm(&self, id: &str) -> Result<VmInfo> {
        self.0.check_id(id)?;
        self.0.run(|state| find(&state.vms, id).cloned()).await
    }
}

pub struct MockImageHandler(pub(crate) Binding);

#[async_trait]
impl ImageHandler for MockImageHandler {
    async fn create_image(&self, req: ImageReqInfo) -> Result<ImageInfo> {
        req.validate()?;
        let image = ImageInfo {
            id: self.0.id_for(&req.name)?,
            name: req.name,
            status: "AVAILABLE".to_string(),
            guest_os: None,
        };
        self.0
            .run(move |state| {
                insert_new(&mut state.images, &image.id.clone(), image.clone())?;
                Ok(image)
            })
            .await
    }

    async fn list_image(&self) -> Result<Vec<ImageInfo>> {
        let scope = self.0.scope.clone();
        self.0.run(move |state| Ok(in_scope(&state.images, &scope))).await
    }

    async fn get_image(&self, id: &str) -> Result<ImageInfo> {
        self.0.check_id(id)?;
        self.0.run(|state| find(&state.images, id).cloned()).await
    }

    async fn delete_image(&self, id: &str) -> Result<bool> {
        self.0.check_id(id)?;
        self.0
            .run(|state| remove(&mut state.images, id).map(|_| true))
            .await
    }
}

pub struct MockPublicIpHandler(pub(crate) Binding);

#[async_trait]
impl PublicIpHandler for MockPublicIpHandler {
    async fn create_public_ip(&self, req: PublicIpReqInfo) -> Result<PublicIpInfo> {
        req.validate()?;
        let ip_id = self.0.id_for(&req.name)?;
        self.0
            .run(move |state| {
                if state.public_ips.contains_key(&ip_id) {
                    return Err(DriverError::AlreadyExists(ip_id));
                }
                let info = PublicIpInfo {
                    id: ip_id.clone(),
                    name: req.name,
                    ip_address: Some(state.allocate_address()),
                    status: PublicIpStatus::Reserved,
                    attached_to: None,
                };
                insert_new(&mut state.public_ips, &ip_id, info.clone())?;
                Ok(info)
            })
            .await
    }

    async fn list_public_ip(&self) -> Result<Vec<PublicIpInfo>> {
        let scope = self.0.scope.clone();
        self.0
            .run(move |state| Ok(in_scope(&state.public_ips, &scope)))
            .await
    }

    async fn get_public_ip(&self, id: &str) -> Result<PublicIpInfo> {
        self.0.check_id(id)?;
        self.0.run(|state| find(&state.public_ips, id).cloned()).await
    }

    async fn delete_public_ip(&self, id: &str) -> Result<bool> {
        self.0.check_id(id)?;
        self.0
            .run(|state| {
                let ip = find(&state.public_ips, id)?;
                if ip.status == PublicIpStatus::InUse {
                    return Err(DriverError::OperationFailed(format!(
                        "public IP {} is attached to {}",
                        id,
                        ip.attached_to.as_deref().unwrap_or("-")
                    )));
                }
                remove(&mut state.public_ips, id).map(|_| true)
            })
            .await
    }
}

pub struct MockSecurityHandler(pub(crate) Binding);

#[async_trait]
impl SecurityHandler for MockSecurityHandler {
    async fn create_security(&self, req: SecurityReqInfo) -> Result<SecurityInfo> {
        req.validate()?;
        let info = SecurityInfo {
            id: self.0.id_for(&req.name)?,
            name: req.name,
            rules: req.rules,
        };
        self.0
            .run(move |state| {
                insert_new(&mut state.securities, &info.id.clone(), info.clone())?;
                Ok(info)
            })
            .await
    }

    async fn list_security(&self) -> Result<Vec<SecurityInfo>> {
        let scope = self.0.scope.clone();
        self.0
            .run(move |state| Ok(in_scope(&state.securities, &scope)))
            .await
    }

    async fn get_security(&self, id: &str) -> Result<SecurityInfo> {
        self.0.check_id(id)?;
        self.0.run(|state| find(&state.securities, id).cloned()).await
    }

    async fn delete_security(&self, id: &str) -> Result<bool> {
        self.0.check_id(id)?;
        self.0
            .run(|state| remove(&mut state.securities, id).map(|_| true))
            .await
    }
}

pub struct MockVNetworkHandler(pub(crate) Binding);

#[async_trait]
impl VNetworkHandler for MockVNetworkHandler {
    async fn create_vnetwork(&self, req: VNetworkReqInfo) -> Result<VNetworkInfo> {
        req.validate()?;
        let info = VNetworkInfo {
            id: self.0.id_for(&req.name)?,
            name: req.name,
            address_prefix: req.address_prefix,
            subnets: vec!["default".to_string()],
            status: "AVAILABLE".to_string(),
        };
        self.0
            .run(move |state| {
                insert_new(&mut state.vnetworks, &info.id.clone(), info.clone())?;
                Ok(info)
            })
            .await
    }

    async fn list_vnetwork(&self) -> Result<Vec<VNetworkInfo>> {
        let scope = self.0.scope.clone();
        self.0
            .run(move |state| Ok(in_scope(&state.vnetworks, &scope)))
            .await
    }

    async fn get_vnetwork(&self, id: &str) -> Result<VNetworkInfo> {
        self.0.check_id(id)?;
        self.0.run(|state| find(&state.vnetworks, id).cloned()).await
    }

    async fn delete_vnetwork(&self, id: &str) -> Result<bool> {
        self.0.check_id(id)?;
        self.0
            .run(|state| remove(&mut state.vnetworks, id).map(|_| true))
            .await
    }
}

pub struct MockVNicHandler(pub(crate) Binding);

#[async_trait]
impl VNicHandler for MockVNicHandler {
    async fn create_vnic(&self, req: VNicReqInfo) -> Result<VNicInfo> {
        req.validate()?;
        let nic_id = self.0.id_for(&req.name)?;
        let vnet_id = self.0.id_for(&req.vnetwork_name)?;
        self.0
            .run(move |state| {
                let vnet = find(&state.vnetworks, &vnet_id)?;
                if !vnet.subnets.contains(&req.subnet_name) {
                    return Err(DriverError::NotFound(format!(
                        "{}/subnets/{}",
                        vnet_id, req.subnet_name
                    )));
                }
                if let Some(sg) = &req.security_group_id {
                    find(&state.securities, sg)?;
                }
                if let Some(ip) = &req.public_ip_id {
                    find(&state.public_ips, ip)?;
                }
                let info = VNicInfo {
                    id: nic_id.clone(),
                    name: req.name,
                    mac_address: None,
                    private_ip: None,
                    public_ip_id: req.public_ip_id,
                    security_group_id: req.security_group_id,
                    attached_vm_id: None,
                    status: "AVAILABLE".to_string(),
                };
                insert_new(&mut state.vnics, &nic_id, info.clone())?;
                Ok(info)
            })
            .await
    }

    async fn list_vnic(&self) -> Result<Vec<VNicInfo>> {
        let scope = self.0.scope.clone();
        self.0.run(move |state| Ok(in_scope(&state.vnics, &scope))).await
    }

    async fn get_vnic(&self, id: &str) -> Result<VNicInfo> {
        self.0.check_id(id)?;
        self.0.run(|state| find(&state.vnics, id).cloned()).await
    }

    async fn delete_vnic(&self, id: &str) -> Result<bool> {
        self.0.check_id(id)?;
        self.0
            .run(|state| remove(&mut state.vnics, id).map(|_| true))
            .await
    }
}

pub struct MockKeyPairHandler(pub(crate) Binding);

#[async_trait]
impl KeyPairHandler for MockKeyPairHandler {
    async fn create_key(&self, req: KeyPairReqInfo) -> Result<KeyPairInfo> {
        req.validate()?;
        let key_id = self.0.id_for(&req.name)?;
        let stored = KeyPairInfo {
            id: key_id.clone(),
            name: req.name.clone(),
            fingerprint: Some(format!("mock:{}", req.name)),
            public_key: Some(format!("ssh-ed25519 MOCK-{} cloudspan", req.name)),
            private_key: None,
        };
        let created = self
            .0
            .run(move |state| {
                insert_new(&mut state.key_pairs, &key_id, stored.clone())?;
                Ok(stored)
            })
            .await?;
        Ok(KeyPairInfo {
            private_key: Some(format!("-----BEGIN MOCK KEY {}-----", created.name)),
            ..created
        })
    }

    async fn list_key(&self) -> Result<Vec<KeyPairInfo>> {
        let scope = self.0.scope.clone();
        self.0
            .run(move |state| Ok(in_scope(&state.key_pairs, &scope)))
            .await
    }

    async fn get_key(&self, id: &str) -> Result<KeyPairInfo> {
        self.0.check_id(id)?;
        self.0.run(|state| find(&state.key_pairs, id).cloned()).await
    }

    async fn delete_key(&self, id: &str) -> Result<bool> {
        self.0.check_id(id)?;
        self.0
            .run(|state| remove(&mut state.key_pairs, id).map(|_| true))
            .await
    }
}
