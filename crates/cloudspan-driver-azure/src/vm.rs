//! Virtual machines
//!
//! Status is composed from the instance view's `PowerState/*` and
//! `ProvisioningState/*` codes. Addresses live on the NIC, so reads follow
//! the first NIC to fill in the private and public IP.

use crate::api::{
    HardwareProfile, ImageReference, NetworkInterface, NetworkProfile, OsProfile,
    PublicIpAddress, Resource, ResourceType, StorageProfile, SubResource, VirtualMachine,
    VmAction, VmProperties, body, decode,
};
use crate::connection::Binding;
use crate::path::{ResourcePath, id_from_path, resource_path};
use crate::vnic::vnetwork_of_subnet;
use async_trait::async_trait;
use cloudspan_driver::translate::{require, require_str, translate_all};
use cloudspan_driver::{
    DriverError, RegionInfo, ResourceKind, Result, StatusVocabulary, VmHandler, VmInfo,
    VmReqInfo, VmStatus, VmStatusInfo, id,
};

const KIND: ResourceKind = ResourceKind::Vm;

pub const VM_STATES: StatusVocabulary = StatusVocabulary {
    power: &[
        ("starting", VmStatus::Resuming),
        ("running", VmStatus::Running),
        ("stopping", VmStatus::Suspending),
        ("stopped", VmStatus::Suspended),
        ("deallocating", VmStatus::Suspending),
        ("deallocated", VmStatus::Suspended),
    ],
    provisioning: &[
        ("creating", VmStatus::Pending),
        ("updating", VmStatus::Pending),
        ("deleting", VmStatus::Terminating),
    ],
};

fn normalize(props: &VmProperties) -> (VmStatus, String) {
    let view = props.instance_view.as_ref();
    let power = view.and_then(|v| v.axis("PowerState"));
    let provisioning = view
        .and_then(|v| v.axis("ProvisioningState"))
        .or(props.provisioning_state.as_deref());
    let status = VM_STATES.normalize(power, provisioning);
    (status.status, status.detail)
}

/// `rg:name` for custom images, `publisher:offer:sku:version` for marketplace images
fn image_id(reference: Option<&ImageReference>, group: &str) -> Result<Option<String>> {
    let Some(reference) = reference else {
        return Ok(None);
    };
    if let Some(path) = &reference.id {
        return id_from_path(path, group, "image reference").map(Some);
    }
    match (&reference.publisher, &reference.offer, &reference.sku) {
        (Some(publisher), Some(offer), Some(sku)) => {
            let version = reference.version.as_deref().unwrap_or("latest");
            id::encode_parts(&[publisher.as_str(), offer.as_str(), sku.as_str(), version])
                .map(Some)
                .map_err(|e| DriverError::TranslationError(format!("image reference: {}", e)))
        }
        _ => Ok(None),
    }
}

pub fn translate_vm(vm: VirtualMachine, group: &str, region: &RegionInfo) -> Result<VmInfo> {
    let id = id_from_path(&require_str(vm.id.as_deref(), KIND, "id")?, group, "vm id")?;
    let name = require_str(vm.name.as_deref(), KIND, "name")?;
    let props = require(vm.properties, KIND, "properties")?;
    let spec_id = require_str(
        props
            .hardware_profile
            .as_ref()
            .and_then(|h| h.vm_size.as_deref()),
        KIND,
        "hardwareProfile.vmSize",
    )?;
    let storage = props.storage_profile.as_ref();
    let vnic_id = props
        .network_profile
        .as_ref()
        .and_then(|n| n.network_interfaces.first())
        .and_then(|nic| nic.id.as_deref())
        .map(|path| id_from_path(path, group, "network interface"))
        .transpose()?;
    let (status, status_detail) = normalize(&props);

    Ok(VmInfo {
        id,
        name,
        region: RegionInfo::new(vm.location.as_deref().unwrap_or(region.region()))
            .with_resource_group(group),
        image_id: image_id(storage.and_then(|s| s.image_reference.as_ref()), group)?,
        spec_id,
        vnic_id,
        vnetwork_id: None,
        public_ip: None,
        private_ip: None,
        security_group_ids: Vec::new(),
        key_pair_name: None,
        guest_user_id: props
            .os_profile
            .as_ref()
            .and_then(|o| o.admin_username.clone()),
        guest_boot_disk: storage.and_then(|s| s.os_disk.as_ref()).and_then(|d| d.name.clone()),
        status,
        status_detail,
    })
}

pub fn translate_status(vm: VirtualMachine, group: &str) -> Result<VmStatusInfo> {
    let id = id_from_path(&require_str(vm.id.as_deref(), KIND, "id")?, group, "vm id")?;
    let props = require(vm.properties, KIND, "properties")?;
    let (status, detail) = normalize(&props);
    Ok(VmStatusInfo { id, status, detail })
}

fn reject_unsupported(req: &VmReqInfo) -> Result<()> {
    let on_vnic = [
        ("vnetwork_id", req.vnetwork_id.is_some()),
        ("public_ip_id", req.public_ip_id.is_some()),
        ("security_group_ids", !req.security_group_ids.is_empty()),
    ];
    if let Some((field, _)) = on_vnic.iter().find(|(_, set)| *set) {
        return Err(DriverError::InvalidRequest(format!(
            "{} is configured on the VNic for Azure VMs",
            field
        )));
    }
    if req.key_pair_name.is_some() {
        return Err(DriverError::InvalidRequest(
            "key_pair_name is not supported by the Azure driver".to_string(),
        ));
    }
    Ok(())
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DriverError::InvalidRequest(format!("{} is required", field)))
}

/// `rg:name` names a custom image, `publisher:offer:sku:version` a marketplace one
fn image_reference(subscription_id: &str, image_id: &str) -> Result<ImageReference> {
    if let Ok((group, name)) = id::decode(image_id) {
        return Ok(ImageReference {
            id: Some(resource_path(subscription_id, &group, ResourceType::Images, &name)),
            ..Default::default()
        });
    }
    let [publisher, offer, sku, version] = id::decode_parts::<4>(image_id)?;
    Ok(ImageReference {
        publisher: Some(publisher.to_string()),
        offer: Some(offer.to_string()),
        sku: Some(sku.to_string()),
        version: Some(version.to_string()),
        ..Default::default()
    })
}

pub struct AzureVmHandler(pub(crate) Binding);

impl AzureVmHandler {
    async fn read(&self, name: &str) -> Result<VirtualMachine> {
        decode(KIND, self.0.fetch(ResourceType::VirtualMachines, name).await?)
    }

    /// Fill in the addresses held by the VM's NIC
    async fn with_addresses(&self, mut vm: VmInfo) -> Result<VmInfo> {
        let Some(nic_name) = vm.vnic_id.as_deref().and_then(|v| self.0.name_of(v).ok()) else {
            return Ok(vm);
        };
        let nic: NetworkInterface = decode(
            ResourceKind::VNic,
            self.0.fetch(ResourceType::NetworkInterfaces, &nic_name).await?,
        )?;
        let ip_config = nic
            .properties
            .and_then(|p| p.ip_configurations.into_iter().next())
            .and_then(|c| c.properties);
        let Some(ip_config) = ip_config else {
            return Ok(vm);
        };

        vm.private_ip = ip_config.private_ip_address;
        vm.vnetwork_id = ip_config
            .subnet
            .and_then(|s| s.id)
            .and_then(|path| vnetwork_of_subnet(&path, &self.0.group).ok());

        if let Some(path) = ip_config.public_ip_address.and_then(|p| p.id) {
            let ip_name = ResourcePath::parse(&path)?.name().to_string();
            let ip: PublicIpAddress = decode(
                ResourceKind::PublicIp,
                self.0.fetch(ResourceType::PublicIpAddresses, &ip_name).await?,
            )?;
            vm.public_ip = ip.properties.and_then(|p| p.ip_address);
        }
        Ok(vm)
    }

    async fn act(&self, vm_id: &str, action: VmAction, transitional: VmStatus) -> Result<VmStatus> {
        let name = self.0.name_of(vm_id)?;
        translate_status(self.read(&name).await?, &self.0.group)?
            .status
            .ensure_transition(vm_id, transitional)?;

        tracing::info!("VM {}: {}", vm_id, action.verb());
        let operation = self
            .0
            .ctx
            .call(self.0.api.vm_action(&self.0.group, &name, action))
            .await?;
        self.0.complete(operation).await?;
        Ok(translate_status(self.read(&name).await?, &self.0.group)?.status)
    }
}

#[async_trait]
impl VmHandler for AzureVmHandler {
    async fn start_vm(&self, req: VmReqInfo) -> Result<VmInfo> {
        req.validate()?;
        reject_unsupported(&req)?;
        let vnic_id = required(req.vnic_id.as_deref(), "vnic_id")?;
        let admin_username = required(req.login_user.as_deref(), "login_user")?;
        let admin_password = required(req.login_password.as_deref(), "login_password")?;

        let request: VirtualMachine = Resource {
            location: Some(self.0.location().to_string()),
            properties: Some(VmProperties {
                hardware_profile: Some(HardwareProfile {
                    vm_size: Some(req.spec_id.clone()),
                }),
                storage_profile: Some(StorageProfile {
                    image_reference: Some(image_reference(&self.0.subscription_id, &req.image_id)?),
                    os_disk: None,
                }),
                os_profile: Some(OsProfile {
                    computer_name: Some(req.name.clone()),
                    admin_username: Some(admin_username.to_string()),
                    admin_password: Some(admin_password.to_string()),
                }),
                network_profile: Some(NetworkProfile {
                    network_interfaces: vec![SubResource::to(
                        self.0.path_of(ResourceType::NetworkInterfaces, vnic_id)?,
                    )],
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        tracing::info!("Creating VM {} in {}", req.name, self.0.group);
        let value = self
            .0
            .create(ResourceType::VirtualMachines, &req.name, body(KIND, &request)?)
            .await?;
        let vm = translate_vm(decode(KIND, value)?, &self.0.group, &self.0.region)?;
        self.with_addresses(vm).await
    }

    async fn suspend_vm(&self, vm_id: &str) -> Result<VmStatus> {
        self.act(vm_id, VmAction::PowerOff, VmStatus::Suspending).await
    }

    async fn resume_vm(&self, vm_id: &str) -> Result<VmStatus> {
        self.act(vm_id, VmAction::Start, VmStatus::Resuming).await
    }

    async fn reboot_vm(&self, vm_id: &str) -> Result<VmStatus> {
        self.act(vm_id, VmAction::Restart, VmStatus::Rebooting).await
    }

    async fn terminate_vm(&self, vm_id: &str) -> Result<VmStatus> {
        let name = self.0.name_of(vm_id)?;
        translate_status(self.read(&name).await?, &self.0.group)?
            .status
            .ensure_transition(vm_id, VmStatus::Terminating)?;

        tracing::info!("Deleting VM {}", vm_id);
        self.0.remove(ResourceType::VirtualMachines, &name).await?;
        Ok(VmStatus::Terminated)
    }

    async fn list_vm_status(&self) -> Result<Vec<VmStatusInfo>> {
        let values = self
            .0
            .ctx
            .call(self.0.api.list(&self.0.group, ResourceType::VirtualMachines))
            .await?;
        translate_all(values, |v| {
            decode(KIND, v).and_then(|vm| translate_status(vm, &self.0.group))
        })
    }

    async fn get_vm_status(&self, vm_id: &str) -> Result<VmStatusInfo> {
        let name = self.0.name_of(vm_id)?;
        translate_status(self.read(&name).await?, &self.0.group)
    }

    async fn list_vm(&self) -> Result<Vec<VmInfo>> {
        let values = self
            .0
            .ctx
            .call(self.0.api.list(&self.0.group, ResourceType::VirtualMachines))
            .await?;
        let vms = translate_all(values, |v| {
            decode(KIND, v).and_then(|vm| translate_vm(vm, &self.0.group, &self.0.region))
        })?;

        let mut enriched = Vec::with_capacity(vms.len());
        for vm in vms {
            enriched.push(self.with_addresses(vm).await?);
        }
        Ok(enriched)
    }

    async fn get_vm(&self, vm_id: &str) -> Result<VmInfo> {
        let name = self.0.name_of(vm_id)?;
        let vm = translate_vm(self.read(&name).await?, &self.0.group, &self.0.region)?;
        self.with_addresses(vm).await
    }
}
