//! Compute Engine instances as VMs
//!
//! Ids are `<zone>:<instance name>`. Every mutation returns an operation
//! that is polled to completion before the instance is read back.

use crate::api::{
    AccessConfigInsert, AttachedDiskInsert, DiskInitializeParams, GLOBAL, Instance,
    InstanceAction, InstanceInsert, NetworkInterfaceInsert, OperationScope, ServiceAccountRef,
};
use crate::auth::COMPUTE_SCOPE;
use crate::connection::Binding;
use async_trait::async_trait;
use cloudspan_driver::translate::{last_segment, require_str, translate_all};
use cloudspan_driver::{
    DriverError, RegionInfo, ResourceKind, Result, StatusVocabulary, VmHandler, VmInfo, VmReqInfo,
    VmStatus, VmStatusInfo, id,
};

const KIND: ResourceKind = ResourceKind::Vm;

/// Instance status is a single axis; TERMINATED means stopped, not deleted
pub const INSTANCE_STATES: StatusVocabulary = StatusVocabulary {
    power: &[
        ("PROVISIONING", VmStatus::Pending),
        ("STAGING", VmStatus::Pending),
        ("RUNNING", VmStatus::Running),
        ("STOPPING", VmStatus::Suspending),
        ("SUSPENDING", VmStatus::Suspending),
        ("SUSPENDED", VmStatus::Suspended),
        ("TERMINATED", VmStatus::Suspended),
    ],
    provisioning: &[],
};

fn boot_disk(instance: &Instance) -> Option<&crate::api::AttachedDisk> {
    instance
        .disks
        .as_ref()?
        .iter()
        .find(|d| d.boot.unwrap_or(false))
}

pub fn translate_instance(instance: Instance, region: &RegionInfo) -> Result<VmInfo> {
    let name = require_str(instance.name.as_deref(), KIND, "name")?;
    let zone = last_segment(&require_str(instance.zone.as_deref(), KIND, "zone")?).to_string();
    let spec_id =
        last_segment(&require_str(instance.machine_type.as_deref(), KIND, "machineType")?)
            .to_string();
    let status = INSTANCE_STATES.normalize_single(instance.status.as_deref());

    let boot = boot_disk(&instance);
    let image_id = boot
        .and_then(|d| d.licenses.as_ref())
        .and_then(|l| l.first())
        .map(|l| last_segment(l).to_string());
    let guest_boot_disk = boot.and_then(|d| {
        d.device_name
            .clone()
            .or_else(|| d.source.as_deref().map(|s| last_segment(s).to_string()))
    });

    let nic = instance
        .network_interfaces
        .as_ref()
        .and_then(|nics| nics.first());
    let vnetwork_id = nic
        .and_then(|n| n.network.as_deref())
        .map(|url| id::encode(GLOBAL, last_segment(url)))
        .transpose()?;
    let public_ip = nic
        .and_then(|n| n.access_configs.as_ref())
        .and_then(|acs| acs.iter().find_map(|ac| ac.nat_ip.clone()));

    Ok(VmInfo {
        id: id::encode(&zone, &name)?,
        name,
        region: RegionInfo::new(region.region()).with_zone(zone),
        image_id,
        spec_id,
        vnic_id: None,
        vnetwork_id,
        public_ip,
        private_ip: nic.and_then(|n| n.network_ip.clone()),
        security_group_ids: Vec::new(),
        key_pair_name: None,
        guest_user_id: None,
        guest_boot_disk,
        status: status.status,
        status_detail: status.detail,
    })
}

pub fn translate_status(instance: Instance) -> Result<VmStatusInfo> {
    let name = require_str(instance.name.as_deref(), KIND, "name")?;
    let zone = last_segment(&require_str(instance.zone.as_deref(), KIND, "zone")?).to_string();
    let status = INSTANCE_STATES.normalize_single(instance.status.as_deref());
    Ok(VmStatusInfo {
        id: id::encode(&zone, &name)?,
        status: status.status,
        detail: status.detail,
    })
}

/// Source image path: canonical `global:<name>` ids become `global/images/<name>`,
/// anything else is taken as a provider image reference
pub(crate) fn source_image(image_id: &str) -> Result<String> {
    match id::decode(image_id) {
        Ok((scope, name)) if scope == GLOBAL => Ok(format!("global/images/{}", name)),
        Ok(_) => Err(DriverError::InvalidId(format!(
            "image id '{}' must be global",
            image_id
        ))),
        Err(_) => Ok(image_id.to_string()),
    }
}

fn reject_unsupported(req: &VmReqInfo) -> Result<()> {
    let unsupported = [
        ("vnic_id", req.vnic_id.is_some()),
        ("security_group_ids", !req.security_group_ids.is_empty()),
        ("key_pair_name", req.key_pair_name.is_some()),
        ("login_password", req.login_password.is_some()),
    ];
    match unsupported.iter().find(|(_, set)| *set) {
        Some((field, _)) => Err(DriverError::InvalidRequest(format!(
            "{} is not supported by the GCP driver",
            field
        ))),
        None => Ok(()),
    }
}

pub struct GcpVmHandler(pub(crate) Binding);

impl GcpVmHandler {
    fn scope(&self) -> OperationScope {
        OperationScope::Zone(self.0.zone.clone())
    }

    fn name_of(&self, vm_id: &str) -> Result<String> {
        id::decode_in_scope(vm_id, &self.0.zone)
    }

    async fn fetch(&self, name: &str) -> Result<Instance> {
        self.0
            .ctx
            .call(self.0.api.get_instance(&self.0.zone, name))
            .await
    }

    async fn current_status(&self, name: &str) -> Result<VmStatus> {
        Ok(translate_status(self.fetch(name).await?)?.status)
    }

    async fn act(
        &self,
        vm_id: &str,
        action: InstanceAction,
        transitional: VmStatus,
    ) -> Result<VmStatus> {
        let name = self.name_of(vm_id)?;
        self.current_status(&name)
            .await?
            .ensure_transition(vm_id, transitional)?;

        tracing::info!("Instance {}: {}", vm_id, action.verb());
        let op = self
            .0
            .ctx
            .call(self.0.api.instance_action(&self.0.zone, &name, action))
            .await?;
        self.0.complete(self.scope(), op).await?;
        self.current_status(&name).await
    }

    async fn build_insert(&self, req: VmReqInfo) -> Result<InstanceInsert> {
        let network = match &req.vnetwork_id {
            Some(vnet) => format!("global/networks/{}", id::decode_in_scope(vnet, GLOBAL)?),
            None => "global/networks/default".to_string(),
        };
        let nat_ip = match &req.public_ip_id {
            Some(ip_id) => {
                let name = id::decode_in_scope(ip_id, self.0.region.region())?;
                let address = self
                    .0
                    .ctx
                    .call(self.0.api.get_address(self.0.region.region(), &name))
                    .await?;
                Some(require_str(
                    address.address.as_deref(),
                    ResourceKind::PublicIp,
                    "address",
                )?)
            }
            None => None,
        };

        Ok(InstanceInsert {
            machine_type: format!("zones/{}/machineTypes/{}", self.0.zone, req.spec_id),
            disks: vec![AttachedDiskInsert {
                boot: true,
                auto_delete: true,
                initialize_params: DiskInitializeParams {
                    source_image: source_image(&req.image_id)?,
                },
            }],
            network_interfaces: vec![NetworkInterfaceInsert {
                network,
                access_configs: vec![AccessConfigInsert {
                    kind: "ONE_TO_ONE_NAT".to_string(),
                    name: "External NAT".to_string(),
                    nat_ip,
                }],
            }],
            service_accounts: self
                .0
                .service_account
                .iter()
                .map(|email| ServiceAccountRef {
                    email: email.clone(),
                    scopes: vec![COMPUTE_SCOPE.to_string()],
                })
                .collect(),
            name: req.name,
        })
    }
}

#[async_trait]
impl VmHandler for GcpVmHandler {
    async fn start_vm(&self, req: VmReqInfo) -> Result<VmInfo> {
        req.validate()?;
        reject_unsupported(&req)?;
        let name = req.name.clone();
        let insert = self.build_insert(req).await?;

        tracing::info!("Creating instance {} in {}", name, self.0.zone);
        let op = self
            .0
            .ctx
            .call(self.0.api.insert_instance(&self.0.zone, &insert))
            .await?;
        self.0.complete(self.scope(), op).await?;

        translate_instance(self.fetch(&name).await?, &self.0.region)
    }

    async fn suspend_vm(&self, vm_id: &str) -> Result<VmStatus> {
        self.act(vm_id, InstanceAction::Stop, VmStatus::Suspending).await
    }

    async fn resume_vm(&self, vm_id: &str) -> Result<VmStatus> {
        self.act(vm_id, InstanceAction::Start, VmStatus::Resuming).await
    }

    async fn reboot_vm(&self, vm_id: &str) -> Result<VmStatus> {
        self.act(vm_id, InstanceAction::Reset, VmStatus::Rebooting).await
    }

    async fn terminate_vm(&self, vm_id: &str) -> Result<VmStatus> {
        let name = self.name_of(vm_id)?;
        self.current_status(&name)
            .await?
            .ensure_transition(vm_id, VmStatus::Terminating)?;

        tracing::info!("Deleting instance {}", vm_id);
        let op = self
            .0
            .ctx
            .call(self.0.api.delete_instance(&self.0.zone, &name))
            .await?;
        self.0.complete(self.scope(), op).await?;
        Ok(VmStatus::Terminated)
    }

    async fn list_vm_status(&self) -> Result<Vec<VmStatusInfo>> {
        let instances = self
            .0
            .ctx
            .call(self.0.api.list_instances(&self.0.zone))
            .await?;
        translate_all(instances, translate_status)
    }

    async fn get_vm_status(&self, vm_id: &str) -> Result<VmStatusInfo> {
        let name = self.name_of(vm_id)?;
        translate_status(self.fetch(&name).await?)
    }

    async fn list_vm(&self) -> Result<Vec<VmInfo>> {
        let instances = self
            .0
            .ctx
            .call(self.0.api.list_instances(&self.0.zone))
            .await?;
        translate_all(instances, |i| translate_instance(i, &self.0.region))
    }

    async fn get_vm(&self, vm_id: &str) -> Result<VmInfo> {
        let name = self.name_of(vm_id)?;
        translate_instance(self.fetch(&name).await?, &self.0.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AccessConfig, AttachedDisk, NetworkInterface};

    const PROJECT: &str = "https://www.googleapis.com/compute/v1/projects/proj";

    fn instance() -> Instance {
        Instance {
            id: Some("4417".into()),
            name: Some("vm-01".into()),
            status: Some("RUNNING".into()),
            machine_type: Some(format!(
                "{}/zones/asia-northeast3-a/machineTypes/e2-small",
                PROJECT
            )),
            zone: Some(format!("{}/zones/asia-northeast3-a", PROJECT)),
            network_interfaces: Some(vec![NetworkInterface {
                network: Some(format!("{}/global/networks/default", PROJECT)),
                network_ip: Some("10.178.0.2".into()),
                access_configs: Some(vec![AccessConfig {
                    name: Some("External NAT".into()),
                    nat_ip: Some("34.64.1.2".into()),
                }]),
            }]),
            disks: Some(vec![AttachedDisk {
                boot: Some(true),
                device_name: Some("persistent-disk-0".into()),
                source: None,
                licenses: Some(vec![
                    "https://www.googleapis.com/compute/v1/projects/debian-cloud/global/licenses/debian-12-bookworm".into(),
                ]),
            }]),
        }
    }

    #[test]
    fn test_translate_instance() {
        let vm = translate_instance(instance(), &RegionInfo::new("asia-northeast3")).unwrap();
        assert_eq!(vm.id, "asia-northeast3-a:vm-01");
        assert_eq!(vm.spec_id, "e2-small");
        assert_eq!(vm.image_id.as_deref(), Some("debian-12-bookworm"));
        assert_eq!(vm.vnetwork_id.as_deref(), Some("global:default"));
        assert_eq!(vm.public_ip.as_deref(), Some("34.64.1.2"));
        assert_eq!(vm.private_ip.as_deref(), Some("10.178.0.2"));
        assert_eq!(vm.guest_boot_disk.as_deref(), Some("persistent-disk-0"));
        assert_eq!(vm.region.zone(), Some("asia-northeast3-a"));
        assert_eq!(vm.status, VmStatus::Running);
    }

    #[test]
    fn test_status_vocabulary() {
        for (token, expected) in [
            ("STAGING", VmStatus::Pending),
            ("TERMINATED", VmStatus::Suspended),
            ("SUSPENDING", VmStatus::Suspending),
            ("REPAIRING", VmStatus::Unknown),
        ] {
            let status = translate_status(Instance {
                status: Some(token.into()),
                ..instance()
            })
            .unwrap();
            assert_eq!(status.status, expected, "{}", token);
            assert_eq!(status.detail, token);
        }
    }

    #[test]
    fn test_missing_zone_fails_translation() {
        let err = translate_instance(
            Instance {
                zone: None,
                ..instance()
            },
            &RegionInfo::new("asia-northeast3"),
        )
        .unwrap_err();
        assert!(matches!(err, DriverError::TranslationError(_)));
    }

    #[test]
    fn test_source_image() {
        assert_eq!(source_image("global:base").unwrap(), "global/images/base");
        assert_eq!(
            source_image("projects/debian-cloud/global/images/family/debian-12").unwrap(),
            "projects/debian-cloud/global/images/family/debian-12"
        );
        assert!(matches!(
            source_image("us-east1:base"),
            Err(DriverError::InvalidId(_))
        ));
    }

    #[test]
    fn test_unsupported_request_fields() {
        let req = VmReqInfo::new("vm-01", "global:base", "e2-small").with_security_group("sg");
        assert!(matches!(
            reject_unsupported(&req),
            Err(DriverError::InvalidRequest(msg)) if msg.contains("security_group_ids")
        ));
    }
}
