//! Servers as VMs

use crate::api::{Collection, Server, ServerAction, ServerCreate, body, decode};
use crate::connection::Binding;
use async_trait::async_trait;
use cloudspan_driver::id::validate_opaque;
use cloudspan_driver::translate::{require_str, translate_all};
use cloudspan_driver::{
    DriverError, RegionInfo, ResourceKind, Result, StatusVocabulary, VmHandler, VmInfo, VmReqInfo,
    VmStatus, VmStatusInfo,
};

const KIND: ResourceKind = ResourceKind::Vm;

/// Server states; the generic provider reports a single axis
pub const SERVER_STATES: StatusVocabulary = StatusVocabulary {
    power: &[
        ("CREATING", VmStatus::Pending),
        ("RUNNING", VmStatus::Running),
        ("STOPPING", VmStatus::Suspending),
        ("STOPPED", VmStatus::Suspended),
        ("STARTING", VmStatus::Resuming),
        ("REBOOTING", VmStatus::Rebooting),
        ("TERMINATING", VmStatus::Terminating),
        ("TERMINATED", VmStatus::Terminated),
    ],
    provisioning: &[],
};

pub fn translate_server(server: Server, region: &RegionInfo) -> Result<VmInfo> {
    let id = require_str(server.id.as_deref(), KIND, "id")?;
    let name = require_str(server.name.as_deref(), KIND, "name")?;
    let image_id = require_str(server.template_id.as_deref(), KIND, "templateId")?;
    let spec_id = require_str(server.spec.as_deref(), KIND, "spec")?;
    let status = SERVER_STATES.normalize_single(server.state.as_deref());

    Ok(VmInfo {
        id,
        name,
        region: region.clone(),
        image_id: Some(image_id),
        spec_id,
        vnic_id: None,
        vnetwork_id: server.subnet_id,
        public_ip: server.adaptive_ip,
        private_ip: server.private_ip,
        security_group_ids: server.security_group_ids.unwrap_or_default(),
        key_pair_name: server.keypair_name,
        guest_user_id: server.admin_user,
        guest_boot_disk: server.root_disk,
        status: status.status,
        status_detail: status.detail,
    })
}

pub fn translate_status(server: Server) -> Result<VmStatusInfo> {
    let id = require_str(server.id.as_deref(), KIND, "id")?;
    let status = SERVER_STATES.normalize_single(server.state.as_deref());
    Ok(VmStatusInfo {
        id,
        status: status.status,
        detail: status.detail,
    })
}

fn create_request(req: VmReqInfo) -> Result<ServerCreate> {
    if req.vnic_id.is_some() {
        return Err(DriverError::InvalidRequest(
            "the generic provider has no separate network interfaces".to_string(),
        ));
    }
    for id in req
        .vnetwork_id
        .iter()
        .chain(req.public_ip_id.iter())
        .chain(req.security_group_ids.iter())
    {
        validate_opaque(id)?;
    }

    Ok(ServerCreate {
        name: req.name,
        template_id: req.image_id,
        spec: req.spec_id,
        subnet_id: req.vnetwork_id,
        adaptive_ip_id: req.public_ip_id,
        security_group_ids: req.security_group_ids,
        keypair_name: req.key_pair_name,
        admin_user: req.login_user,
        admin_password: req.login_password,
    })
}

pub struct GenericVmHandler(pub(crate) Binding);

impl GenericVmHandler {
    async fn fetch(&self, id: &str) -> Result<Server> {
        let value = self.0.ctx.call(self.0.api.get(Collection::Servers, id)).await?;
        decode(KIND, value)
    }

    async fn current_status(&self, id: &str) -> Result<VmStatus> {
        Ok(translate_status(self.fetch(id).await?)?.status)
    }

    /// Issue `action` if the lifecycle allows it, then report the new state
    async fn act(
        &self,
        id: &str,
        action: ServerAction,
        transitional: VmStatus,
    ) -> Result<VmStatus> {
        validate_opaque(id)?;
        self.current_status(id)
            .await?
            .ensure_transition(id, transitional)?;

        tracing::info!("Server {}: {:?}", id, action);
        self.0
            .ctx
            .call(self.0.api.server_action(id, action))
            .await?;
        self.current_status(id).await
    }
}

#[async_trait]
impl VmHandler for GenericVmHandler {
    async fn start_vm(&self, req: VmReqInfo) -> Result<VmInfo> {
        req.validate()?;
        let request = body(KIND, &create_request(req)?)?;

        let value = self
            .0
            .ctx
            .call(self.0.api.create(Collection::Servers, request))
            .await?;
        let vm = translate_server(decode(KIND, value)?, &self.0.region)?;
        tracing::info!("Created server {} ({})", vm.name, vm.id);
        Ok(vm)
    }

    async fn suspend_vm(&self, id: &str) -> Result<VmStatus> {
        self.act(id, ServerAction::Stop, VmStatus::Suspending).await
    }

    async fn resume_vm(&self, id: &str) -> Result<VmStatus> {
        self.act(id, ServerAction::Start, VmStatus::Resuming).await
    }

    async fn reboot_vm(&self, id: &str) -> Result<VmStatus> {
        self.act(id, ServerAction::Reboot, VmStatus::Rebooting).await
    }

    async fn terminate_vm(&self, id: &str) -> Result<VmStatus> {
        validate_opaque(id)?;
        self.current_status(id)
            .await?
            .ensure_transition(id, VmStatus::Terminating)?;

        self.0
            .ctx
            .call(self.0.api.delete(Collection::Servers, id))
            .await?;
        tracing::info!("Deleted server {}", id);
        Ok(VmStatus::Terminated)
    }

    async fn list_vm_status(&self) -> Result<Vec<VmStatusInfo>> {
        let values = self.0.ctx.call(self.0.api.list(Collection::Servers)).await?;
        translate_all(values, |v| decode(KIND, v).and_then(translate_status))
    }

    async fn get_vm_status(&self, id: &str) -> Result<VmStatusInfo> {
        validate_opaque(id)?;
        translate_status(self.fetch(id).await?)
    }

    async fn list_vm(&self) -> Result<Vec<VmInfo>> {
        let values = self.0.ctx.call(self.0.api.list(Collection::Servers)).await?;
        translate_all(values, |v| {
            decode(KIND, v).and_then(|s| translate_server(s, &self.0.region))
        })
    }

    async fn get_vm(&self, id: &str) -> Result<VmInfo> {
        validate_opaque(id)?;
        translate_server(self.fetch(id).await?, &self.0.region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> Server {
        Server {
            id: Some("srv-1".into()),
            name: Some("web".into()),
            state: Some("STOPPED".into()),
            template_id: Some("tpl-1".into()),
            spec: Some("small".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_translate_server() {
        let vm = translate_server(server(), &RegionInfo::new("kr-1")).unwrap();
        assert_eq!(vm.id, "srv-1");
        assert_eq!(vm.status, VmStatus::Suspended);
        assert_eq!(vm.status_detail, "STOPPED");
        assert!(vm.security_group_ids.is_empty());
    }

    #[test]
    fn test_missing_name_fails_translation() {
        let broken = Server {
            name: None,
            ..server()
        };
        let err = translate_server(broken, &RegionInfo::new("kr-1")).unwrap_err();
        assert!(matches!(err, DriverError::TranslationError(msg) if msg.contains("name")));
    }

    #[test]
    fn test_unknown_state() {
        let status = translate_status(Server {
            state: Some("MIGRATING".into()),
            ..server()
        })
        .unwrap();
        assert_eq!(status.status, VmStatus::Unknown);
        assert_eq!(status.detail, "MIGRATING");

        let status = translate_status(Server {
            state: None,
            ..server()
        })
        .unwrap();
        assert_eq!(status.detail, "-");
    }

    #[test]
    fn test_vnic_is_rejected() {
        let req = VmReqInfo::new("web", "tpl-1", "small").with_vnic("nic-1");
        assert!(matches!(create_request(req), Err(DriverError::InvalidRequest(_))));
    }
}
