use super::{print_json, read_request};
use crate::VmCommands;
use cloudspan_driver::{CloudConnection, VmReqInfo};
use serde_json::json;

pub async fn handle(conn: &dyn CloudConnection, command: &VmCommands) -> anyhow::Result<()> {
    let vms = conn.create_vm_handler()?;
    match command {
        VmCommands::Start { request } => {
            let req: VmReqInfo = read_request(request)?;
            print_json(&vms.start_vm(req).await?)
        }
        VmCommands::Suspend { id } => {
            print_json(&json!({ "id": id, "status": vms.suspend_vm(id).await? }))
        }
        VmCommands::Resume { id } => {
            print_json(&json!({ "id": id, "status": vms.resume_vm(id).await? }))
        }
        VmCommands::Reboot { id } => {
            print_json(&json!({ "id": id, "status": vms.reboot_vm(id).await? }))
        }
        VmCommands::Terminate { id } => {
            print_json(&json!({ "id": id, "status": vms.terminate_vm(id).await? }))
        }
        VmCommands::Status { id: Some(id) } => print_json(&vms.get_vm_status(id).await?),
        VmCommands::Status { id: None } => print_json(&vms.list_vm_status().await?),
    }
}
