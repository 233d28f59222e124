//! In-memory fake of Azure Resource Manager
//!
//! Resources are stored as raw JSON. PUT and DELETE take effect immediately
//! and hand back an async-operation URL that reports `Succeeded` after a
//! configurable number of polls. PUT is create-only, like the conditional
//! PUT the REST client sends.

#![allow(dead_code)]

use async_trait::async_trait;
use cloudspan_driver::{CredentialInfo, RegionInfo};
use cloudspan_driver_azure::api::{Accepted, ErrorDetail, OperationStatus};
use cloudspan_driver_azure::path::resource_path;
use cloudspan_driver_azure::{
    ArmApi, ArmSession, AzureConnector, AzureError, OperationRef, ResourceType, Result, VmAction,
};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub const SUBSCRIPTION: &str = "0000";
pub const GROUP: &str = "rg1";

struct PendingOp {
    remaining_polls: usize,
    error: Option<String>,
}

#[derive(Default)]
struct FakeState {
    resources: BTreeMap<(String, ResourceType, String), Value>,
    operations: BTreeMap<String, PendingOp>,
    next: u32,
    polls: usize,
    fail_next: Option<String>,
    calls: Vec<String>,
}

impl FakeState {
    fn operation(&mut self, polls: usize) -> OperationRef {
        self.next += 1;
        let url = format!("https://fake/operations/op-{}", self.next);
        let error = self.fail_next.take();
        self.operations.insert(
            url.clone(),
            PendingOp {
                remaining_polls: polls,
                error,
            },
        );
        OperationRef::AsyncOperation(url)
    }

    fn resource_mut(
        &mut self,
        group: &str,
        kind: ResourceType,
        name: &str,
    ) -> Option<&mut Value> {
        self.resources
            .get_mut(&(group.to_string(), kind, name.to_string()))
    }
}

#[derive(Default)]
pub struct FakeArm {
    state: Mutex<FakeState>,
    polls_until_done: usize,
}

fn path(group: &str, kind: ResourceType, name: &str) -> String {
    resource_path(SUBSCRIPTION, group, kind, name)
}

fn last(path: &str) -> String {
    path.rsplit('/').next().unwrap_or_default().to_string()
}

fn not_found(name: &str) -> AzureError {
    AzureError::NotFound(name.to_string())
}

impl FakeArm {
    pub fn new() -> Arc<Self> {
        Self::with_polls(1)
    }

    /// Operations report `Succeeded` on the `polls`-th poll
    pub fn with_polls(polls: usize) -> Arc<Self> {
        Arc::new(Self {
            polls_until_done: polls,
            ..Default::default()
        })
    }

    /// The next operation finishes as `Failed` with this message
    pub fn fail_next_operation(&self, message: &str) {
        self.state.lock().unwrap().fail_next = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn polls(&self) -> usize {
        self.state.lock().unwrap().polls
    }

    pub fn count(&self, kind: ResourceType) -> usize {
        self.state
            .lock()
            .unwrap()
            .resources
            .keys()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }

    /// Store a raw resource as ARM would return it
    pub fn seed(&self, group: &str, kind: ResourceType, name: &str, resource: Value) {
        self.state
            .lock()
            .unwrap()
            .resources
            .insert((group.to_string(), kind, name.to_string()), resource);
    }

    /// A running VM without a NIC
    pub fn seed_vm(&self, name: &str, power_state: &str) {
        self.seed(
            GROUP,
            ResourceType::VirtualMachines,
            name,
            json!({
                "id": path(GROUP, ResourceType::VirtualMachines, name),
                "name": name,
                "location": "koreacentral",
                "properties": {
                    "hardwareProfile": {"vmSize": "Standard_B1s"},
                    "provisioningState": "Succeeded",
                    "instanceView": {"statuses": [
                        {"code": "ProvisioningState/succeeded"},
                        {"code": format!("PowerState/{}", power_state)}
                    ]}
                }
            }),
        );
    }

    fn provision(
        state: &mut FakeState,
        group: &str,
        kind: ResourceType,
        name: &str,
        resource: &mut Value,
    ) {
        let own_path = path(group, kind, name);
        resource["id"] = json!(own_path);
        resource["name"] = json!(name);
        resource["properties"]["provisioningState"] = json!("Succeeded");
        let n = state.next + 4;

        match kind {
            ResourceType::PublicIpAddresses => {
                resource["properties"]["ipAddress"] = json!(format!("20.41.0.{}", n));
            }
            ResourceType::NetworkInterfaces => {
                resource["properties"]["macAddress"] = json!(format!("00-0D-3A-00-00-{:02}", n));
                resource["properties"]["ipConfigurations"][0]["properties"]["privateIPAddress"] =
                    json!(format!("10.0.0.{}", n));
                let ip_path = resource["properties"]["ipConfigurations"][0]["properties"]
                    ["publicIPAddress"]["id"]
                    .as_str()
                    .map(last);
                if let Some(ip) = ip_path {
                    let ip = state.resource_mut(group, ResourceType::PublicIpAddresses, &ip);
                    if let Some(ip) = ip {
                        ip["properties"]["ipConfiguration"] =
                            json!({"id": format!("{}/ipConfigurations/ipconfig1", own_path)});
                    }
                }
            }
            ResourceType::VirtualMachines => {
                resource["properties"]["instanceView"] = json!({"statuses": [
                    {"code": "ProvisioningState/succeeded"},
                    {"code": "PowerState/running"}
                ]});
                let nic = resource["properties"]["networkProfile"]["networkInterfaces"][0]["id"]
                    .as_str()
                    .map(last);
                if let Some(nic) = nic {
                    let nic = state.resource_mut(group, ResourceType::NetworkInterfaces, &nic);
                    if let Some(nic) = nic {
                        nic["properties"]["virtualMachine"] = json!({"id": own_path});
                    }
                }
            }
            _ => {}
        }
    }

    fn unlink(state: &mut FakeState, group: &str, kind: ResourceType, removed: &Value) {
        match kind {
            ResourceType::VirtualMachines => {
                let nic = removed["properties"]["networkProfile"]["networkInterfaces"][0]["id"]
                    .as_str()
                    .map(last);
                if let Some(nic) = nic {
                    let nic = state.resource_mut(group, ResourceType::NetworkInterfaces, &nic);
                    if let Some(nic) = nic {
                        if let Some(props) = nic["properties"].as_object_mut() {
                            props.remove("virtualMachine");
                        }
                    }
                }
            }
            ResourceType::NetworkInterfaces => {
                let ip = removed["properties"]["ipConfigurations"][0]["properties"]
                    ["publicIPAddress"]["id"]
                    .as_str()
                    .map(last);
                if let Some(ip) = ip {
                    let ip = state.resource_mut(group, ResourceType::PublicIpAddresses, &ip);
                    if let Some(ip) = ip {
                        if let Some(props) = ip["properties"].as_object_mut() {
                            props.remove("ipConfiguration");
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

#[async_trait]
impl ArmApi for FakeArm {
    async fn list(&self, group: &str, kind: ResourceType) -> Result<Vec<Value>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("list {:?}", kind));
        Ok(state
            .resources
            .iter()
            .filter(|((g, k, _), _)| g == group && *k == kind)
            .map(|(_, v)| v.clone())
            .collect())
    }

    async fn get(&self, group: &str, kind: ResourceType, name: &str) -> Result<Value> {
        let state = self.state.lock().unwrap();
        state
            .resources
            .get(&(group.to_string(), kind, name.to_string()))
            .cloned()
            .ok_or_else(|| not_found(name))
    }

    async fn put(
        &self,
        group: &str,
        kind: ResourceType,
        name: &str,
        mut body: Value,
    ) -> Result<Accepted> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("put {:?} {}", kind, name));
        let key = (group.to_string(), kind, name.to_string());
        if state.resources.contains_key(&key) {
            return Err(AzureError::Conflict(name.to_string()));
        }
        Self::provision(&mut state, group, kind, name, &mut body);
        state.resources.insert(key, body.clone());
        let operation = state.operation(self.polls_until_done);
        Ok(Accepted {
            resource: body,
            operation: Some(operation),
        })
    }

    async fn delete(
        &self,
        group: &str,
        kind: ResourceType,
        name: &str,
    ) -> Result<Option<OperationRef>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete {:?} {}", kind, name));
        let removed = state
            .resources
            .remove(&(group.to_string(), kind, name.to_string()))
            .ok_or_else(|| not_found(name))?;
        Self::unlink(&mut state, group, kind, &removed);
        Ok(Some(state.operation(self.polls_until_done)))
    }

    async fn vm_action(
        &self,
        group: &str,
        name: &str,
        action: VmAction,
    ) -> Result<Option<OperationRef>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("{} {}", action.verb(), name));
        let power = match action {
            VmAction::PowerOff => "PowerState/stopped",
            VmAction::Start | VmAction::Restart => "PowerState/running",
        };
        let vm = state
            .resource_mut(group, ResourceType::VirtualMachines, name)
            .ok_or_else(|| not_found(name))?;
        vm["properties"]["instanceView"]["statuses"][1]["code"] = json!(power);
        Ok(Some(state.operation(self.polls_until_done)))
    }

    async fn get_operation(&self, operation: &OperationRef) -> Result<OperationStatus> {
        let url = operation.url();
        let mut state = self.state.lock().unwrap();
        state.polls += 1;
        let op = state.operations.get_mut(url).ok_or_else(|| not_found(url))?;
        op.remaining_polls = op.remaining_polls.saturating_sub(1);
        if op.remaining_polls > 0 {
            return Ok(OperationStatus {
                status: Some("InProgress".into()),
                error: None,
            });
        }
        Ok(match &op.error {
            Some(message) => OperationStatus {
                status: Some("Failed".into()),
                error: Some(ErrorDetail {
                    code: Some("QuotaExceeded".into()),
                    message: Some(message.clone()),
                }),
            },
            None => OperationStatus {
                status: Some("Succeeded".into()),
                error: None,
            },
        })
    }
}

pub struct FakeConnector {
    pub api: Arc<FakeArm>,
}

#[async_trait]
impl AzureConnector for FakeConnector {
    async fn connect(
        &self,
        _credential: &CredentialInfo,
        _region: &RegionInfo,
    ) -> cloudspan_driver::Result<ArmSession> {
        Ok(ArmSession {
            api: self.api.clone(),
            subscription_id: SUBSCRIPTION.to_string(),
        })
    }
}

pub fn credential() -> CredentialInfo {
    CredentialInfo::new()
        .with_subscription_id(SUBSCRIPTION)
        .with_auth_token("token")
}

pub fn region() -> RegionInfo {
    RegionInfo::new("koreacentral").with_resource_group(GROUP)
}
