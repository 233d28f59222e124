//! In-memory fake of the Compute Engine API
//!
//! Mutations take effect immediately; the returned operation reports DONE
//! after a configurable number of polls.

#![allow(dead_code)]

use async_trait::async_trait;
use cloudspan_driver::{CredentialInfo, RegionInfo};
use cloudspan_driver_gcp::api::{
    AccessConfig, Address, AddressInsert, AttachedDisk, Image, ImageInsert, Instance,
    InstanceInsert, Network, NetworkInsert, NetworkInterface, Operation, OperationError,
    OperationErrorItem,
};
use cloudspan_driver_gcp::{
    ComputeApi, ComputeSession, GcpConnector, GcpError, InstanceAction, OperationScope, Result,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

const BASE: &str = "https://compute.example.com/compute/v1/projects/proj";

struct PendingOp {
    remaining_polls: usize,
    error: Option<String>,
}

#[derive(Default)]
struct FakeState {
    instances: BTreeMap<(String, String), Instance>,
    images: BTreeMap<String, Image>,
    addresses: BTreeMap<(String, String), Address>,
    networks: BTreeMap<String, Network>,
    operations: BTreeMap<(String, String), PendingOp>,
    next: u32,
    polls: usize,
    fail_next: Option<String>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeCompute {
    state: Mutex<FakeState>,
    polls_until_done: usize,
}

impl FakeCompute {
    pub fn new() -> Arc<Self> {
        Self::with_polls(1)
    }

    /// Operations report DONE on the `polls`-th poll
    pub fn with_polls(polls: usize) -> Arc<Self> {
        Arc::new(Self {
            polls_until_done: polls,
            ..Default::default()
        })
    }

    /// The next operation finishes with this provider error
    pub fn fail_next_operation(&self, message: &str) {
        self.state.lock().unwrap().fail_next = Some(message.to_string());
    }

    pub fn seed_instance(&self, zone: &str, name: &str, status: &str) {
        let mut state = self.state.lock().unwrap();
        state.instances.insert(
            (zone.to_string(), name.to_string()),
            instance(zone, name, "e2-small", status, None, "10.0.0.9"),
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Operation polls served so far
    pub fn polls(&self) -> usize {
        self.state.lock().unwrap().polls
    }

    pub fn instance_count(&self) -> usize {
        self.state.lock().unwrap().instances.len()
    }

    fn operation(&self, state: &mut FakeState, scope: OperationScope, target: String) -> Operation {
        state.next += 1;
        let name = format!("operation-{}", state.next);
        let error = state.fail_next.take();
        state.operations.insert(
            (scope.path(), name.clone()),
            PendingOp {
                remaining_polls: self.polls_until_done,
                error,
            },
        );
        Operation {
            name: Some(name),
            status: Some("RUNNING".into()),
            target_link: Some(target),
            error: None,
        }
    }
}

fn instance(
    zone: &str,
    name: &str,
    machine_type: &str,
    status: &str,
    nat_ip: Option<String>,
    network_ip: &str,
) -> Instance {
    Instance {
        id: Some(format!("{}", name.len() * 1000)),
        name: Some(name.to_string()),
        status: Some(status.to_string()),
        machine_type: Some(format!("{}/zones/{}/machineTypes/{}", BASE, zone, machine_type)),
        zone: Some(format!("{}/zones/{}", BASE, zone)),
        network_interfaces: Some(vec![NetworkInterface {
            network: Some(format!("{}/global/networks/default", BASE)),
            network_ip: Some(network_ip.to_string()),
            access_configs: Some(vec![AccessConfig {
                name: Some("External NAT".into()),
                nat_ip,
            }]),
        }]),
        disks: Some(vec![AttachedDisk {
            boot: Some(true),
            device_name: Some("persistent-disk-0".into()),
            source: Some(format!("{}/zones/{}/disks/{}", BASE, zone, name)),
            licenses: None,
        }]),
    }
}

fn not_found(what: &str) -> GcpError {
    GcpError::NotFound(format!("The resource '{}' was not found", what))
}

#[async_trait]
impl ComputeApi for FakeCompute {
    async fn list_instances(&self, zone: &str) -> Result<Vec<Instance>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("list instances {}", zone));
        Ok(state
            .instances
            .iter()
            .filter(|((z, _), _)| z == zone)
            .map(|(_, i)| i.clone())
            .collect())
    }

    async fn get_instance(&self, zone: &str, name: &str) -> Result<Instance> {
        let state = self.state.lock().unwrap();
        state
            .instances
            .get(&(zone.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| not_found(name))
    }

    async fn insert_instance(&self, zone: &str, body: &InstanceInsert) -> Result<Operation> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("insert instance {}", body.name));
        let key = (zone.to_string(), body.name.clone());
        if state.instances.contains_key(&key) {
            return Err(GcpError::Conflict(body.name.clone()));
        }

        let nat_ip = body
            .network_interfaces
            .first()
            .and_then(|n| n.access_configs.first())
            .and_then(|ac| ac.nat_ip.clone());
        if let Some(ip) = &nat_ip {
            let user = format!("{}/zones/{}/instances/{}", BASE, zone, body.name);
            for address in state.addresses.values_mut() {
                if address.address.as_deref() == Some(ip) {
                    address.status = Some("IN_USE".into());
                    address.users = Some(vec![user.clone()]);
                }
            }
        }

        let machine_type = body.machine_type.rsplit('/').next().unwrap_or_default();
        let network_ip = format!("10.0.0.{}", state.instances.len() + 2);
        let record = instance(zone, &body.name, machine_type, "RUNNING", nat_ip, &network_ip);
        state.instances.insert(key, record);
        let target = format!("{}/zones/{}/instances/{}", BASE, zone, body.name);
        Ok(self.operation(&mut state, OperationScope::Zone(zone.to_string()), target))
    }

    async fn instance_action(
        &self,
        zone: &str,
        name: &str,
        action: InstanceAction,
    ) -> Result<Operation> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("{} instance {}", action.verb(), name));
        let instance = state
            .instances
            .get_mut(&(zone.to_string(), name.to_string()))
            .ok_or_else(|| not_found(name))?;
        instance.status = Some(
            match action {
                InstanceAction::Stop => "TERMINATED",
                InstanceAction::Start | InstanceAction::Reset => "RUNNING",
            }
            .into(),
        );
        let target = format!("{}/zones/{}/instances/{}", BASE, zone, name);
        Ok(self.operation(&mut state, OperationScope::Zone(zone.to_string()), target))
    }

    async fn delete_instance(&self, zone: &str, name: &str) -> Result<Operation> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete instance {}", name));
        state
            .instances
            .remove(&(zone.to_string(), name.to_string()))
            .ok_or_else(|| not_found(name))?;
        let user = format!("{}/zones/{}/instances/{}", BASE, zone, name);
        for address in state.addresses.values_mut() {
            if address.users.as_ref().is_some_and(|u| u.contains(&user)) {
                address.status = Some("RESERVED".into());
                address.users = None;
            }
        }
        Ok(self.operation(&mut state, OperationScope::Zone(zone.to_string()), user))
    }

    async fn list_images(&self) -> Result<Vec<Image>> {
        let state = self.state.lock().unwrap();
        Ok(state.images.values().cloned().collect())
    }

    async fn get_image(&self, name: &str) -> Result<Image> {
        let state = self.state.lock().unwrap();
        state.images.get(name).cloned().ok_or_else(|| not_found(name))
    }

    async fn insert_image(&self, body: &ImageInsert) -> Result<Operation> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("insert image {}", body.name));
        if state.images.contains_key(&body.name) {
            return Err(GcpError::Conflict(body.name.clone()));
        }
        let id = Some(format!("{}", 7000 + state.next));
        state.images.insert(
            body.name.clone(),
            Image {
                id,
                name: Some(body.name.clone()),
                status: Some("READY".into()),
                family: None,
            },
        );
        let target = format!("{}/global/images/{}", BASE, body.name);
        Ok(self.operation(&mut state, OperationScope::Global, target))
    }

    async fn delete_image(&self, name: &str) -> Result<Operation> {
        let mut state = self.state.lock().unwrap();
        state.images.remove(name).ok_or_else(|| not_found(name))?;
        let target = format!("{}/global/images/{}", BASE, name);
        Ok(self.operation(&mut state, OperationScope::Global, target))
    }

    async fn list_addresses(&self, region: &str) -> Result<Vec<Address>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .addresses
            .iter()
            .filter(|((r, _), _)| r == region)
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn get_address(&self, region: &str, name: &str) -> Result<Address> {
        let state = self.state.lock().unwrap();
        state
            .addresses
            .get(&(region.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| not_found(name))
    }

    async fn insert_address(&self, region: &str, body: &AddressInsert) -> Result<Operation> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("insert address {}", body.name));
        let key = (region.to_string(), body.name.clone());
        if state.addresses.contains_key(&key) {
            return Err(GcpError::Conflict(body.name.clone()));
        }
        let ip = format!("34.64.0.{}", state.addresses.len() + 10);
        let id = Some(format!("{}", 5000 + state.next));
        state.addresses.insert(
            key,
            Address {
                id,
                name: Some(body.name.clone()),
                address: Some(ip),
                status: Some("RESERVED".into()),
                region: Some(format!("{}/regions/{}", BASE, region)),
                users: None,
            },
        );
        let target = format!("{}/regions/{}/addresses/{}", BASE, region, body.name);
        Ok(self.operation(&mut state, OperationScope::Region(region.to_string()), target))
    }

    async fn delete_address(&self, region: &str, name: &str) -> Result<Operation> {
        let mut state = self.state.lock().unwrap();
        state
            .addresses
            .remove(&(region.to_string(), name.to_string()))
            .ok_or_else(|| not_found(name))?;
        let target = format!("{}/regions/{}/addresses/{}", BASE, region, name);
        Ok(self.operation(&mut state, OperationScope::Region(region.to_string()), target))
    }

    async fn list_networks(&self) -> Result<Vec<Network>> {
        let state = self.state.lock().unwrap();
        Ok(state.networks.values().cloned().collect())
    }

    async fn get_network(&self, name: &str) -> Result<Network> {
        let state = self.state.lock().unwrap();
        state.networks.get(name).cloned().ok_or_else(|| not_found(name))
    }

    async fn insert_network(&self, body: &NetworkInsert) -> Result<Operation> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("insert network {}", body.name));
        if state.networks.contains_key(&body.name) {
            return Err(GcpError::Conflict(body.name.clone()));
        }
        let id = Some(format!("{}", 9000 + state.next));
        state.networks.insert(
            body.name.clone(),
            Network {
                id,
                name: Some(body.name.clone()),
                ipv4_range: body.ipv4_range.clone(),
                auto_create_subnetworks: body.auto_create_subnetworks,
                subnetworks: None,
            },
        );
        let target = format!("{}/global/networks/{}", BASE, body.name);
        Ok(self.operation(&mut state, OperationScope::Global, target))
    }

    async fn delete_network(&self, name: &str) -> Result<Operation> {
        let mut state = self.state.lock().unwrap();
        state.networks.remove(name).ok_or_else(|| not_found(name))?;
        let target = format!("{}/global/networks/{}", BASE, name);
        Ok(self.operation(&mut state, OperationScope::Global, target))
    }

    async fn get_operation(&self, scope: &OperationScope, name: &str) -> Result<Operation> {
        let mut state = self.state.lock().unwrap();
        state.polls += 1;
        let op = state
            .operations
            .get_mut(&(scope.path(), name.to_string()))
            .ok_or_else(|| not_found(name))?;
        op.remaining_polls = op.remaining_polls.saturating_sub(1);
        let done = op.remaining_polls == 0;
        Ok(Operation {
            name: Some(name.to_string()),
            status: Some(if done { "DONE" } else { "RUNNING" }.into()),
            target_link: None,
            error: op.error.clone().filter(|_| done).map(|message| OperationError {
                errors: vec![OperationErrorItem {
                    code: Some("QUOTA_EXCEEDED".into()),
                    message: Some(message),
                }],
            }),
        })
    }
}

/// Connector handing out one shared fake
pub struct FakeConnector {
    pub api: Arc<FakeCompute>,
}

#[async_trait]
impl GcpConnector for FakeConnector {
    async fn connect(
        &self,
        _credential: &CredentialInfo,
        _region: &RegionInfo,
    ) -> cloudspan_driver::Result<ComputeSession> {
        Ok(ComputeSession {
            api: self.api.clone(),
            project_id: "proj".into(),
            service_account: Some("svc@proj.iam.gserviceaccount.com".into()),
        })
    }
}

pub fn credential() -> CredentialInfo {
    CredentialInfo::new()
        .with_project_id("proj")
        .with_auth_token("ya29.token")
}

pub fn region() -> RegionInfo {
    RegionInfo::new("asia-northeast3").with_zone("asia-northeast3-a")
}
