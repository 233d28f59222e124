//! Generic driver against an in-memory provider

mod common;

use cloudspan_driver::{
    CloudConnection, CloudDriver, CredentialInfo, DriverError, KeyPairReqInfo, PublicIpReqInfo,
    PublicIpStatus, RegionInfo, ResourceKind, SecurityReqInfo, SecurityRuleInfo, VNetworkReqInfo,
    VmReqInfo, VmStatus, capability_mismatches,
};
use cloudspan_driver_generic::{Collection, GenericDriver};
use common::{FakeConnector, FakeGenericApi, credential};
use serde_json::json;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

async fn connect(api: &Arc<FakeGenericApi>) -> Box<dyn CloudConnection> {
    GenericDriver::with_connector(Arc::new(FakeConnector { api: api.clone() }))
        .connect_cloud(credential(), RegionInfo::new("kr-central-1"))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_invalid_credential_is_rejected_before_connecting() {
    let api = FakeGenericApi::new();
    let driver = GenericDriver::with_connector(Arc::new(FakeConnector { api: api.clone() }));

    let result = driver
        .connect_cloud(
            CredentialInfo::new().with_username("admin"),
            RegionInfo::new("kr-central-1"),
        )
        .await;
    assert!(matches!(result, Err(DriverError::InvalidCredential(_))));

    let result = driver.connect_cloud(credential(), RegionInfo::new("")).await;
    assert!(matches!(result, Err(DriverError::InvalidRegion(_))));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_capability_matches_factories() {
    let api = FakeGenericApi::new();
    let conn = connect(&api).await;

    assert!(capability_mismatches(conn.as_ref()).is_empty());
    assert!(matches!(
        conn.create_vnic_handler(),
        Err(DriverError::UnsupportedOperation(ResourceKind::VNic))
    ));
    assert!(conn.create_key_pair_handler().is_ok());
}

#[tokio::test]
async fn test_vm_lifecycle() {
    let api = FakeGenericApi::new();
    let conn = connect(&api).await;
    let vms = conn.create_vm_handler().unwrap();

    let vm = vms
        .start_vm(VmReqInfo::new("web", "tpl-ubuntu", "small"))
        .await
        .unwrap();
    assert_eq!(vm.status, VmStatus::Pending);
    assert_eq!(vm.region.region(), "kr-central-1");

    assert_eq!(vms.suspend_vm(&vm.id).await.unwrap(), VmStatus::Suspended);
    let err = vms.reboot_vm(&vm.id).await.unwrap_err();
    assert!(matches!(err, DriverError::OperationFailed(_)));
    assert_eq!(vms.resume_vm(&vm.id).await.unwrap(), VmStatus::Running);
    assert_eq!(vms.reboot_vm(&vm.id).await.unwrap(), VmStatus::Running);

    let statuses = vms.list_vm_status().await.unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].detail, "RUNNING");

    assert_eq!(vms.terminate_vm(&vm.id).await.unwrap(), VmStatus::Terminated);
    assert!(vms.get_vm(&vm.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_rejected_transition_makes_no_action_call() {
    let api = FakeGenericApi::new();
    api.seed(
        Collection::Servers,
        "srv-9",
        json!({"id": "srv-9", "name": "old", "state": "STOPPED", "templateId": "t", "spec": "s"}),
    );
    let conn = connect(&api).await;
    let vms = conn.create_vm_handler().unwrap();

    assert!(vms.suspend_vm("srv-9").await.is_err());
    assert!(!api.calls().iter().any(|c| c.starts_with("action")));
}

#[tokio::test]
async fn test_list_fails_on_untranslatable_record() {
    let api = FakeGenericApi::new();
    api.seed(
        Collection::Servers,
        "srv-1",
        json!({"id": "srv-1", "name": "good", "state": "RUNNING", "templateId": "t", "spec": "s"}),
    );
    api.seed(
        Collection::Servers,
        "srv-2",
        json!({"id": "srv-2", "state": "RUNNING", "templateId": "t", "spec": "s"}),
    );
    let conn = connect(&api).await;
    let vms = conn.create_vm_handler().unwrap();

    let err = vms.list_vm().await.unwrap_err();
    assert!(matches!(err, DriverError::TranslationError(_)));
    assert!(vms.get_vm("srv-1").await.is_ok());
}

#[tokio::test]
async fn test_malformed_id_never_reaches_provider() {
    let api = FakeGenericApi::new();
    let conn = connect(&api).await;
    let ips = conn.create_public_ip_handler().unwrap();

    for id in ["", "rg1:ip1", "a/b", " ip"] {
        let err = ips.get_public_ip(id).await.unwrap_err();
        assert!(matches!(err, DriverError::InvalidId(_)), "{:?}", id);
    }
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_public_ip_create_list_delete() {
    let api = FakeGenericApi::new();
    let conn = connect(&api).await;
    let ips = conn.create_public_ip_handler().unwrap();

    let ip = ips
        .create_public_ip(PublicIpReqInfo::new("ip1"))
        .await
        .unwrap();
    assert_eq!(ip.status, PublicIpStatus::Reserved);
    assert!(ip.ip_address.is_some());

    let listed = ips.list_public_ip().await.unwrap();
    assert_eq!(listed, vec![ip.clone()]);

    let dup = ips.create_public_ip(PublicIpReqInfo::new("ip1")).await;
    assert!(matches!(dup, Err(DriverError::AlreadyExists(_))));

    assert!(assert_ok!(ips.delete_public_ip(&ip.id).await));
    assert!(assert_err!(ips.delete_public_ip(&ip.id).await).is_not_found());
}

#[tokio::test]
async fn test_security_group_rules_survive_round_trip() {
    let api = FakeGenericApi::new();
    let conn = connect(&api).await;
    let sgs = conn.create_security_handler().unwrap();

    let req = SecurityReqInfo::new("web")
        .with_rule(SecurityRuleInfo::inbound_tcp(22, "10.0.0.0/8"))
        .with_rule(SecurityRuleInfo::inbound_tcp(443, "0.0.0.0/0"));
    let created = sgs.create_security(req.clone()).await.unwrap();
    assert_eq!(created.rules, req.rules);
    assert_eq!(sgs.get_security(&created.id).await.unwrap(), created);
}

#[tokio::test]
async fn test_vnetwork_requires_address_prefix() {
    let api = FakeGenericApi::new();
    let conn = connect(&api).await;
    let nets = conn.create_vnetwork_handler().unwrap();

    let err = nets
        .create_vnetwork(VNetworkReqInfo::new("net1"))
        .await
        .unwrap_err();
    assert!(matches!(err, DriverError::InvalidRequest(_)));
    assert_eq!(api.count(Collection::Subnets), 0);

    let net = nets
        .create_vnetwork(VNetworkReqInfo::new("net1").with_address_prefix("10.1.0.0/24"))
        .await
        .unwrap();
    assert_eq!(net.address_prefix.as_deref(), Some("10.1.0.0/24"));
}

#[tokio::test]
async fn test_key_pair_private_key_only_on_create() {
    let api = FakeGenericApi::new();
    let conn = connect(&api).await;
    let keys = conn.create_key_pair_handler().unwrap();

    let created = keys.create_key(KeyPairReqInfo::new("deploy")).await.unwrap();
    assert_eq!(created.id, "deploy");
    assert!(created.private_key.is_some());

    let listed = keys.list_key().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].private_key.is_none());
}

#[tokio::test]
async fn test_cancelled_connection() {
    let api = FakeGenericApi::new();
    let conn = connect(&api).await;
    let vms = conn.create_vm_handler().unwrap();

    conn.cancellation_token().cancel();
    let err = vms.list_vm().await.unwrap_err();
    assert!(matches!(err, DriverError::Cancelled));
}
