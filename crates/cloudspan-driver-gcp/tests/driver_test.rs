//! GCP driver against an in-memory Compute Engine

mod common;

use cloudspan_driver::{
    CloudConnection, CloudDriver, CredentialInfo, DriverError, ImageReqInfo, PublicIpReqInfo,
    PublicIpStatus, RegionInfo, ResourceKind, VNetworkReqInfo, VmReqInfo, VmStatus, WaitConfig,
    capability_mismatches,
};
use cloudspan_driver_gcp::GcpDriver;
use common::{FakeCompute, FakeConnector, credential, region};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;

fn driver(api: &Arc<FakeCompute>) -> GcpDriver {
    GcpDriver::with_connector(Arc::new(FakeConnector { api: api.clone() }))
        .with_wait_config(WaitConfig::new(Duration::from_millis(1), Duration::from_secs(5)))
}

async fn connect(api: &Arc<FakeCompute>) -> Box<dyn CloudConnection> {
    driver(api).connect_cloud(credential(), region()).await.unwrap()
}

#[tokio::test]
async fn test_connect_requires_zone_and_credential() {
    let api = FakeCompute::new();

    let no_zone = driver(&api)
        .connect_cloud(credential(), RegionInfo::new("asia-northeast3"))
        .await;
    assert!(matches!(no_zone, Err(DriverError::InvalidRegion(_))));

    let no_project = driver(&api)
        .connect_cloud(CredentialInfo::new().with_auth_token("t"), region())
        .await;
    assert!(matches!(no_project, Err(DriverError::InvalidCredential(_))));
}

#[tokio::test]
async fn test_capability_matches_factories() {
    let api = FakeCompute::new();
    let conn = connect(&api).await;

    assert!(capability_mismatches(conn.as_ref()).is_empty());
    for kind in [ResourceKind::Security, ResourceKind::VNic, ResourceKind::KeyPair] {
        assert!(!conn.capability().supports(kind));
    }
    assert!(matches!(
        conn.create_key_pair_handler(),
        Err(DriverError::UnsupportedOperation(ResourceKind::KeyPair))
    ));
}

#[tokio::test]
async fn test_vm_lifecycle_with_reserved_address() {
    let api = FakeCompute::new();
    let conn = connect(&api).await;
    let ips = conn.create_public_ip_handler().unwrap();
    let vms = conn.create_vm_handler().unwrap();

    let ip = assert_ok!(ips.create_public_ip(PublicIpReqInfo::new("web-ip")).await);
    assert_eq!(ip.id, "asia-northeast3:web-ip");
    assert_eq!(ip.status, PublicIpStatus::Reserved);

    let vm = vms
        .start_vm(
            VmReqInfo::new(
                "web",
                "projects/debian-cloud/global/images/family/debian-12",
                "e2-small",
            )
            .with_public_ip(&ip.id),
        )
        .await
        .unwrap();
    assert_eq!(vm.id, "asia-northeast3-a:web");
    assert_eq!(vm.spec_id, "e2-small");
    assert_eq!(vm.status, VmStatus::Running);
    assert_eq!(vm.public_ip, ip.ip_address);
    assert_eq!(vm.vnetwork_id.as_deref(), Some("global:default"));

    let attached = ips.get_public_ip(&ip.id).await.unwrap();
    assert_eq!(attached.status, PublicIpStatus::InUse);
    assert_eq!(attached.attached_to.as_deref(), Some(vm.id.as_str()));

    assert_eq!(vms.suspend_vm(&vm.id).await.unwrap(), VmStatus::Suspended);
    assert_eq!(vms.get_vm_status(&vm.id).await.unwrap().detail, "TERMINATED");
    assert_eq!(vms.resume_vm(&vm.id).await.unwrap(), VmStatus::Running);
    assert_eq!(vms.reboot_vm(&vm.id).await.unwrap(), VmStatus::Running);
    assert_eq!(vms.terminate_vm(&vm.id).await.unwrap(), VmStatus::Terminated);

    assert!(vms.list_vm().await.unwrap().is_empty());
    let released = ips.get_public_ip(&ip.id).await.unwrap();
    assert_eq!(released.status, PublicIpStatus::Reserved);
    assert!(released.attached_to.is_none());
}

#[tokio::test]
async fn test_lifecycle_call_rejected_in_wrong_state() {
    let api = FakeCompute::new();
    api.seed_instance("asia-northeast3-a", "db", "TERMINATED");
    let conn = connect(&api).await;
    let vms = conn.create_vm_handler().unwrap();

    let result = vms.suspend_vm("asia-northeast3-a:db").await;
    assert!(matches!(result, Err(DriverError::OperationFailed(_))));
    assert!(!api.calls().iter().any(|c| c.starts_with("stop")));
}

#[tokio::test]
async fn test_ids_outside_bound_scope_are_invalid() {
    let api = FakeCompute::new();
    api.seed_instance("asia-northeast3-a", "db", "RUNNING");
    let conn = connect(&api).await;

    let vms = conn.create_vm_handler().unwrap();
    assert!(matches!(
        vms.get_vm("us-east1-b:db").await,
        Err(DriverError::InvalidId(_))
    ));
    assert!(matches!(vms.get_vm("db").await, Err(DriverError::InvalidId(_))));
    assert!(vms.get_vm("asia-northeast3-a:db").await.is_ok());

    let images = conn.create_image_handler().unwrap();
    assert!(matches!(
        images.get_image("asia-northeast3:base").await,
        Err(DriverError::InvalidId(_))
    ));
}

#[tokio::test]
async fn test_unsupported_vm_fields_never_reach_the_api() {
    let api = FakeCompute::new();
    let conn = connect(&api).await;
    let vms = conn.create_vm_handler().unwrap();

    let mut req = VmReqInfo::new("web", "global:base", "e2-small");
    req.key_pair_name = Some("ops".into());
    let result = vms.start_vm(req).await;
    assert!(matches!(result, Err(DriverError::InvalidRequest(_))));
    assert_eq!(api.instance_count(), 0);
}

#[tokio::test]
async fn test_provider_errors_are_classified() {
    let api = FakeCompute::new();
    let conn = connect(&api).await;
    let vnets = conn.create_vnetwork_handler().unwrap();

    vnets
        .create_vnetwork(VNetworkReqInfo::new("app"))
        .await
        .unwrap();
    assert!(matches!(
        vnets.create_vnetwork(VNetworkReqInfo::new("app")).await,
        Err(DriverError::AlreadyExists(_))
    ));

    assert!(assert_ok!(vnets.delete_vnetwork("global:app").await));
    assert!(matches!(
        vnets.delete_vnetwork("global:app").await,
        Err(DriverError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_mutations_wait_for_operation() {
    let api = FakeCompute::with_polls(3);
    let conn = connect(&api).await;
    let vnets = conn.create_vnetwork_handler().unwrap();

    let vnet = vnets
        .create_vnetwork(VNetworkReqInfo::new("legacy").with_address_prefix("10.240.0.0/16"))
        .await
        .unwrap();
    assert_eq!(vnet.id, "global:legacy");
    assert_eq!(vnet.address_prefix.as_deref(), Some("10.240.0.0/16"));
    assert_eq!(api.polls(), 3);
}

#[tokio::test]
async fn test_failed_operation_is_reported() {
    let api = FakeCompute::new();
    let conn = connect(&api).await;
    let images = conn.create_image_handler().unwrap();

    api.fail_next_operation("Quota 'IMAGES' exceeded");
    let result = images
        .create_image(ImageReqInfo::new("base").with_source("global:debian"))
        .await;
    assert!(matches!(
        result,
        Err(DriverError::OperationFailed(msg)) if msg.contains("QUOTA_EXCEEDED")
    ));
}

#[tokio::test(start_paused = true)]
async fn test_operation_timeout() {
    let api = FakeCompute::with_polls(usize::MAX);
    let conn = GcpDriver::with_connector(Arc::new(FakeConnector { api: api.clone() }))
        .with_wait_config(WaitConfig::new(
            Duration::from_secs(2),
            Duration::from_secs(10),
        ))
        .connect_cloud(credential(), region())
        .await
        .unwrap();

    let result = conn
        .create_public_ip_handler()
        .unwrap()
        .create_public_ip(PublicIpReqInfo::new("slow"))
        .await;
    assert!(matches!(result, Err(DriverError::OperationTimeout(_))));
}

#[tokio::test]
async fn test_cancelled_connection() {
    let api = FakeCompute::new();
    let conn = connect(&api).await;
    let vms = conn.create_vm_handler().unwrap();

    conn.cancellation_token().cancel();
    assert!(matches!(vms.list_vm().await, Err(DriverError::Cancelled)));
}
