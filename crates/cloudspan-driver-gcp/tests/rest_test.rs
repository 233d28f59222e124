//! Token exchange and Compute Engine wire format against a local mock server

use cloudspan_driver::{
    CloudDriver, CredentialInfo, DriverError, RegionInfo, VNetworkReqInfo, VmStatus, WaitConfig,
};
use cloudspan_driver_gcp::{
    ComputeApi, ComputeRestClient, GcpConnector, GcpDriver, GcpError, InstanceAction,
    RestConnector,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = include_str!("fixtures/test_key.pem");

fn key_json(token_uri: &str) -> String {
    json!({
        "type": "service_account",
        "project_id": "proj",
        "private_key_id": "key-1",
        "private_key": TEST_KEY,
        "client_email": "svc@proj.iam.gserviceaccount.com",
        "token_uri": token_uri,
    })
    .to_string()
}

fn region() -> RegionInfo {
    RegionInfo::new("us-east1").with_zone("us-east1-b")
}

fn client(server: &MockServer) -> ComputeRestClient {
    ComputeRestClient::new(reqwest::Client::new(), &server.uri(), "proj", "tok".to_string())
}

#[tokio::test]
async fn test_service_account_exchange_then_bearer_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.issued",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/proj/zones/us-east1-b/instances"))
        .and(header("authorization", "Bearer ya29.issued"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "name": "web",
                "status": "STOPPING",
                "zone": "https://compute.googleapis.com/compute/v1/projects/proj/zones/us-east1-b",
                "machineType": "https://compute.googleapis.com/compute/v1/projects/proj/zones/us-east1-b/machineTypes/e2-small"
            }]
        })))
        .mount(&server)
        .await;

    let credential =
        CredentialInfo::new().with_client_secret(key_json(&format!("{}/token", server.uri())));
    let driver = GcpDriver::with_connector(Arc::new(
        RestConnector::new().with_endpoint(server.uri()),
    ));
    let conn = driver.connect_cloud(credential, region()).await.unwrap();

    let statuses = conn
        .create_vm_handler()
        .unwrap()
        .list_vm_status()
        .await
        .unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].id, "us-east1-b:web");
    assert_eq!(statuses[0].status, VmStatus::Suspending);
}

#[tokio::test]
async fn test_rejected_assertion_is_connection_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;

    let credential =
        CredentialInfo::new().with_client_secret(key_json(&format!("{}/token", server.uri())));
    let result = RestConnector::new()
        .with_endpoint(server.uri())
        .connect(&credential, &region())
        .await;
    match result {
        Err(DriverError::ConnectionFailed { provider, source }) => {
            assert_eq!(provider, "gcp");
            assert!(source.to_string().contains("Invalid JWT Signature"));
        }
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("exchange should fail"),
    }
}

#[tokio::test]
async fn test_auth_token_skips_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let credential = CredentialInfo::new()
        .with_auth_token("ya29.ready")
        .with_project_id("proj");
    let session = RestConnector::new()
        .with_endpoint(server.uri())
        .connect(&credential, &region())
        .await
        .unwrap();
    assert_eq!(session.project_id, "proj");
    assert!(session.service_account.is_none());
}

#[tokio::test]
async fn test_malformed_key_is_invalid_credential() {
    let credential = CredentialInfo::new().with_client_secret("{not json");
    let result = RestConnector::new().connect(&credential, &region()).await;
    assert!(matches!(result, Err(DriverError::InvalidCredential(_))));
}

#[tokio::test]
async fn test_status_classification() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/proj/global/images/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "not found", "status": "NOT_FOUND"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/proj/global/networks/locked"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "Required 'compute.networks.get' permission", "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/proj/global/networks/busy"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"code": 503, "message": "backend unavailable", "status": "UNAVAILABLE"}
        })))
        .mount(&server)
        .await;

    let api = client(&server);
    assert!(matches!(
        api.get_image("missing").await,
        Err(GcpError::NotFound(_))
    ));
    assert!(matches!(
        api.get_network("locked").await,
        Err(GcpError::Unauthorized(msg)) if msg.contains("compute.networks.get")
    ));
    match api.get_network("busy").await {
        Err(GcpError::Api { status, code, .. }) => {
            assert_eq!(status, 503);
            assert_eq!(code.as_deref(), Some("UNAVAILABLE"));
        }
        other => panic!("unexpected result {:?}", other.map(|n| n.name)),
    }
}

#[tokio::test]
async fn test_instance_action_posts_to_verb() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/proj/zones/us-east1-b/instances/web/reset"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operation-1", "status": "RUNNING"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let op = client(&server)
        .instance_action("us-east1-b", "web", InstanceAction::Reset)
        .await
        .unwrap();
    assert_eq!(op.name.as_deref(), Some("operation-1"));
}

#[tokio::test]
async fn test_insert_polls_global_operation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/proj/global/networks"))
        .and(body_string_contains("\"autoCreateSubnetworks\":true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operation-7", "status": "PENDING"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/proj/global/operations/operation-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operation-7", "status": "DONE"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/proj/global/networks/app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "app", "autoCreateSubnetworks": true
        })))
        .mount(&server)
        .await;

    let credential = CredentialInfo::new()
        .with_auth_token("tok")
        .with_project_id("proj");
    let conn = GcpDriver::with_connector(Arc::new(
        RestConnector::new().with_endpoint(server.uri()),
    ))
    .with_wait_config(WaitConfig::new(Duration::from_millis(10), Duration::from_secs(5)))
    .connect_cloud(credential, region())
    .await
    .unwrap();

    let vnet = conn
        .create_vnetwork_handler()
        .unwrap()
        .create_vnetwork(VNetworkReqInfo::new("app"))
        .await
        .unwrap();
    assert_eq!(vnet.id, "global:app");
}
