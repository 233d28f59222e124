//! Compute Engine REST client

use crate::api::{
    Address, AddressInsert, ComputeApi, ComputeSession, GcpConnector, Image, ImageInsert,
    Instance, InstanceAction, InstanceInsert, Network, NetworkInsert, Operation, OperationScope,
};
use crate::auth::{ServiceAccountKey, exchange_token};
use crate::driver::DRIVER_NAME;
use crate::error::{GcpError, Result};
use async_trait::async_trait;
use cloudspan_driver::{CredentialInfo, DriverError, RegionInfo};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const COMPUTE_ENDPOINT: &str = "https://compute.googleapis.com/compute/v1";

#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

async fn check(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .json::<ErrorEnvelope>()
        .await
        .unwrap_or_default()
        .error
        .unwrap_or_default();
    let message = body.message.unwrap_or_else(|| status.to_string());
    match status.as_u16() {
        404 => Err(GcpError::NotFound(what.to_string())),
        409 => Err(GcpError::Conflict(what.to_string())),
        401 | 403 => Err(GcpError::Unauthorized(message)),
        code => Err(GcpError::Api {
            status: code,
            code: body.status,
            message,
        }),
    }
}

/// Bearer-authenticated client for one project
pub struct ComputeRestClient {
    http: reqwest::Client,
    project_url: String,
    token: String,
}

impl ComputeRestClient {
    pub fn new(http: reqwest::Client, endpoint: &str, project_id: &str, token: String) -> Self {
        Self {
            http,
            project_url: format!("{}/projects/{}", endpoint.trim_end_matches('/'), project_id),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.project_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);
        let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
        Ok(check(response, what).await?.json().await?)
    }

    async fn list_json<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let list: ListResponse<T> = self.get_json(path, path).await?;
        Ok(list.items)
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        body: Option<&B>,
        what: &str,
    ) -> Result<Operation> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);
        let mut request = self.http.post(&url).bearer_auth(&self.token);
        request = match body {
            Some(body) => request.json(body),
            None => request.header(reqwest::header::CONTENT_LENGTH, 0),
        };
        let response = request.send().await?;
        Ok(check(response, what).await?.json().await?)
    }

    async fn delete_json(&self, path: &str, what: &str) -> Result<Operation> {
        let url = self.url(path);
        tracing::debug!("DELETE {}", url);
        let response = self.http.delete(&url).bearer_auth(&self.token).send().await?;
        Ok(check(response, what).await?.json().await?)
    }
}

#[async_trait]
impl ComputeApi for ComputeRestClient {
    async fn list_instances(&self, zone: &str) -> Result<Vec<Instance>> {
        self.list_json(&format!("zones/{}/instances", zone)).await
    }

    async fn get_instance(&self, zone: &str, name: &str) -> Result<Instance> {
        self.get_json(&format!("zones/{}/instances/{}", zone, name), name)
            .await
    }

    async fn insert_instance(&self, zone: &str, body: &InstanceInsert) -> Result<Operation> {
        self.post_json(&format!("zones/{}/instances", zone), Some(body), &body.name)
            .await
    }

    async fn instance_action(
        &self,
        zone: &str,
        name: &str,
        action: InstanceAction,
    ) -> Result<Operation> {
        let path = format!("zones/{}/instances/{}/{}", zone, name, action.verb());
        self.post_json::<()>(&path, None, name).await
    }

    async fn delete_instance(&self, zone: &str, name: &str) -> Result<Operation> {
        self.delete_json(&format!("zones/{}/instances/{}", zone, name), name)
            .await
    }

    async fn list_images(&self) -> Result<Vec<Image>> {
        self.list_json("global/images").await
    }

    async fn get_image(&self, name: &str) -> Result<Image> {
        self.get_json(&format!("global/images/{}", name), name).await
    }

    async fn insert_image(&self, body: &ImageInsert) -> Result<Operation> {
        self.post_json("global/images", Some(body), &body.name).await
    }

    async fn delete_image(&self, name: &str) -> Result<Operation> {
        self.delete_json(&format!("global/images/{}", name), name)
            .await
    }

    async fn list_addresses(&self, region: &str) -> Result<Vec<Address>> {
        self.list_json(&format!("regions/{}/addresses", region)).await
    }

    async fn get_address(&self, region: &str, name: &str) -> Result<Address> {
        self.get_json(&format!("regions/{}/addresses/{}", region, name), name)
            .await
    }

    async fn insert_address(&self, region: &str, body: &AddressInsert) -> Result<Operation> {
        self.post_json(&format!("regions/{}/addresses", region), Some(body), &body.name)
            .await
    }

    async fn delete_address(&self, region: &str, name: &str) -> Result<Operation> {
        self.delete_json(&format!("regions/{}/addresses/{}", region, name), name)
            .await
    }

    async fn list_networks(&self) -> Result<Vec<Network>> {
        self.list_json("global/networks").await
    }

    async fn get_network(&self, name: &str) -> Result<Network> {
        self.get_json(&format!("global/networks/{}", name), name)
            .await
    }

    async fn insert_network(&self, body: &NetworkInsert) -> Result<Operation> {
        self.post_json("global/networks", Some(body), &body.name).await
    }

    async fn delete_network(&self, name: &str) -> Result<Operation> {
        self.delete_json(&format!("global/networks/{}", name), name)
            .await
    }

    async fn get_operation(&self, scope: &OperationScope, name: &str) -> Result<Operation> {
        self.get_json(&format!("{}/operations/{}", scope.path(), name), name)
            .await
    }
}

/// Default connector
///
/// Uses `auth_token` directly when present; otherwise `client_secret` must
/// hold the service-account key JSON, which is exchanged for a token.
/// `project_id` falls back to the key's project.
#[derive(Debug, Clone)]
pub struct RestConnector {
    http: reqwest::Client,
    endpoint: String,
}

impl Default for RestConnector {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: COMPUTE_ENDPOINT.to_string(),
        }
    }
}

impl RestConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point at another Compute endpoint (emulators, tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl GcpConnector for RestConnector {
    async fn connect(
        &self,
        credential: &CredentialInfo,
        _region: &RegionInfo,
    ) -> cloudspan_driver::Result<ComputeSession> {
        let key = credential
            .client_secret()
            .map(ServiceAccountKey::from_json)
            .transpose()
            .map_err(|e| DriverError::InvalidCredential(e.to_string()))?;

        let project_id = credential
            .project_id()
            .map(str::to_string)
            .or_else(|| key.as_ref().and_then(|k| k.project_id.clone()))
            .ok_or_else(|| DriverError::InvalidCredential("missing field project_id".into()))?;

        let token = match (credential.auth_token(), &key) {
            (Some(token), _) => token.to_string(),
            (None, Some(key)) => exchange_token(&self.http, key)
                .await
                .map_err(|e| DriverError::connection_failed(DRIVER_NAME, e))?,
            (None, None) => {
                return Err(DriverError::InvalidCredential(
                    "either auth_token or a service-account key in client_secret is required"
                        .into(),
                ));
            }
        };

        Ok(ComputeSession {
            api: Arc::new(ComputeRestClient::new(
                self.http.clone(),
                &self.endpoint,
                &project_id,
                token,
            )),
            project_id,
            service_account: key.map(|k| k.client_email),
        })
    }
}
