//! ARM REST client
//!
//! Client-credentials token from the identity platform, then
//! bearer-authenticated calls under
//! `<management>/subscriptions/<s>/resourceGroups/<rg>/providers/...`.

use crate::api::{
    Accepted, ArmApi, ArmSession, AzureConnector, OperationRef, OperationStatus, ResourceType,
    VmAction,
};
use crate::driver::DRIVER_NAME;
use crate::error::{AzureError, Result};
use async_trait::async_trait;
use cloudspan_driver::{CredentialInfo, DriverError, RegionInfo};
use reqwest::header::{CONTENT_LENGTH, HeaderMap, IF_NONE_MATCH, LOCATION};
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";
pub const LOGIN_ENDPOINT: &str = "https://login.microsoftonline.com";
const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";
const ASYNC_OPERATION: &str = "Azure-AsyncOperation";

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    scope: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenError {
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    value: Vec<Value>,
    next_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
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
        404 => Err(AzureError::NotFound(what.to_string())),
        // 412 answers a create-only PUT (`If-None-Match: *`) on a taken name
        409 | 412 => Err(AzureError::Conflict(what.to_string())),
        401 | 403 => Err(AzureError::Unauthorized(message)),
        code => Err(AzureError::Api {
            status: code,
            code: body.code,
            message,
        }),
    }
}

/// Operation to follow: `Azure-AsyncOperation`, falling back to `Location`
fn operation_ref(headers: &HeaderMap) -> Option<OperationRef> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    header(ASYNC_OPERATION)
        .map(OperationRef::AsyncOperation)
        .or_else(|| header(LOCATION.as_str()).map(OperationRef::Location))
}

/// `Location` polls carry no status document; the HTTP status is the state
fn location_status(status: StatusCode) -> OperationStatus {
    match status {
        StatusCode::ACCEPTED => OperationStatus::new("InProgress"),
        StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => {
            OperationStatus::new("Succeeded")
        }
        other => OperationStatus::failed(None, Some(other.to_string())),
    }
}

/// Bearer-authenticated client for one subscription
pub struct ArmRestClient {
    http: reqwest::Client,
    subscription_url: String,
    token: String,
}

impl ArmRestClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: &str,
        subscription_id: &str,
        token: String,
    ) -> Self {
        Self {
            http,
            subscription_url: format!(
                "{}/subscriptions/{}",
                endpoint.trim_end_matches('/'),
                subscription_id
            ),
            token,
        }
    }

    fn collection_url(&self, group: &str, kind: ResourceType) -> String {
        format!(
            "{}/resourceGroups/{}/providers/{}",
            self.subscription_url,
            group,
            kind.provider_path()
        )
    }

    fn resource_url(&self, group: &str, kind: ResourceType, name: &str) -> String {
        format!("{}/{}", self.collection_url(group, kind), name)
    }

    /// Bearer auth plus api-version; VMs are read with their instance view
    fn request(&self, builder: RequestBuilder, kind: ResourceType, read: bool) -> RequestBuilder {
        let builder = builder
            .bearer_auth(&self.token)
            .query(&[("api-version", kind.api_version())]);
        if read && kind == ResourceType::VirtualMachines {
            builder.query(&[("$expand", "instanceView")])
        } else {
            builder
        }
    }

    /// Accepted (202) responses must name the operation to follow
    fn follow(status: StatusCode, headers: &HeaderMap, what: &str) -> Result<Option<OperationRef>> {
        match (status, operation_ref(headers)) {
            (StatusCode::ACCEPTED, None) => Err(AzureError::MissingOperation(what.to_string())),
            (_, operation) => Ok(operation),
        }
    }
}

#[async_trait]
impl ArmApi for ArmRestClient {
    async fn list(&self, group: &str, kind: ResourceType) -> Result<Vec<Value>> {
        let url = self.collection_url(group, kind);
        tracing::debug!("GET {}", url);
        let response = self
            .request(self.http.get(&url), kind, true)
            .send()
            .await?;
        let mut page: ListResponse = check(response, &url).await?.json().await?;
        let mut items = std::mem::take(&mut page.value);

        while let Some(next) = page.next_link.take() {
            tracing::debug!("GET {}", next);
            let response = self.http.get(&next).bearer_auth(&self.token).send().await?;
            page = check(response, &next).await?.json().await?;
            items.append(&mut page.value);
        }
        Ok(items)
    }

    async fn get(&self, group: &str, kind: ResourceType, name: &str) -> Result<Value> {
        let url = self.resource_url(group, kind, name);
        tracing::debug!("GET {}", url);
        let response = self
            .request(self.http.get(&url), kind, true)
            .send()
            .await?;
        Ok(check(response, name).await?.json().await?)
    }

    async fn put(
        &self,
        group: &str,
        kind: ResourceType,
        name: &str,
        body: Value,
    ) -> Result<Accepted> {
        let url = self.resource_url(group, kind, name);
        tracing::debug!("PUT {}", url);
        let response = self
            .request(self.http.put(&url), kind, false)
            .header(IF_NONE_MATCH, "*")
            .json(&body)
            .send()
            .await?;
        let response = check(response, name).await?;
        let operation = operation_ref(response.headers());
        Ok(Accepted {
            resource: response.json().await?,
            operation,
        })
    }

    async fn delete(
        &self,
        group: &str,
        kind: ResourceType,
        name: &str,
    ) -> Result<Option<OperationRef>> {
        let url = self.resource_url(group, kind, name);
        tracing::debug!("DELETE {}", url);
        let response = self
            .request(self.http.delete(&url), kind, false)
            .send()
            .await?;
        // ARM answers 204 for a resource that is already gone
        if response.status() == StatusCode::NO_CONTENT {
            return Err(AzureError::NotFound(name.to_string()));
        }
        let response = check(response, name).await?;
        Self::follow(response.status(), response.headers(), name)
    }

    async fn vm_action(
        &self,
        group: &str,
        name: &str,
        action: VmAction,
    ) -> Result<Option<OperationRef>> {
        let url = format!(
            "{}/{}",
            self.resource_url(group, ResourceType::VirtualMachines, name),
            action.verb()
        );
        tracing::debug!("POST {}", url);
        let response = self
            .request(self.http.post(&url), ResourceType::VirtualMachines, false)
            .header(CONTENT_LENGTH, 0)
            .send()
            .await?;
        let response = check(response, name).await?;
        Self::follow(response.status(), response.headers(), name)
    }

    async fn get_operation(&self, operation: &OperationRef) -> Result<OperationStatus> {
        let url = operation.url();
        tracing::debug!("GET {}", url);
        let response = self.http.get(url).bearer_auth(&self.token).send().await?;
        let response = check(response, url).await?;
        match operation {
            OperationRef::AsyncOperation(_) => Ok(response.json().await?),
            OperationRef::Location(_) => Ok(location_status(response.status())),
        }
    }
}

/// Default connector
///
/// Uses `auth_token` directly when present; otherwise exchanges
/// `client_id`/`client_secret` for a token at
/// `<identity_endpoint or login.microsoftonline.com>/<tenant_id>/oauth2/v2.0/token`.
#[derive(Debug, Clone)]
pub struct RestConnector {
    http: reqwest::Client,
    management_endpoint: String,
}

impl Default for RestConnector {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            management_endpoint: MANAGEMENT_ENDPOINT.to_string(),
        }
    }
}

impl RestConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point at another ARM endpoint (sovereign clouds, tests)
    pub fn with_management_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.management_endpoint = endpoint.into();
        self
    }

    async fn issue_token(&self, credential: &CredentialInfo) -> Result<String> {
        let missing = |field: &str| AzureError::Unauthorized(format!("missing field {}", field));
        let tenant = credential.tenant_id().ok_or_else(|| missing("tenant_id"))?;
        let login = credential
            .identity_endpoint()
            .unwrap_or(LOGIN_ENDPOINT)
            .trim_end_matches('/');
        let url = format!("{}/{}/oauth2/v2.0/token", login, tenant);
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .form(&TokenRequest {
                grant_type: "client_credentials",
                client_id: credential.client_id().ok_or_else(|| missing("client_id"))?,
                client_secret: credential
                    .client_secret()
                    .ok_or_else(|| missing("client_secret"))?,
                scope: MANAGEMENT_SCOPE,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: TokenError = response.json().await.unwrap_or_default();
            let message = body
                .error_description
                .or(body.error)
                .unwrap_or_else(|| status.to_string());
            return Err(AzureError::Unauthorized(message));
        }

        let body: TokenResponse = response.json().await?;
        body.access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AzureError::Unauthorized("token endpoint returned no access_token".into())
            })
    }
}

#[async_trait]
impl AzureConnector for RestConnector {
    async fn connect(
        &self,
        credential: &CredentialInfo,
        _region: &RegionInfo,
    ) -> cloudspan_driver::Result<ArmSession> {
        let subscription_id =
            CredentialInfo::require(credential.subscription_id(), "subscription_id")?;

        let token = match credential.auth_token() {
            Some(token) => token.to_string(),
            None => self
                .issue_token(credential)
                .await
                .map_err(|e| DriverError::connection_failed(DRIVER_NAME, e))?,
        };

        Ok(ArmSession {
            api: Arc::new(ArmRestClient::new(
                self.http.clone(),
                &self.management_endpoint,
                subscription_id,
                token,
            )),
            subscription_id: subscription_id.to_string(),
        })
    }
}
