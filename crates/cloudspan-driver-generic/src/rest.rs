//! REST client for the generic provider
//!
//! Token exchange against the identity endpoint, then bearer-authenticated
//! calls to `<endpoint>/regions/<region>/<collection>`.

use crate::api::{Collection, GenericApi, GenericConnector, ServerAction};
use crate::driver::DRIVER_NAME;
use crate::error::{GenericError, Result};
use async_trait::async_trait;
use cloudspan_driver::{CredentialInfo, DriverError, RegionInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenant_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Map a non-success response onto [`GenericError`]
async fn check(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: ErrorBody = response.json().await.unwrap_or_default();
    let message = body.message.unwrap_or_else(|| status.to_string());
    match status.as_u16() {
        404 => Err(GenericError::NotFound(what.to_string())),
        409 => Err(GenericError::Conflict(what.to_string())),
        401 | 403 => Err(GenericError::Unauthorized(message)),
        code => Err(GenericError::Api {
            status: code,
            code: body.code,
            message,
        }),
    }
}

/// Bearer-authenticated client bound to one region
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestClient {
    pub fn new(http: reqwest::Client, endpoint: &str, region: &str, token: String) -> Self {
        Self {
            http,
            base_url: format!("{}/regions/{}", endpoint.trim_end_matches('/'), region),
            token,
        }
    }

    fn url(&self, collection: Collection) -> String {
        format!("{}/{}", self.base_url, collection.path())
    }

    fn item_url(&self, collection: Collection, id: &str) -> String {
        format!("{}/{}", self.url(collection), id)
    }
}

#[async_trait]
impl GenericApi for RestClient {
    async fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        let url = self.url(collection);
        tracing::debug!("GET {}", url);

        let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
        let list: ListResponse = check(response, collection.path()).await?.json().await?;
        Ok(list.items)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Value> {
        let url = self.item_url(collection, id);
        tracing::debug!("GET {}", url);

        let response = self.http.get(&url).bearer_auth(&self.token).send().await?;
        Ok(check(response, id).await?.json().await?)
    }

    async fn create(&self, collection: Collection, body: Value) -> Result<Value> {
        let url = self.url(collection);
        tracing::debug!("POST {}", url);

        let what = body
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(collection.path())
            .to_string();
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Ok(check(response, &what).await?.json().await?)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let url = self.item_url(collection, id);
        tracing::debug!("DELETE {}", url);

        let response = self
            .http
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        check(response, id).await?;
        Ok(())
    }

    async fn server_action(&self, id: &str, action: ServerAction) -> Result<()> {
        let url = format!("{}/actions", self.item_url(Collection::Servers, id));
        tracing::debug!("POST {} ({:?})", url, action);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "action": action }))
            .send()
            .await?;
        check(response, id).await?;
        Ok(())
    }
}

/// Default connector: exchanges username/password for a token, or uses
/// `auth_token` as is
#[derive(Debug, Clone, Default)]
pub struct RestConnector {
    http: reqwest::Client,
}

impl RestConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn issue_token(
        &self,
        endpoint: &str,
        username: &str,
        password: &str,
        tenant_id: Option<&str>,
    ) -> Result<String> {
        let url = format!("{}/auth/tokens", endpoint);
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(&TokenRequest {
                username,
                password,
                tenant_id,
            })
            .send()
            .await?;
        let body: TokenResponse = check(response, "token").await?.json().await?;
        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GenericError::Unauthorized("identity endpoint returned no token".into()))
    }
}

#[async_trait]
impl GenericConnector for RestConnector {
    async fn connect(
        &self,
        credential: &CredentialInfo,
        region: &RegionInfo,
    ) -> cloudspan_driver::Result<Arc<dyn GenericApi>> {
        let endpoint = CredentialInfo::require(credential.identity_endpoint(), "identity_endpoint")?
            .trim_end_matches('/');

        let token = match credential.auth_token() {
            Some(token) => token.to_string(),
            None => {
                let username = CredentialInfo::require(credential.username(), "username")?;
                let password = CredentialInfo::require(credential.password(), "password")?;
                self.issue_token(endpoint, username, password, credential.tenant_id())
                    .await
                    .map_err(|e| DriverError::connection_failed(DRIVER_NAME, e))?
            }
        };

        Ok(Arc::new(RestClient::new(
            self.http.clone(),
            endpoint,
            region.region(),
            token,
        )))
    }
}
