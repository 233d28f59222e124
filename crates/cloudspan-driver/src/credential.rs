//! Credential and region model
//!
//! Immutable value objects handed to `CloudDriver::connect_cloud`. Drivers
//! read what they need through the `require_*` accessors, which turn a
//! missing field into `InvalidCredential` / `InvalidRegion`.

use crate::error::{DriverError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authentication material for one provider account
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identity_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subscription_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
}

macro_rules! credential_field {
    ($field:ident, $with:ident) => {
        pub fn $field(&self) -> Option<&str> {
            self.$field.as_deref().filter(|v| !v.is_empty())
        }

        pub fn $with(mut self, value: impl Into<String>) -> Self {
            self.$field = Some(value.into());
            self
        }
    };
}

impl CredentialInfo {
    pub fn new() -> Self {
        Self::default()
    }

    credential_field!(identity_endpoint, with_identity_endpoint);
    credential_field!(username, with_username);
    credential_field!(password, with_password);
    credential_field!(tenant_id, with_tenant_id);
    credential_field!(client_id, with_client_id);
    credential_field!(client_secret, with_client_secret);
    credential_field!(subscription_id, with_subscription_id);
    credential_field!(project_id, with_project_id);
    credential_field!(auth_token, with_auth_token);

    /// Return `value` or fail with `InvalidCredential` naming the field
    pub fn require<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
        value.ok_or_else(|| DriverError::InvalidCredential(format!("missing {}", field)))
    }
}

impl fmt::Debug for CredentialInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(v: &Option<String>) -> Option<&'static str> {
            v.as_ref().map(|_| "***")
        }

        f.debug_struct("CredentialInfo")
            .field("identity_endpoint", &self.identity_endpoint)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("subscription_id", &self.subscription_id)
            .field("project_id", &self.project_id)
            .field("auth_token", &redact(&self.auth_token))
            .finish()
    }
}

/// Logical placement of the resources a connection operates on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionInfo {
    region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resource_group: Option<String>,
}

impl RegionInfo {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            zone: None,
            resource_group: None,
        }
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn with_resource_group(mut self, resource_group: impl Into<String>) -> Self {
        self.resource_group = Some(resource_group.into());
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref().filter(|z| !z.is_empty())
    }

    pub fn resource_group(&self) -> Option<&str> {
        self.resource_group.as_deref().filter(|g| !g.is_empty())
    }

    pub fn require_region(&self) -> Result<&str> {
        if self.region.is_empty() {
            return Err(DriverError::InvalidRegion("missing region".to_string()));
        }
        Ok(&self.region)
    }

    pub fn require_zone(&self) -> Result<&str> {
        self.zone()
            .ok_or_else(|| DriverError::InvalidRegion("missing zone".to_string()))
    }

    pub fn require_resource_group(&self) -> Result<&str> {
        self.resource_group()
            .ok_or_else(|| DriverError::InvalidRegion("missing resource_group".to_string()))
    }
}

/// Connect-time inputs bundled together
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub credential: CredentialInfo,
    pub region: RegionInfo,
}

impl ConnectionInfo {
    pub fn new(credential: CredentialInfo, region: RegionInfo) -> Self {
        Self { credential, region }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_reports_missing_field() {
        let cred = CredentialInfo::new().with_client_id("app");
        assert_eq!(
            CredentialInfo::require(cred.client_id(), "client_id").unwrap(),
            "app"
        );
        let err = CredentialInfo::require(cred.client_secret(), "client_secret").unwrap_err();
        assert!(matches!(
            err,
            DriverError::InvalidCredential(msg) if msg.contains("client_secret")
        ));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let cred = CredentialInfo::new().with_tenant_id("");
        assert!(cred.tenant_id().is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let cred = CredentialInfo::new()
            .with_username("admin")
            .with_password("hunter2")
            .with_auth_token("tok");
        let printed = format!("{:?}", cred);
        assert!(printed.contains("admin"));
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("***"));
    }

    #[test]
    fn test_region_requirements() {
        let region = RegionInfo::new("koreacentral").with_resource_group("rg1");
        assert_eq!(region.require_resource_group().unwrap(), "rg1");
        assert!(matches!(
            region.require_zone(),
            Err(DriverError::InvalidRegion(_))
        ));
        assert!(RegionInfo::new("").require_region().is_err());
    }

    #[test]
    fn test_region_deserializes_from_json() {
        let region: RegionInfo = serde_json::from_value(serde_json::json!({
            "region": "asia-northeast3",
            "zone": "asia-northeast3-a"
        }))
        .unwrap();
        assert_eq!(region.zone(), Some("asia-northeast3-a"));
        assert!(region.resource_group().is_none());
    }
}
