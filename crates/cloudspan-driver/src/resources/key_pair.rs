//! SSH key pairs

use crate::capability::ResourceKind;
use crate::error::Result;
use crate::resources::validate_name;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPairReqInfo {
    pub name: String,
}

impl KeyPairReqInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(ResourceKind::KeyPair, &self.name)
    }
}

/// Canonical key pair record
///
/// `private_key` is only populated on the record returned by `create_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPairInfo {
    pub id: String,
    pub name: String,
    pub fingerprint: Option<String>,
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

#[async_trait]
pub trait KeyPairHandler: Send + Sync {
    async fn create_key(&self, req: KeyPairReqInfo) -> Result<KeyPairInfo>;

    async fn list_key(&self) -> Result<Vec<KeyPairInfo>>;

    async fn get_key(&self, id: &str) -> Result<KeyPairInfo>;

    async fn delete_key(&self, id: &str) -> Result<bool>;
}
