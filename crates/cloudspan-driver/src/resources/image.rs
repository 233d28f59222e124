//! Machine images

use crate::capability::ResourceKind;
use crate::error::Result;
use crate::resources::validate_name;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request to create an image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReqInfo {
    pub name: String,
    /// What to capture the image from (a VM or disk, depending on the provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl ImageReqInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_id: None,
        }
    }

    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(ResourceKind::Image, &self.name)
    }
}

/// Canonical image record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub id: String,
    pub name: String,
    /// Provider status token (e.g. READY, PENDING)
    pub status: String,
    pub guest_os: Option<String>,
}

#[async_trait]
pub trait ImageHandler: Send + Sync {
    async fn create_image(&self, req: ImageReqInfo) -> Result<ImageInfo>;

    async fn list_image(&self) -> Result<Vec<ImageInfo>>;

    async fn get_image(&self, id: &str) -> Result<ImageInfo>;

    async fn delete_image(&self, id: &str) -> Result<bool>;
}
