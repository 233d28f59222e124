//! Managed images captured from VMs

use crate::api::{Image, ImageProperties, Resource, ResourceType, SubResource, body, decode};
use crate::connection::Binding;
use crate::path::id_from_path;
use async_trait::async_trait;
use cloudspan_driver::translate::{require_str, translate_all};
use cloudspan_driver::{
    DriverError, ImageHandler, ImageInfo, ImageReqInfo, NO_STATUS, ResourceKind, Result,
};

const KIND: ResourceKind = ResourceKind::Image;

pub fn translate_image(image: Image, group: &str) -> Result<ImageInfo> {
    let props = image.properties.unwrap_or_default();
    Ok(ImageInfo {
        id: id_from_path(&require_str(image.id.as_deref(), KIND, "id")?, group, "image id")?,
        name: require_str(image.name.as_deref(), KIND, "name")?,
        status: props
            .provisioning_state
            .unwrap_or_else(|| NO_STATUS.to_string()),
        guest_os: props
            .storage_profile
            .and_then(|s| s.os_disk)
            .and_then(|d| d.os_type),
    })
}

pub struct AzureImageHandler(pub(crate) Binding);

#[async_trait]
impl ImageHandler for AzureImageHandler {
    async fn create_image(&self, req: ImageReqInfo) -> Result<ImageInfo> {
        req.validate()?;
        let source = req.source_id.as_deref().ok_or_else(|| {
            DriverError::InvalidRequest("source_id (a VM id) is required".to_string())
        })?;

        let request: Image = Resource {
            location: Some(self.0.location().to_string()),
            properties: Some(ImageProperties {
                source_virtual_machine: Some(SubResource::to(
                    self.0.path_of(ResourceType::VirtualMachines, source)?,
                )),
                ..Default::default()
            }),
            ..Default::default()
        };

        tracing::info!("Capturing image {} from {}", req.name, source);
        let value = self
            .0
            .create(ResourceType::Images, &req.name, body(KIND, &request)?)
            .await?;
        translate_image(decode(KIND, value)?, &self.0.group)
    }

    async fn list_image(&self) -> Result<Vec<ImageInfo>> {
        let values = self
            .0
            .ctx
            .call(self.0.api.list(&self.0.group, ResourceType::Images))
            .await?;
        translate_all(values, |v| {
            decode(KIND, v).and_then(|i| translate_image(i, &self.0.group))
        })
    }

    async fn get_image(&self, image_id: &str) -> Result<ImageInfo> {
        let name = self.0.name_of(image_id)?;
        let value = self.0.fetch(ResourceType::Images, &name).await?;
        translate_image(decode(KIND, value)?, &self.0.group)
    }

    async fn delete_image(&self, image_id: &str) -> Result<bool> {
        let name = self.0.name_of(image_id)?;
        self.0.remove(ResourceType::Images, &name).await?;
        tracing::info!("Deleted image {}", image_id);
        Ok(true)
    }
}
