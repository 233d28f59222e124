//! Templates as images

use crate::api::{Collection, Template, TemplateCreate, body, decode};
use crate::connection::Binding;
use async_trait::async_trait;
use cloudspan_driver::id::validate_opaque;
use cloudspan_driver::translate::{require_str, translate_all};
use cloudspan_driver::{ImageHandler, ImageInfo, ImageReqInfo, NO_STATUS, ResourceKind, Result};

const KIND: ResourceKind = ResourceKind::Image;

pub fn translate_template(template: Template) -> Result<ImageInfo> {
    Ok(ImageInfo {
        id: require_str(template.id.as_deref(), KIND, "id")?,
        name: require_str(template.name.as_deref(), KIND, "name")?,
        status: template.state.unwrap_or_else(|| NO_STATUS.to_string()),
        guest_os: template.os,
    })
}

pub struct GenericImageHandler(pub(crate) Binding);

#[async_trait]
impl ImageHandler for GenericImageHandler {
    async fn create_image(&self, req: ImageReqInfo) -> Result<ImageInfo> {
        req.validate()?;
        if let Some(source) = &req.source_id {
            validate_opaque(source)?;
        }
        let request = body(
            KIND,
            &TemplateCreate {
                name: req.name,
                source_id: req.source_id,
            },
        )?;

        let value = self
            .0
            .ctx
            .call(self.0.api.create(Collection::Templates, request))
            .await?;
        let image = translate_template(decode(KIND, value)?)?;
        tracing::info!("Created template {} ({})", image.name, image.id);
        Ok(image)
    }

    async fn list_image(&self) -> Result<Vec<ImageInfo>> {
        let values = self
            .0
            .ctx
            .call(self.0.api.list(Collection::Templates))
            .await?;
        translate_all(values, |v| decode(KIND, v).and_then(translate_template))
    }

    async fn get_image(&self, id: &str) -> Result<ImageInfo> {
        validate_opaque(id)?;
        let value = self
            .0
            .ctx
            .call(self.0.api.get(Collection::Templates, id))
            .await?;
        translate_template(decode(KIND, value)?)
    }

    async fn delete_image(&self, id: &str) -> Result<bool> {
        validate_opaque(id)?;
        self.0
            .ctx
            .call(self.0.api.delete(Collection::Templates, id))
            .await?;
        tracing::info!("Deleted template {}", id);
        Ok(true)
    }
}
