//! Global images

use crate::api::{GLOBAL, Image, ImageInsert, OperationScope};
use crate::connection::Binding;
use crate::vm::source_image;
use async_trait::async_trait;
use cloudspan_driver::translate::{require_str, translate_all};
use cloudspan_driver::{
    ImageHandler, ImageInfo, ImageReqInfo, NO_STATUS, ResourceKind, Result, id,
};

const KIND: ResourceKind = ResourceKind::Image;

pub fn translate_image(image: Image) -> Result<ImageInfo> {
    let name = require_str(image.name.as_deref(), KIND, "name")?;
    Ok(ImageInfo {
        id: id::encode(GLOBAL, &name)?,
        name,
        status: image.status.unwrap_or_else(|| NO_STATUS.to_string()),
        guest_os: image.family,
    })
}

pub struct GcpImageHandler(pub(crate) Binding);

impl GcpImageHandler {
    async fn fetch(&self, name: &str) -> Result<ImageInfo> {
        let image = self.0.ctx.call(self.0.api.get_image(name)).await?;
        translate_image(image)
    }
}

#[async_trait]
impl ImageHandler for GcpImageHandler {
    async fn create_image(&self, req: ImageReqInfo) -> Result<ImageInfo> {
        req.validate()?;
        let body = ImageInsert {
            source_image: req.source_id.as_deref().map(source_image).transpose()?,
            name: req.name,
        };

        tracing::info!("Creating image {}", body.name);
        let op = self.0.ctx.call(self.0.api.insert_image(&body)).await?;
        self.0.complete(OperationScope::Global, op).await?;
        self.fetch(&body.name).await
    }

    async fn list_image(&self) -> Result<Vec<ImageInfo>> {
        let images = self.0.ctx.call(self.0.api.list_images()).await?;
        translate_all(images, translate_image)
    }

    async fn get_image(&self, image_id: &str) -> Result<ImageInfo> {
        let name = id::decode_in_scope(image_id, GLOBAL)?;
        self.fetch(&name).await
    }

    async fn delete_image(&self, image_id: &str) -> Result<bool> {
        let name = id::decode_in_scope(image_id, GLOBAL)?;
        let op = self.0.ctx.call(self.0.api.delete_image(&name)).await?;
        self.0.complete(OperationScope::Global, op).await?;
        tracing::info!("Deleted image {}", image_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_image() {
        let image = translate_image(Image {
            id: Some("8830".into()),
            name: Some("base".into()),
            status: Some("READY".into()),
            family: Some("debian-12".into()),
        })
        .unwrap();
        assert_eq!(image.id, "global:base");
        assert_eq!(image.status, "READY");
        assert_eq!(image.guest_os.as_deref(), Some("debian-12"));

        let bare = translate_image(Image {
            name: Some("bare".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(bare.status, NO_STATUS);
    }
}
