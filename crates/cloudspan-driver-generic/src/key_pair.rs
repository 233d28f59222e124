//! Keypairs
//!
//! Keypairs are addressed by name. The private key is only ever returned by
//! the create call.

use crate::api::{Collection, Keypair, NameOnly, body, decode};
use crate::connection::Binding;
use async_trait::async_trait;
use cloudspan_driver::id::validate_opaque;
use cloudspan_driver::translate::{require_str, translate_all};
use cloudspan_driver::{KeyPairHandler, KeyPairInfo, KeyPairReqInfo, ResourceKind, Result};

const KIND: ResourceKind = ResourceKind::KeyPair;

pub fn translate_keypair(keypair: Keypair, with_private_key: bool) -> Result<KeyPairInfo> {
    let name = require_str(keypair.name.as_deref(), KIND, "name")?;
    Ok(KeyPairInfo {
        id: keypair.id.filter(|id| !id.is_empty()).unwrap_or_else(|| name.clone()),
        name,
        fingerprint: keypair.fingerprint,
        public_key: keypair.public_key,
        private_key: keypair.private_key.filter(|_| with_private_key),
    })
}

pub struct GenericKeyPairHandler(pub(crate) Binding);

#[async_trait]
impl KeyPairHandler for GenericKeyPairHandler {
    async fn create_key(&self, req: KeyPairReqInfo) -> Result<KeyPairInfo> {
        req.validate()?;
        let request = body(KIND, &NameOnly { name: req.name })?;

        let value = self
            .0
            .ctx
            .call(self.0.api.create(Collection::Keypairs, request))
            .await?;
        let key = translate_keypair(decode(KIND, value)?, true)?;
        tracing::info!("Created keypair {}", key.name);
        Ok(key)
    }

    async fn list_key(&self) -> Result<Vec<KeyPairInfo>> {
        let values = self.0.ctx.call(self.0.api.list(Collection::Keypairs)).await?;
        translate_all(values, |v| {
            decode(KIND, v).and_then(|k| translate_keypair(k, false))
        })
    }

    async fn get_key(&self, id: &str) -> Result<KeyPairInfo> {
        validate_opaque(id)?;
        let value = self
            .0
            .ctx
            .call(self.0.api.get(Collection::Keypairs, id))
            .await?;
        translate_keypair(decode(KIND, value)?, false)
    }

    async fn delete_key(&self, id: &str) -> Result<bool> {
        validate_opaque(id)?;
        self.0
            .ctx
            .call(self.0.api.delete(Collection::Keypairs, id))
            .await?;
        tracing::info!("Deleted keypair {}", id);
        Ok(true)
    }
}
