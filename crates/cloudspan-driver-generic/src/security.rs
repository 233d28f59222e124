//! Security groups

use crate::api::{Collection, SecurityGroup, SecurityGroupCreate, SecurityRule, body, decode};
use crate::connection::Binding;
use async_trait::async_trait;
use cloudspan_driver::id::validate_opaque;
use cloudspan_driver::translate::{require, require_str, translate_all};
use cloudspan_driver::{
    Direction, DriverError, ResourceKind, Result, SecurityHandler, SecurityInfo, SecurityReqInfo,
    SecurityRuleInfo,
};

const KIND: ResourceKind = ResourceKind::Security;

fn translate_rule(rule: SecurityRule) -> Result<SecurityRuleInfo> {
    let direction = match require(rule.direction.as_deref(), KIND, "rules.direction")?
        .to_ascii_lowercase()
        .as_str()
    {
        "inbound" => Direction::Inbound,
        "outbound" => Direction::Outbound,
        other => {
            return Err(DriverError::TranslationError(format!(
                "unknown rule direction '{}'",
                other
            )));
        }
    };

    // absent ports cover the whole range
    Ok(SecurityRuleInfo {
        direction,
        protocol: require_str(rule.protocol.as_deref(), KIND, "rules.protocol")?,
        from_port: rule.port_min.unwrap_or(1),
        to_port: rule.port_max.unwrap_or(u16::MAX),
        cidr: require_str(rule.target.as_deref(), KIND, "rules.target")?,
    })
}

pub fn translate_security_group(group: SecurityGroup) -> Result<SecurityInfo> {
    Ok(SecurityInfo {
        id: require_str(group.id.as_deref(), KIND, "id")?,
        name: require_str(group.name.as_deref(), KIND, "name")?,
        rules: translate_all(group.rules.unwrap_or_default(), translate_rule)?,
    })
}

fn native_rule(rule: SecurityRuleInfo) -> SecurityRule {
    let direction = match rule.direction {
        Direction::Inbound => "inbound",
        Direction::Outbound => "outbound",
    };
    SecurityRule {
        direction: Some(direction.to_string()),
        protocol: Some(rule.protocol),
        port_min: Some(rule.from_port),
        port_max: Some(rule.to_port),
        target: Some(rule.cidr),
    }
}

pub struct GenericSecurityHandler(pub(crate) Binding);

#[async_trait]
impl SecurityHandler for GenericSecurityHandler {
    async fn create_security(&self, req: SecurityReqInfo) -> Result<SecurityInfo> {
        req.validate()?;
        let request = body(
            KIND,
            &SecurityGroupCreate {
                name: req.name,
                rules: req.rules.into_iter().map(native_rule).collect(),
            },
        )?;

        let value = self
            .0
            .ctx
            .call(self.0.api.create(Collection::SecurityGroups, request))
            .await?;
        let group = translate_security_group(decode(KIND, value)?)?;
        tracing::info!("Created security group {} ({})", group.name, group.id);
        Ok(group)
    }

    async fn list_security(&self) -> Result<Vec<SecurityInfo>> {
        let values = self
            .0
            .ctx
            .call(self.0.api.list(Collection::SecurityGroups))
            .await?;
        translate_all(values, |v| decode(KIND, v).and_then(translate_security_group))
    }

    async fn get_security(&self, id: &str) -> Result<SecurityInfo> {
        validate_opaque(id)?;
        let value = self
            .0
            .ctx
            .call(self.0.api.get(Collection::SecurityGroups, id))
            .await?;
        translate_security_group(decode(KIND, value)?)
    }

    async fn delete_security(&self, id: &str) -> Result<bool> {
        validate_opaque(id)?;
        self.0
            .ctx
            .call(self.0.api.delete(Collection::SecurityGroups, id))
            .await?;
        tracing::info!("Deleted security group {}", id);
        Ok(true)
    }
}
