//! Network security groups
//!
//! Canonical rules are allow rules; deny rules found on a group are left
//! out of the translated record.

use crate::api::{
    NetworkSecurityGroup, NsgProperties, Resource, ResourceType, SecurityRuleProperties, body,
    decode,
};
use crate::connection::Binding;
use crate::path::id_from_path;
use async_trait::async_trait;
use cloudspan_driver::translate::{require_str, translate_all};
use cloudspan_driver::{
    Direction, DriverError, ResourceKind, Result, SecurityHandler, SecurityInfo, SecurityReqInfo,
    SecurityRuleInfo,
};

const KIND: ResourceKind = ResourceKind::Security;
const FIRST_PRIORITY: u32 = 100;
const PRIORITY_STEP: u32 = 10;
const ANY: &str = "*";

/// `*` → whole range, `22` → 22..22, `8000-8080` → 8000..8080
pub fn parse_port_range(range: &str) -> Result<(u16, u16)> {
    let invalid = || DriverError::TranslationError(format!("invalid port range '{}'", range));
    let port = |p: &str| p.trim().parse::<u16>().map_err(|_| invalid());
    match range.trim() {
        ANY => Ok((1, u16::MAX)),
        r => match r.split_once('-') {
            Some((from, to)) => Ok((port(from)?, port(to)?)),
            None => {
                let single = port(r)?;
                Ok((single, single))
            }
        },
    }
}

/// A rule field given either singly or as a list; canonical rules hold one value
fn single_value(singular: Option<String>, plural: Vec<String>, field: &str) -> Result<String> {
    match (singular.filter(|v| !v.is_empty()), plural.as_slice()) {
        (Some(value), []) => Ok(value),
        (None, [value]) => Ok(value.clone()),
        (None, []) => Err(DriverError::TranslationError(format!(
            "security rule has no {}",
            field
        ))),
        _ => Err(DriverError::TranslationError(format!(
            "security rule has several {} values",
            field
        ))),
    }
}

fn translate_rule(rule: SecurityRuleProperties) -> Result<SecurityRuleInfo> {
    let direction = match require_str(rule.direction.as_deref(), KIND, "rules.direction")?
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
    let protocol = require_str(rule.protocol.as_deref(), KIND, "rules.protocol")?;
    let ports = single_value(
        rule.destination_port_range,
        rule.destination_port_ranges,
        "destination port range",
    )?;
    let (from_port, to_port) = parse_port_range(&ports)?;
    let cidr = match direction {
        Direction::Inbound => single_value(
            rule.source_address_prefix,
            rule.source_address_prefixes,
            "source address prefix",
        )?,
        Direction::Outbound => single_value(
            rule.destination_address_prefix,
            rule.destination_address_prefixes,
            "destination address prefix",
        )?,
    };

    Ok(SecurityRuleInfo {
        direction,
        protocol: protocol.to_ascii_lowercase(),
        from_port,
        to_port,
        cidr,
    })
}

pub fn translate_security_group(
    group: NetworkSecurityGroup,
    resource_group: &str,
) -> Result<SecurityInfo> {
    let props = group.properties.unwrap_or_default();
    let allowed: Vec<SecurityRuleProperties> = props
        .security_rules
        .into_iter()
        .filter_map(|r| r.properties)
        .filter(|p| {
            p.access
                .as_deref()
                .is_none_or(|a| a.eq_ignore_ascii_case("Allow"))
        })
        .collect();

    Ok(SecurityInfo {
        id: id_from_path(
            &require_str(group.id.as_deref(), KIND, "id")?,
            resource_group,
            "security group id",
        )?,
        name: require_str(group.name.as_deref(), KIND, "name")?,
        rules: translate_all(allowed, translate_rule)?,
    })
}

fn native_protocol(protocol: &str) -> Result<&'static str> {
    match protocol.to_ascii_lowercase().as_str() {
        "tcp" => Ok("Tcp"),
        "udp" => Ok("Udp"),
        "icmp" => Ok("Icmp"),
        "*" | "all" => Ok(ANY),
        other => Err(DriverError::InvalidRequest(format!(
            "unsupported protocol '{}'",
            other
        ))),
    }
}

fn native_rule(index: usize, rule: SecurityRuleInfo) -> Result<Resource<SecurityRuleProperties>> {
    let ports = if (rule.from_port, rule.to_port) == (1, u16::MAX) {
        ANY.to_string()
    } else {
        rule.port_range()
    };
    let (direction, source, destination) = match rule.direction {
        Direction::Inbound => ("Inbound", rule.cidr.clone(), ANY.to_string()),
        Direction::Outbound => ("Outbound", ANY.to_string(), rule.cidr.clone()),
    };

    Ok(Resource {
        name: Some(format!("rule-{}", index + 1)),
        properties: Some(SecurityRuleProperties {
            protocol: Some(native_protocol(&rule.protocol)?.to_string()),
            direction: Some(direction.to_string()),
            access: Some("Allow".to_string()),
            priority: Some(FIRST_PRIORITY + PRIORITY_STEP * index as u32),
            source_address_prefix: Some(source),
            source_port_range: Some(ANY.to_string()),
            destination_address_prefix: Some(destination),
            destination_port_range: Some(ports),
            ..Default::default()
        }),
        ..Default::default()
    })
}

pub struct AzureSecurityHandler(pub(crate) Binding);

#[async_trait]
impl SecurityHandler for AzureSecurityHandler {
    async fn create_security(&self, req: SecurityReqInfo) -> Result<SecurityInfo> {
        req.validate()?;
        let rules = req
            .rules
            .into_iter()
            .enumerate()
            .map(|(i, rule)| native_rule(i, rule))
            .collect::<Result<Vec<_>>>()?;
        let request: NetworkSecurityGroup = Resource {
            location: Some(self.0.location().to_string()),
            properties: Some(NsgProperties {
                security_rules: rules,
                provisioning_state: None,
            }),
            ..Default::default()
        };

        tracing::info!("Creating security group {} in {}", req.name, self.0.group);
        let value = self
            .0
            .create(ResourceType::NetworkSecurityGroups, &req.name, body(KIND, &request)?)
            .await?;
        translate_security_group(decode(KIND, value)?, &self.0.group)
    }

    async fn list_security(&self) -> Result<Vec<SecurityInfo>> {
        let values = self
            .0
            .ctx
            .call(self.0.api.list(&self.0.group, ResourceType::NetworkSecurityGroups))
            .await?;
        translate_all(values, |v| {
            decode(KIND, v).and_then(|g| translate_security_group(g, &self.0.group))
        })
    }

    async fn get_security(&self, sg_id: &str) -> Result<SecurityInfo> {
        let name = self.0.name_of(sg_id)?;
        let value = self.0.fetch(ResourceType::NetworkSecurityGroups, &name).await?;
        translate_security_group(decode(KIND, value)?, &self.0.group)
    }

    async fn delete_security(&self, sg_id: &str) -> Result<bool> {
        let name = self.0.name_of(sg_id)?;
        self.0.remove(ResourceType::NetworkSecurityGroups, &name).await?;
        tracing::info!("Deleted security group {}", sg_id);
        Ok(true)
    }
}
