//! Security groups

use crate::capability::ResourceKind;
use crate::error::{DriverError, Result};
use crate::resources::validate_name;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// One allow rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRuleInfo {
    pub direction: Direction,
    /// "tcp", "udp", "icmp" or "*"
    pub protocol: String,
    pub from_port: u16,
    pub to_port: u16,
    pub cidr: String,
}

impl SecurityRuleInfo {
    pub fn inbound_tcp(port: u16, cidr: impl Into<String>) -> Self {
        Self {
            direction: Direction::Inbound,
            protocol: "tcp".to_string(),
            from_port: port,
            to_port: port,
            cidr: cidr.into(),
        }
    }

    /// `22` or `8000-8080`
    pub fn port_range(&self) -> String {
        if self.from_port == self.to_port {
            self.from_port.to_string()
        } else {
            format!("{}-{}", self.from_port, self.to_port)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityReqInfo {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<SecurityRuleInfo>,
}

impl SecurityReqInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: SecurityRuleInfo) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(ResourceKind::Security, &self.name)?;
        for rule in &self.rules {
            if rule.from_port > rule.to_port {
                return Err(DriverError::InvalidRequest(format!(
                    "security rule port range {}-{} is inverted",
                    rule.from_port, rule.to_port
                )));
            }
            if rule.cidr.trim().is_empty() {
                return Err(DriverError::InvalidRequest(
                    "security rule is missing cidr".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Canonical security group record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityInfo {
    pub id: String,
    pub name: String,
    pub rules: Vec<SecurityRuleInfo>,
}

#[async_trait]
pub trait SecurityHandler: Send + Sync {
    async fn create_security(&self, req: SecurityReqInfo) -> Result<SecurityInfo>;

    async fn list_security(&self) -> Result<Vec<SecurityInfo>>;

    async fn get_security(&self, id: &str) -> Result<SecurityInfo>;

    async fn delete_security(&self, id: &str) -> Result<bool>;
}
