//! Connection profiles
//!
//! ```yaml
//! profiles:
//!   azure-dev:
//!     driver: azure
//!     credential:
//!       subscription_id: "0000"
//!       tenant_id: "..."
//!       client_id: "..."
//!       client_secret: "..."
//!     region:
//!       region: koreacentral
//!       resource_group: rg1
//!     wait:
//!       timeout_ms: 300000
//! ```

use crate::error::{ConfigError, Result};
use cloudspan_driver::{ConnectionInfo, CredentialInfo, RegionInfo, WaitConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything needed to open one connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionProfile {
    /// Registered driver name (`generic`, `gcp`, `azure`, `mock`)
    pub driver: String,
    #[serde(default)]
    pub credential: CredentialInfo,
    pub region: RegionInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<WaitConfig>,
}

impl ConnectionProfile {
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo::new(self.credential.clone(), self.region.clone())
    }

    pub fn wait_config(&self) -> WaitConfig {
        self.wait.clone().unwrap_or_default()
    }
}

/// Top level of a profiles file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: BTreeMap<String, ConnectionProfile>,
}

impl ProfilesFile {
    pub fn from_yaml_str(source: &str, origin: &Path) -> Result<Self> {
        let file: ProfilesFile =
            serde_yaml::from_str(source).map_err(|source| ConfigError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;
        file.validate()?;
        Ok(file)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source, path)
    }

    fn validate(&self) -> Result<()> {
        for (name, profile) in &self.profiles {
            if profile.driver.trim().is_empty() {
                return Err(ConfigError::InvalidProfile {
                    name: name.clone(),
                    reason: "driver is empty".to_string(),
                });
            }
            if profile.wait.as_ref().is_some_and(|w| w.poll_interval_ms == 0) {
                return Err(ConfigError::InvalidProfile {
                    name: name.clone(),
                    reason: "wait.poll_interval_ms must be positive".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn profile(&self, name: &str) -> Result<&ConnectionProfile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })
    }
}

/// Profiles file location, resolved by [`crate::find_profiles_file`]
#[derive(Debug, Clone)]
pub struct LoadedProfiles {
    pub path: PathBuf,
    pub file: ProfilesFile,
}
