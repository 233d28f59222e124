pub mod drivers;
pub mod profiles;
pub mod resource;
pub mod vm;

use anyhow::Context;
use cloudspan_config::ConnectionProfile;
use cloudspan_driver::{CloudConnection, DriverRegistry};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn connect(
    registry: &DriverRegistry,
    name: &str,
    profile: &ConnectionProfile,
) -> anyhow::Result<Box<dyn CloudConnection>> {
    registry
        .connect(&profile.driver, profile.connection_info())
        .await
        .with_context(|| format!("Failed to connect with profile '{}'", name))
}

/// Read a request record from a YAML or JSON file
pub fn read_request<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&source).with_context(|| format!("Invalid request in {}", path.display()))
}
