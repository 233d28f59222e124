//! Cloudspan connection profiles
//!
//! Loads named [`ConnectionProfile`]s (driver name, credential, region and
//! optional wait settings) from a YAML file. The caller picks the profile;
//! nothing here is global.

pub mod error;
pub mod profile;

pub use error::*;
pub use profile::{ConnectionProfile, LoadedProfiles, ProfilesFile};

use std::path::PathBuf;

/// Environment variable pointing directly at a profiles file
pub const CONFIG_PATH_ENV: &str = "CLOUDSPAN_CONFIG_PATH";

const LOCAL_CANDIDATES: [&str; 2] = ["cloudspan.yaml", ".cloudspan.yaml"];
const GLOBAL_FILE: &str = "profiles.yaml";

/// `<config dir>/cloudspan`
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("cloudspan"))
}

/// Locate the profiles file
///
/// Search order:
/// 1. `CLOUDSPAN_CONFIG_PATH`
/// 2. current directory: `cloudspan.yaml`, `.cloudspan.yaml`
/// 3. `<config dir>/cloudspan/profiles.yaml`
pub fn find_profiles_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;
    for filename in LOCAL_CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global = config_dir.join(GLOBAL_FILE);
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::ProfilesFileNotFound)
}

/// Find and parse the profiles file
pub fn load_profiles() -> Result<LoadedProfiles> {
    let path = find_profiles_file()?;
    let file = ProfilesFile::from_path(&path)?;
    Ok(LoadedProfiles { path, file })
}
