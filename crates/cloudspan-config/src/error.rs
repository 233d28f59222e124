use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error(
        "No connection profiles found. Looked for:\n\
        - $CLOUDSPAN_CONFIG_PATH\n\
        - ./cloudspan.yaml, ./.cloudspan.yaml\n\
        - <config dir>/cloudspan/profiles.yaml"
    )]
    ProfilesFileNotFound,

    #[error("Profile '{name}' not found (available: {available})")]
    ProfileNotFound { name: String, available: String },

    #[error("Invalid profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
