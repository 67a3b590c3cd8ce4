//! Error types for veracode-credentials

use std::path::PathBuf;

/// Result type for credential operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving credentials
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Neither the config file nor the environment supplied both id and secret
    #[error(
        "Veracode credentials not found. Please create ~/.veracode/veracode.yml with key-id and key-secret or set VERACODE_API_ID and VERACODE_API_KEY environment variables"
    )]
    NotFound,

    /// The config file exists but could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file exists but is not valid YAML for the expected shape
    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
