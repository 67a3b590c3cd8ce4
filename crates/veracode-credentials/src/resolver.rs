//! Credential resolution with file-then-environment fallback
//!
//! The `CredentialResolver` produces a fresh [`Credentials`] value on every
//! call. Nothing is cached: a change to the config file or the environment
//! between two calls is observed by the second one.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::env::{EnvSource, ProcessEnv};
use crate::region::detect_region;
use crate::{Error, Result};

/// Environment variable holding the API key id
pub const API_ID_VAR: &str = "VERACODE_API_ID";

/// Environment variable holding the API key secret
pub const API_KEY_VAR: &str = "VERACODE_API_KEY";

/// Environment variable holding an explicit API base URL
pub const API_BASE_URL_VAR: &str = "VERACODE_API_BASE_URL";

const CONFIG_DIR: &str = ".veracode";
const CONFIG_FILE: &str = "veracode.yml";

/// On-disk shape of `veracode.yml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VeracodeConfig {
    api: Option<ApiSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiSection {
    #[serde(rename = "key-id")]
    key_id: Option<String>,
    #[serde(rename = "key-secret")]
    key_secret: Option<String>,
    #[serde(rename = "api-base-url")]
    api_base_url: Option<String>,
}

impl ApiSection {
    fn key_id(&self) -> Option<&str> {
        non_empty(self.key_id.as_deref())
    }

    fn key_secret(&self) -> Option<&str> {
        non_empty(self.key_secret.as_deref())
    }

    fn base_url(&self) -> Option<&str> {
        non_empty(self.api_base_url.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Which configuration origin supplied the resolved credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialSource {
    /// `~/.veracode/veracode.yml`
    File,
    /// `VERACODE_API_ID` / `VERACODE_API_KEY`
    Env,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::File => write!(f, "file"),
            CredentialSource::Env => write!(f, "env"),
        }
    }
}

/// Resolved API identity and endpoint.
///
/// Both the id and the secret are guaranteed non-empty and the base URL is
/// never empty. The `Debug` output redacts the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_id: String,
    api_secret: String,
    base_url: String,
    source: CredentialSource,
}

impl Credentials {
    fn build(
        api_id: &str,
        api_secret: &str,
        explicit_base_url: Option<&str>,
        source: CredentialSource,
    ) -> Self {
        let base_url = match explicit_base_url {
            Some(url) => url.to_string(),
            None => detect_region(api_id).base_url().to_string(),
        };

        Self {
            api_id: api_id.to_string(),
            api_secret: api_secret.to_string(),
            base_url,
            source,
        }
    }

    pub fn api_id(&self) -> &str {
        &self.api_id
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("source", &self.source)
            .finish()
    }
}

/// State of the credentials config file, independent of the environment.
///
/// [`CredentialResolver::resolve`] treats every state other than `Usable`
/// the same way (fall through to the environment). This status lets callers
/// tell a missing file apart from a broken one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFileStatus {
    /// No file, or no home directory to look in
    Absent,
    /// The file exists but could not be read
    Unreadable { reason: String },
    /// The file exists but is not valid YAML of the expected shape
    Malformed { reason: String },
    /// The file parses but `key-id` or `key-secret` is empty
    Incomplete,
    /// The file supplies both `key-id` and `key-secret`
    Usable,
}

/// Resolves credentials from the config file, then the environment.
///
/// The home directory and the environment can be overridden, which keeps
/// tests from touching the real user config or the process environment.
pub struct CredentialResolver {
    /// Override for the home directory containing `.veracode/`.
    /// When `None`, `dirs::home_dir()` is used.
    home_dir_override: Option<PathBuf>,

    env: Arc<dyn EnvSource>,
}

impl CredentialResolver {
    /// Create a resolver reading the real home directory and process environment.
    pub fn new() -> Self {
        Self {
            home_dir_override: None,
            env: Arc::new(ProcessEnv),
        }
    }

    /// Use `home` instead of the user's home directory.
    pub fn with_home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home_dir_override = Some(home.into());
        self
    }

    /// Read variables from `env` instead of the process environment.
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Path of the credentials file, if a home directory is known.
    pub fn config_path(&self) -> Option<PathBuf> {
        let home = match self.home_dir_override {
            Some(ref home) => Some(home.clone()),
            None => dirs::home_dir(),
        };
        home.map(|h| h.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Resolve credentials.
    ///
    /// Tries the config file first, then the environment. The base URL comes
    /// from the winning source when it sets one explicitly, otherwise from
    /// the key id's region.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when neither source yields both the id
    /// and the secret. Problems with the config file itself are never
    /// returned from here.
    pub fn resolve(&self) -> Result<Credentials> {
        if let Some(credentials) = self.from_file() {
            tracing::debug!(base_url = %credentials.base_url, "Resolved credentials from file");
            return Ok(credentials);
        }

        if let Some(credentials) = self.from_env() {
            tracing::debug!(
                base_url = %credentials.base_url,
                "Resolved credentials from environment"
            );
            return Ok(credentials);
        }

        tracing::debug!("No credential source yielded both id and secret");
        Err(Error::NotFound)
    }

    /// Inspect the config file without consulting the environment.
    pub fn config_file_status(&self) -> ConfigFileStatus {
        let Some(path) = self.config_path() else {
            return ConfigFileStatus::Absent;
        };

        match read_config_file(&path) {
            Ok(None) => ConfigFileStatus::Absent,
            Ok(Some(api)) if api.key_id().is_some() && api.key_secret().is_some() => {
                ConfigFileStatus::Usable
            }
            Ok(Some(_)) => ConfigFileStatus::Incomplete,
            Err(e @ Error::Yaml { .. }) => ConfigFileStatus::Malformed {
                reason: e.to_string(),
            },
            Err(e) => ConfigFileStatus::Unreadable {
                reason: e.to_string(),
            },
        }
    }

    fn from_file(&self) -> Option<Credentials> {
        let Some(path) = self.config_path() else {
            tracing::debug!("No home directory; skipping credentials file");
            return None;
        };

        let api = match read_config_file(&path) {
            Ok(Some(api)) => api,
            Ok(None) => {
                tracing::debug!(?path, "No credentials file found; skipping");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unusable credentials file");
                return None;
            }
        };

        match (api.key_id(), api.key_secret()) {
            (Some(id), Some(secret)) => Some(Credentials::build(
                id,
                secret,
                api.base_url(),
                CredentialSource::File,
            )),
            _ => {
                tracing::debug!(?path, "Credentials file has empty key-id or key-secret");
                None
            }
        }
    }

    fn from_env(&self) -> Option<Credentials> {
        let id = self.env.var(API_ID_VAR)?;
        let secret = self.env.var(API_KEY_VAR)?;
        let base_url = self.env.var(API_BASE_URL_VAR);

        Some(Credentials::build(
            &id,
            &secret,
            base_url.as_deref(),
            CredentialSource::Env,
        ))
    }
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("home_dir_override", &self.home_dir_override)
            .finish_non_exhaustive()
    }
}

/// Read and parse the config file. `Ok(None)` means the file does not exist.
fn read_config_file(path: &Path) -> Result<Option<ApiSection>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if content.trim().is_empty() {
        return Ok(Some(ApiSection::default()));
    }

    let config: VeracodeConfig = serde_yaml::from_str(&content).map_err(|source| Error::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(config.api.unwrap_or_default()))
}
