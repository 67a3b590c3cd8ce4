//! [`CredentialsHome`] fixture for credential resolution tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory standing in for the user's home directory.
///
/// # Example
///
/// ```rust,no_run
/// use veracode_test_utils::CredentialsHome;
///
/// let home = CredentialsHome::new();
/// home.write_credentials("vera01ei-AAAA", "secret", None);
/// assert!(home.config_path().exists());
/// ```
pub struct CredentialsHome {
    temp_dir: TempDir,
}

impl Default for CredentialsHome {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialsHome {
    /// Create an empty home directory with no credentials file.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root of the fake home directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Location of `.veracode/veracode.yml` under this home.
    pub fn config_path(&self) -> PathBuf {
        self.path().join(".veracode").join("veracode.yml")
    }

    /// Write raw content to the credentials file, creating `.veracode/`.
    pub fn write_config(&self, content: &str) {
        let path = self.config_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Write a well-formed credentials file.
    pub fn write_credentials(&self, key_id: &str, key_secret: &str, base_url: Option<&str>) {
        let mut content = format!("api:\n  key-id: \"{key_id}\"\n  key-secret: \"{key_secret}\"\n");
        if let Some(url) = base_url {
            content.push_str(&format!("  api-base-url: \"{url}\"\n"));
        }
        self.write_config(&content);
    }
}

/// Build an in-memory environment from key/value pairs.
pub fn env_map(vars: &[(&str, &str)]) -> HashMap<String, String> {
    vars.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
