//! Environment variable sources

use std::collections::HashMap;

/// Read access to environment-style variables.
///
/// The resolver reads through this trait so callers can substitute the
/// process environment with a fixed map.
pub trait EnvSource: Send + Sync {
    /// Look up a variable. Unset and empty values both yield `None`.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).cloned()
    }
}
