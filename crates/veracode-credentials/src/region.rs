//! Region auto-detection from the API key id

use std::fmt;

/// Default Veracode API base URL (US region)
pub const DEFAULT_BASE_URL: &str = "https://api.veracode.com";

/// Veracode API base URL for the European region
pub const EU_BASE_URL: &str = "https://api.veracode.eu";

/// Key id prefix issued to European region accounts
pub const EU_KEY_PREFIX: &str = "vera01ei-";

/// Service region a key id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// US region, also used for any id without a known prefix
    Default,
    /// European region
    Eu,
}

impl Region {
    /// Base URL of the regional endpoint.
    pub fn base_url(self) -> &'static str {
        match self {
            Region::Default => DEFAULT_BASE_URL,
            Region::Eu => EU_BASE_URL,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Default => write!(f, "default"),
            Region::Eu => write!(f, "eu"),
        }
    }
}

/// Detect the region of a key id.
///
/// This is a literal, case-sensitive prefix test. An id shorter than
/// [`EU_KEY_PREFIX`] never matches.
pub fn detect_region(key_id: &str) -> Region {
    if key_id.starts_with(EU_KEY_PREFIX) {
        Region::Eu
    } else {
        Region::Default
    }
}
