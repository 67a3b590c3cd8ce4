//! Credential resolution for the Veracode API.
//!
//! Every tool that talks to the remote scanning service needs an API
//! identity and a target endpoint. This crate resolves both with zero
//! explicit configuration in the common case.
//!
//! # Resolution Order
//!
//! 1. **Config file** - `~/.veracode/veracode.yml` (`api.key-id`,
//!    `api.key-secret`, optional `api.api-base-url`)
//! 2. **Environment** - `VERACODE_API_ID`, `VERACODE_API_KEY`, optional
//!    `VERACODE_API_BASE_URL`
//!
//! A missing, malformed or incomplete config file falls through to the
//! environment. If neither source supplies both the id and the secret,
//! resolution fails with [`Error::NotFound`].
//!
//! # Region Detection
//!
//! When the winning source has no explicit base URL, the endpoint is
//! inferred from the key id: ids starting with [`EU_KEY_PREFIX`] target
//! [`EU_BASE_URL`], everything else targets [`DEFAULT_BASE_URL`].
//!
//! # Example
//!
//! ```ignore
//! use veracode_credentials::CredentialResolver;
//!
//! let credentials = CredentialResolver::new().resolve()?;
//! println!("{} via {}", credentials.base_url(), credentials.source());
//! ```

pub mod env;
pub mod error;
pub mod region;
pub mod resolver;

pub use env::{EnvSource, ProcessEnv};
pub use error::{Error, Result};
pub use region::{DEFAULT_BASE_URL, EU_BASE_URL, EU_KEY_PREFIX, Region, detect_region};
pub use resolver::{
    API_BASE_URL_VAR, API_ID_VAR, API_KEY_VAR, ConfigFileStatus, CredentialResolver,
    CredentialSource, Credentials,
};
