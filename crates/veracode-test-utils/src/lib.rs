//! Shared test utilities for the veracode-mcp workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not
//! each re-implement them. It is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`home`]: [`CredentialsHome`] temporary home directory with a
//!   `.veracode/veracode.yml` writer, plus an in-memory environment builder
//! - [`dispatch`]: [`StubDispatch`] recording dispatch sink
//! - [`fakes`]: scriptable API, workspace and scanner collaborators
//! - [`workspace`]: [`TestWorkspace`] application directory builder

pub mod dispatch;
pub mod fakes;
pub mod home;
pub mod workspace;

pub use dispatch::StubDispatch;
pub use fakes::{ApiCall, FakeApi, FakeCollaborators, FakeScanner, FakeWorkspace};
pub use home::{CredentialsHome, env_map};
pub use workspace::TestWorkspace;
