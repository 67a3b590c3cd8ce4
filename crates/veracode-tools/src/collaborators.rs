//! External collaborators reached by tool handlers
//!
//! Handlers never talk to the network, the workspace or external processes
//! directly. They go through these traits, bundled in [`Collaborators`]
//! and handed to each tool's constructor at registration time.
//!
//! Findings payloads stay opaque (`serde_json::Value`); this crate does not
//! model the scanning service's data.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use veracode_credentials::{CredentialResolver, Credentials};

use crate::dispatch::RequestContext;
use crate::error::CollaboratorError;

/// Which kind of findings to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingsKind {
    Static,
    Dynamic,
    Sca,
}

impl FindingsKind {
    /// Label used in rendered reports.
    pub fn label(self) -> &'static str {
        match self {
            FindingsKind::Static => "Static",
            FindingsKind::Dynamic => "Dynamic",
            FindingsKind::Sca => "SCA",
        }
    }
}

impl fmt::Display for FindingsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Query sent to the findings API once the application profile is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FindingsQuery {
    pub app_profile: String,
    pub sandbox: Option<String>,
    pub size: u32,
    pub page: u32,
    pub severity: Option<i32>,
    pub severity_gte: Option<i32>,
}

/// Result of an API health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub available: bool,
    pub status_code: u16,
    pub message: String,
}

/// Client toward the remote scanning service.
pub trait FindingsApi: Send + Sync {
    fn health(
        &self,
        ctx: &RequestContext,
        credentials: &Credentials,
    ) -> Result<HealthReport, CollaboratorError>;

    fn findings(
        &self,
        ctx: &RequestContext,
        credentials: &Credentials,
        kind: FindingsKind,
        query: &FindingsQuery,
    ) -> Result<Value, CollaboratorError>;

    fn finding_details(
        &self,
        ctx: &RequestContext,
        credentials: &Credentials,
        app_profile: &str,
        flaw_id: i64,
    ) -> Result<Value, CollaboratorError>;
}

/// Resolves a project (application profile) name for a workspace directory.
pub trait WorkspaceLocator: Send + Sync {
    fn project_name(&self, application_path: &Path) -> Result<String, CollaboratorError>;
}

/// Arguments for one local pipeline scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineScanRequest {
    pub target: PathBuf,
    pub results_file: PathBuf,
    pub verbose: bool,
}

impl PipelineScanRequest {
    /// Command-line arguments for the scanner executable.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "static".to_string(),
            "scan".to_string(),
            self.target.display().to_string(),
            "--results-file".to_string(),
            self.results_file.display().to_string(),
        ];
        if self.verbose {
            args.push("-v".to_string());
        }
        args
    }
}

/// Captured output of the scanner process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// Runs the local pipeline scanner.
///
/// Implementations should watch `ctx` and abort the process once
/// cancellation is requested, reporting [`CollaboratorError::Cancelled`].
pub trait PipelineScanner: Send + Sync {
    fn scan(
        &self,
        ctx: &RequestContext,
        request: &PipelineScanRequest,
    ) -> Result<ScanProcessOutput, CollaboratorError>;
}

/// Everything a tool may need from outside the core.
#[derive(Clone)]
pub struct Collaborators {
    pub credentials: Arc<CredentialResolver>,
    pub api: Arc<dyn FindingsApi>,
    pub workspace: Arc<dyn WorkspaceLocator>,
    pub scanner: Arc<dyn PipelineScanner>,
}

impl Collaborators {
    pub fn new(
        credentials: CredentialResolver,
        api: Arc<dyn FindingsApi>,
        workspace: Arc<dyn WorkspaceLocator>,
        scanner: Arc<dyn PipelineScanner>,
    ) -> Self {
        Self {
            credentials: Arc::new(credentials),
            api,
            workspace,
            scanner,
        }
    }

    /// Real credential resolution with no transport behind it.
    ///
    /// Every API, workspace and scanner call reports
    /// [`CollaboratorError::Unavailable`].
    pub fn detached() -> Self {
        Self::detached_with(CredentialResolver::new())
    }

    /// Like [`Collaborators::detached`] with a custom resolver.
    pub fn detached_with(credentials: CredentialResolver) -> Self {
        let detached = Arc::new(Detached);
        Self::new(credentials, detached.clone(), detached.clone(), detached)
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

struct Detached;

impl FindingsApi for Detached {
    fn health(
        &self,
        _ctx: &RequestContext,
        _credentials: &Credentials,
    ) -> Result<HealthReport, CollaboratorError> {
        Err(CollaboratorError::unavailable("findings API client"))
    }

    fn findings(
        &self,
        _ctx: &RequestContext,
        _credentials: &Credentials,
        _kind: FindingsKind,
        _query: &FindingsQuery,
    ) -> Result<Value, CollaboratorError> {
        Err(CollaboratorError::unavailable("findings API client"))
    }

    fn finding_details(
        &self,
        _ctx: &RequestContext,
        _credentials: &Credentials,
        _app_profile: &str,
        _flaw_id: i64,
    ) -> Result<Value, CollaboratorError> {
        Err(CollaboratorError::unavailable("findings API client"))
    }
}

impl WorkspaceLocator for Detached {
    fn project_name(&self, _application_path: &Path) -> Result<String, CollaboratorError> {
        Err(CollaboratorError::unavailable("workspace discovery"))
    }
}

impl PipelineScanner for Detached {
    fn scan(
        &self,
        _ctx: &RequestContext,
        _request: &PipelineScanRequest,
    ) -> Result<ScanProcessOutput, CollaboratorError> {
        Err(CollaboratorError::unavailable("pipeline scanner"))
    }
}
