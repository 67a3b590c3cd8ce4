//! Scriptable collaborator fakes.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use veracode_credentials::{CredentialResolver, Credentials};
use veracode_tools::{
    CollaboratorError, Collaborators, FindingsApi, FindingsKind, FindingsQuery, HealthReport,
    PipelineScanRequest, PipelineScanner, RequestContext, ScanProcessOutput, WorkspaceLocator,
};

/// A findings API call observed by [`FakeApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Health { base_url: String },
    Findings { kind: FindingsKind, query: FindingsQuery },
    Details { app_profile: String, flaw_id: i64 },
}

/// Findings API returning canned responses and recording calls.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<ApiCall>>,
    failure: Option<CollaboratorError>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `err`.
    pub fn failing(err: CollaboratorError) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(err),
        }
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ApiCall) -> Result<(), CollaboratorError> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl FindingsApi for FakeApi {
    fn health(
        &self,
        _ctx: &RequestContext,
        credentials: &Credentials,
    ) -> Result<HealthReport, CollaboratorError> {
        self.record(ApiCall::Health {
            base_url: credentials.base_url().to_string(),
        })?;
        Ok(HealthReport {
            available: true,
            status_code: 200,
            message: "OK".to_string(),
        })
    }

    fn findings(
        &self,
        _ctx: &RequestContext,
        _credentials: &Credentials,
        kind: FindingsKind,
        query: &FindingsQuery,
    ) -> Result<Value, CollaboratorError> {
        self.record(ApiCall::Findings {
            kind,
            query: query.clone(),
        })?;
        Ok(json!([{ "issue_id": 1, "kind": kind }]))
    }

    fn finding_details(
        &self,
        _ctx: &RequestContext,
        _credentials: &Credentials,
        app_profile: &str,
        flaw_id: i64,
    ) -> Result<Value, CollaboratorError> {
        self.record(ApiCall::Details {
            app_profile: app_profile.to_string(),
            flaw_id,
        })?;
        Ok(json!({ "issue_id": flaw_id }))
    }
}

/// Workspace discovery returning a fixed project name, or failing.
pub struct FakeWorkspace {
    project: Result<String, CollaboratorError>,
    seen: Mutex<Vec<PathBuf>>,
}

impl FakeWorkspace {
    pub fn named(project: &str) -> Self {
        Self {
            project: Ok(project.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            project: Err(CollaboratorError::failed(message)),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Paths the tools asked about.
    pub fn seen(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

impl WorkspaceLocator for FakeWorkspace {
    fn project_name(&self, application_path: &Path) -> Result<String, CollaboratorError> {
        self.seen.lock().unwrap().push(application_path.to_path_buf());
        self.project.clone()
    }
}

/// Scanner returning a fixed process result and recording requests.
pub struct FakeScanner {
    exit_code: i32,
    stdout: String,
    stderr: String,
    write_results: bool,
    requests: Mutex<Vec<PipelineScanRequest>>,
}

impl FakeScanner {
    pub fn exiting(exit_code: i32) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: String::new(),
            write_results: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_output(mut self, stdout: &str, stderr: &str) -> Self {
        self.stdout = stdout.to_string();
        self.stderr = stderr.to_string();
        self
    }

    /// Create the results file like the real scanner does.
    pub fn writing_results(mut self) -> Self {
        self.write_results = true;
        self
    }

    pub fn requests(&self) -> Vec<PipelineScanRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl PipelineScanner for FakeScanner {
    fn scan(
        &self,
        ctx: &RequestContext,
        request: &PipelineScanRequest,
    ) -> Result<ScanProcessOutput, CollaboratorError> {
        if ctx.is_cancelled() {
            return Err(CollaboratorError::Cancelled);
        }
        self.requests.lock().unwrap().push(request.clone());
        if self.write_results {
            std::fs::write(&request.results_file, "{}").unwrap();
        }
        Ok(ScanProcessOutput {
            exit_code: self.exit_code,
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
            duration: Duration::from_millis(1500),
        })
    }
}

/// Handles to the fakes behind a [`Collaborators`] bundle.
pub struct FakeCollaborators {
    pub api: Arc<FakeApi>,
    pub workspace: Arc<FakeWorkspace>,
    pub scanner: Arc<FakeScanner>,
}

impl FakeCollaborators {
    pub fn new(api: FakeApi, workspace: FakeWorkspace, scanner: FakeScanner) -> Self {
        Self {
            api: Arc::new(api),
            workspace: Arc::new(workspace),
            scanner: Arc::new(scanner),
        }
    }

    /// Healthy API, workspace named `MyApp`, scanner exiting 0.
    pub fn healthy() -> Self {
        Self::new(
            FakeApi::new(),
            FakeWorkspace::named("MyApp"),
            FakeScanner::exiting(0),
        )
    }

    /// Bundle the fakes with `resolver`.
    pub fn collaborators(&self, resolver: CredentialResolver) -> Collaborators {
        Collaborators::new(
            resolver,
            self.api.clone(),
            self.workspace.clone(),
            self.scanner.clone(),
        )
    }
}
