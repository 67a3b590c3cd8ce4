//! Findings tools: `get-static-findings`, `get-dynamic-findings`,
//! `get-sca-findings`
//!
//! The three tools share one request shape and one handler flow; only the
//! [`FindingsKind`] sent to the API differs.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use super::{Flow, Session, require_application_path, resolve_app_profile, resolve_credentials};
use crate::Result;
use crate::collaborators::{Collaborators, FindingsKind, FindingsQuery};
use crate::dispatch::{
    HandlerDispatch, HandlerOutcome, Params, RequestContext, handler, parse_params,
};
use crate::lifecycle::ToolLifecycle;
use crate::registry::ToolRegistry;

pub const STATIC_NAME: &str = "get-static-findings";
pub const DYNAMIC_NAME: &str = "get-dynamic-findings";
pub const SCA_NAME: &str = "get-sca-findings";

const DEFAULT_PAGE_SIZE: u32 = 50;

/// Register the three findings tools.
pub fn register(registry: &ToolRegistry, collaborators: &Collaborators) {
    for kind in [FindingsKind::Static, FindingsKind::Dynamic, FindingsKind::Sca] {
        let collaborators = collaborators.clone();
        registry.register_tool(tool_name(kind), move || {
            Box::new(FindingsTool::new(kind, collaborators.clone())) as Box<dyn ToolLifecycle>
        });
    }
}

pub fn tool_name(kind: FindingsKind) -> &'static str {
    match kind {
        FindingsKind::Static => STATIC_NAME,
        FindingsKind::Dynamic => DYNAMIC_NAME,
        FindingsKind::Sca => SCA_NAME,
    }
}

fn tool_description(kind: FindingsKind) -> &'static str {
    match kind {
        FindingsKind::Static => "Retrieve static analysis findings for the application profile",
        FindingsKind::Dynamic => "Retrieve dynamic analysis findings for the application profile",
        FindingsKind::Sca => {
            "Retrieve software composition analysis findings for the application profile"
        }
    }
}

/// Parsed parameters shared by the findings tools.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FindingsRequest {
    application_path: Option<String>,
    app_profile: Option<String>,
    sandbox: Option<String>,
    size: Option<u32>,
    page: Option<u32>,
    severity: Option<i32>,
    severity_gte: Option<i32>,
}

pub struct FindingsTool {
    kind: FindingsKind,
    session: Session,
}

impl FindingsTool {
    pub fn new(kind: FindingsKind, collaborators: Collaborators) -> Self {
        Self {
            kind,
            session: Session::new(collaborators),
        }
    }
}

impl ToolLifecycle for FindingsTool {
    fn name(&self) -> &str {
        tool_name(self.kind)
    }

    fn description(&self) -> &str {
        tool_description(self.kind)
    }

    fn initialize(&mut self) -> Result<()> {
        self.session.activate(tool_name(self.kind));
        Ok(())
    }

    fn register_handlers(&self, dispatch: &mut dyn HandlerDispatch) -> Result<()> {
        let name = tool_name(self.kind);
        let collaborators = self.session.active(name)?;
        let kind = self.kind;
        tracing::debug!(tool = name, "Registering handlers");
        dispatch.register_handler(
            name,
            handler(move |ctx, params| {
                handle_findings(&collaborators, kind, ctx, params).unwrap_or_else(|done| done)
            }),
        );
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.session.release(tool_name(self.kind));
        Ok(())
    }
}

fn handle_findings(
    collaborators: &Arc<Collaborators>,
    kind: FindingsKind,
    ctx: &RequestContext,
    params: &Params,
) -> Flow<HandlerOutcome> {
    ctx.ensure_active()?;

    let request: FindingsRequest = parse_params(params)?;
    let application_path = require_application_path(request.application_path)?;
    let app_profile = resolve_app_profile(collaborators, &application_path, request.app_profile)?;
    let credentials = resolve_credentials(collaborators)?;

    let query = FindingsQuery {
        app_profile,
        sandbox: request.sandbox.filter(|s| !s.is_empty()),
        size: request.size.unwrap_or(DEFAULT_PAGE_SIZE),
        page: request.page.unwrap_or(0),
        severity: request.severity,
        severity_gte: request.severity_gte,
    };

    ctx.ensure_active()?;
    tracing::debug!(%kind, app_profile = %query.app_profile, "Fetching findings");

    let findings = collaborators
        .api
        .findings(ctx, &credentials, kind, &query)
        .map_err(|e| {
            HandlerOutcome::from_collaborator(&format!("Failed to fetch {kind} findings"), e)
        })?;

    Ok(HandlerOutcome::Ok(json!({
        "kind": kind,
        "application_path": application_path,
        "app_profile": query.app_profile,
        "sandbox": query.sandbox,
        "page": query.page,
        "size": query.size,
        "findings": findings,
    })))
}
