//! `get-finding-details` tool

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use super::{Flow, Session, require_application_path, resolve_app_profile, resolve_credentials};
use crate::Result;
use crate::collaborators::Collaborators;
use crate::dispatch::{
    HandlerDispatch, HandlerOutcome, Params, RequestContext, handler, parse_params,
};
use crate::lifecycle::ToolLifecycle;
use crate::registry::ToolRegistry;

pub const NAME: &str = "get-finding-details";

const DESCRIPTION: &str = "Retrieve detailed information for a single finding by flaw id";

/// Register the `get-finding-details` tool.
pub fn register(registry: &ToolRegistry, collaborators: &Collaborators) {
    let collaborators = collaborators.clone();
    registry.register_tool(NAME, move || {
        Box::new(FindingDetailsTool::new(collaborators.clone())) as Box<dyn ToolLifecycle>
    });
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FindingDetailsRequest {
    application_path: Option<String>,
    app_profile: Option<String>,
    flaw_id: Option<i64>,
}

pub struct FindingDetailsTool {
    session: Session,
}

impl FindingDetailsTool {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            session: Session::new(collaborators),
        }
    }
}

impl ToolLifecycle for FindingDetailsTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn initialize(&mut self) -> Result<()> {
        self.session.activate(NAME);
        Ok(())
    }

    fn register_handlers(&self, dispatch: &mut dyn HandlerDispatch) -> Result<()> {
        let collaborators = self.session.active(NAME)?;
        tracing::debug!(tool = NAME, "Registering handlers");
        dispatch.register_handler(
            NAME,
            handler(move |ctx, params| {
                handle_finding_details(&collaborators, ctx, params).unwrap_or_else(|done| done)
            }),
        );
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.session.release(NAME);
        Ok(())
    }
}

fn handle_finding_details(
    collaborators: &Arc<Collaborators>,
    ctx: &RequestContext,
    params: &Params,
) -> Flow<HandlerOutcome> {
    ctx.ensure_active()?;

    let request: FindingDetailsRequest = parse_params(params)?;
    let application_path = require_application_path(request.application_path)?;
    let flaw_id = request
        .flaw_id
        .filter(|id| *id != 0)
        .ok_or_else(|| {
            HandlerOutcome::business("flaw_id is required and must be a non-zero integer")
        })?;

    let app_profile = resolve_app_profile(collaborators, &application_path, request.app_profile)?;
    let credentials = resolve_credentials(collaborators)?;

    ctx.ensure_active()?;
    tracing::debug!(%app_profile, flaw_id, "Fetching finding details");

    let details = collaborators
        .api
        .finding_details(ctx, &credentials, &app_profile, flaw_id)
        .map_err(|e| {
            HandlerOutcome::from_collaborator(&format!("Failed to fetch finding {flaw_id}"), e)
        })?;

    Ok(HandlerOutcome::Ok(json!({
        "application_path": application_path,
        "app_profile": app_profile,
        "flaw_id": flaw_id,
        "finding": details,
    })))
}
