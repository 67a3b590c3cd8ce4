//! `api-health` tool: credential and connectivity check

use std::sync::Arc;

use chrono::Utc;
use veracode_credentials::{API_ID_VAR, API_KEY_VAR};

use super::Session;
use crate::Result;
use crate::collaborators::Collaborators;
use crate::dispatch::{HandlerDispatch, HandlerOutcome, Params, RequestContext, handler};
use crate::lifecycle::ToolLifecycle;
use crate::registry::ToolRegistry;

pub const NAME: &str = "api-health";

const DESCRIPTION: &str = "Check Veracode API credentials and endpoint availability";

/// Register the `api-health` tool.
pub fn register(registry: &ToolRegistry, collaborators: &Collaborators) {
    let collaborators = collaborators.clone();
    registry.register_tool(NAME, move || {
        Box::new(ApiHealthTool::new(collaborators.clone())) as Box<dyn ToolLifecycle>
    });
}

pub struct ApiHealthTool {
    session: Session,
}

impl ApiHealthTool {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            session: Session::new(collaborators),
        }
    }
}

impl ToolLifecycle for ApiHealthTool {
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
            handler(move |ctx, params| handle_api_health(&collaborators, ctx, params)),
        );
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.session.release(NAME);
        Ok(())
    }
}

fn handle_api_health(
    collaborators: &Arc<Collaborators>,
    ctx: &RequestContext,
    _params: &Params,
) -> HandlerOutcome {
    if let Err(e) = ctx.ensure_active() {
        return e.into();
    }

    let timestamp = Utc::now().to_rfc3339();

    let credentials = match collaborators.credentials.resolve() {
        Ok(credentials) => credentials,
        Err(e) => {
            return HandlerOutcome::business(format!(
                "Veracode API Health Check\n\
                 ========================\n\n\
                 Timestamp: {timestamp}\n\n\
                 ❌ Authentication: Not configured\n\
                 Error: {e}\n\n\
                 Required credentials:\n\
                 - ~/.veracode/veracode.yml with key-id and key-secret\n\
                 - OR environment variables {API_ID_VAR} and {API_KEY_VAR}\n\n\
                 Please configure credentials and try again."
            ));
        }
    };

    let report = match collaborators.api.health(ctx, &credentials) {
        Ok(report) => report,
        Err(e) => return HandlerOutcome::from_collaborator("Health check failed", e),
    };

    let icon = if report.available { "✓" } else { "❌" };

    HandlerOutcome::text(format!(
        "Veracode API Health Check\n\
         ========================\n\n\
         Timestamp: {timestamp}\n\n\
         {icon} Veracode API ({base_url})\n\
         Status: {message}\n\
         HTTP Status: {status}\n\n\
         ✓ Authentication: Configured (source: {source})\n\n\
         Next steps:\n\
         - Run get-static-findings or get-dynamic-findings to fetch data\n\
         - Check application access permissions\n\
         - Review API rate limits and quotas",
        base_url = credentials.base_url(),
        message = report.message,
        status = report.status_code,
        source = credentials.source(),
    ))
}
