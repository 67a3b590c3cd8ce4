//! Built-in tool implementations
//!
//! Each module exposes a `register` entry point that adds its tool(s) to a
//! [`ToolRegistry`](crate::ToolRegistry). [`crate::register_builtin_tools`]
//! calls them in a fixed order.

pub mod api_health;
pub mod finding_details;
pub mod findings;
pub mod pipeline_scan;

use std::sync::Arc;

use veracode_credentials::Credentials;

use crate::collaborators::Collaborators;
use crate::dispatch::HandlerOutcome;
use crate::{Error, Result};

/// Handler control flow: `Err` short-circuits with a finished outcome.
type Flow<T> = std::result::Result<T, HandlerOutcome>;

/// Collaborators a tool acquires in `initialize` and releases in `shutdown`.
struct Session {
    collaborators: Collaborators,
    active: Option<Arc<Collaborators>>,
}

impl Session {
    fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            active: None,
        }
    }

    fn activate(&mut self, tool: &str) {
        tracing::info!(tool, "Initializing tool");
        self.active = Some(Arc::new(self.collaborators.clone()));
    }

    fn active(&self, tool: &str) -> Result<Arc<Collaborators>> {
        self.active.clone().ok_or_else(|| Error::HandlerRegistration {
            tool: tool.to_string(),
            message: "tool has not been initialized".to_string(),
        })
    }

    fn release(&mut self, tool: &str) {
        tracing::info!(tool, "Shutting down tool");
        self.active = None;
    }
}

/// Required, non-empty `application_path`.
fn require_application_path(value: Option<String>) -> Flow<String> {
    value
        .filter(|p| !p.is_empty())
        .ok_or_else(|| {
            HandlerOutcome::business("application_path is required and must be an absolute path")
        })
}

/// Use the explicit profile when given, otherwise ask workspace discovery.
fn resolve_app_profile(
    collaborators: &Collaborators,
    application_path: &str,
    app_profile: Option<String>,
) -> Flow<String> {
    if let Some(profile) = app_profile.filter(|p| !p.is_empty()) {
        return Ok(profile);
    }

    collaborators
        .workspace
        .project_name(std::path::Path::new(application_path))
        .map_err(|e| {
            HandlerOutcome::from_collaborator("Failed to find workspace configuration", e)
        })
}

fn resolve_credentials(collaborators: &Collaborators) -> Flow<Credentials> {
    collaborators.credentials.resolve().map_err(|e| {
        HandlerOutcome::business(format!("Failed to create Veracode API client: {e}"))
    })
}
