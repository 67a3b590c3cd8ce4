//! Built-in tool registrations
//!
//! The explicit bootstrap entry point: every built-in tool module is
//! registered here, in a fixed order, into the registry the caller owns.

use crate::collaborators::Collaborators;
use crate::registry::ToolRegistry;
use crate::tools::{api_health, finding_details, findings, pipeline_scan};

/// Number of built-in tools.
pub const BUILTIN_COUNT: usize = 6;

/// Register all built-in tools into `registry`.
///
/// Tools capture `collaborators` in their constructors; every instance the
/// registry builds later shares them.
pub fn register_builtin_tools(registry: &ToolRegistry, collaborators: &Collaborators) {
    api_health::register(registry, collaborators);
    findings::register(registry, collaborators);
    finding_details::register(registry, collaborators);
    pipeline_scan::register(registry, collaborators);

    tracing::debug!(count = registry.len(), "Registered built-in tools");
}
