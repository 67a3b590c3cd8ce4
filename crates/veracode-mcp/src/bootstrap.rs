//! Explicit bootstrap of the built-in tool set

use veracode_tools::{Collaborators, ToolRegistry, register_builtin_tools};

use crate::Result;
use crate::host::ToolHost;

/// Build a registry of the built-in tools and start a host over it.
///
/// Built-in tools that fail to start are skipped; the host reports them
/// through [`ToolHost::failures`].
pub fn bootstrap(collaborators: &Collaborators) -> Result<ToolHost> {
    let registry = ToolRegistry::new();
    register_builtin_tools(&registry, collaborators);
    start_host(&registry)
}

/// Start a host over an already populated registry, skipping failed tools.
pub fn start_host(registry: &ToolRegistry) -> Result<ToolHost> {
    launch(ToolHost::new(registry))
}

/// Start a host that refuses to come up unless every tool starts.
///
/// On failure every tool that was already initialized is shut down before
/// the error is returned.
pub fn start_host_strict(registry: &ToolRegistry) -> Result<ToolHost> {
    launch(ToolHost::new(registry).strict())
}

fn launch(mut host: ToolHost) -> Result<ToolHost> {
    if let Err(e) = host.start() {
        tracing::error!(error = %e, "Tool host failed to start");
        if let Err(cleanup) = host.shutdown_all() {
            tracing::warn!(error = %cleanup, "Shutdown after failed start also failed");
        }
        return Err(e);
    }
    Ok(host)
}
