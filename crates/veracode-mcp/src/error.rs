//! Error types for the tool host

use thiserror::Error;

use crate::host::LifecycleState;

/// Result type alias for host operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while bootstrapping tools or routing requests
#[derive(Debug, Error)]
pub enum Error {
    /// A tool lifecycle operation failed
    #[error(transparent)]
    Tool(#[from] veracode_tools::Error),

    /// Credential resolution failed
    #[error(transparent)]
    Credentials(#[from] veracode_credentials::Error),

    /// A lifecycle operation was attempted in the wrong state
    #[error("cannot {operation} tool {tool} while it is {state}")]
    LifecycleViolation {
        tool: String,
        state: LifecycleState,
        operation: &'static str,
    },

    /// A tool finished registration without binding any handler
    #[error("tool {tool} registered no handlers")]
    NoHandlersRegistered { tool: String },

    /// No handler is bound to the requested name
    #[error("unknown handler: {0}")]
    UnknownHandler(String),

    /// Two bindings for the same handler name
    #[error("handler {handler} registered by {tool} is already bound to {owner}")]
    DuplicateHandler {
        handler: String,
        tool: String,
        owner: String,
    },

    /// The host was shut down and cannot serve or restart
    #[error("tool host has been shut down")]
    HostShutDown,

    /// A handler reported an infrastructure failure
    #[error(transparent)]
    Handler(#[from] veracode_tools::HandlerError),

    /// Request parameters were not a JSON object
    #[error("parameters must be a JSON object, got {0}")]
    ParamsNotObject(String),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
