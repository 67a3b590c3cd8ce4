//! Error types for veracode-tools

/// Result type for tool lifecycle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by a tool's lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required precondition could not be met during initialization
    #[error("failed to initialize {tool}: {message}")]
    Initialization { tool: String, message: String },

    /// The tool could not populate the dispatch sink
    #[error("failed to register handlers for {tool}: {message}")]
    HandlerRegistration { tool: String, message: String },
}

/// Failures reported by external collaborators (API client, workspace
/// discovery, scanner process)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// No implementation is wired for this collaborator
    #[error("{collaborator} is not available")]
    Unavailable { collaborator: String },

    /// The collaborator ran and failed
    #[error("{message}")]
    Failed { message: String },

    /// The collaborator observed cancellation and stopped
    #[error("operation cancelled")]
    Cancelled,
}

impl CollaboratorError {
    pub fn unavailable(collaborator: impl Into<String>) -> Self {
        Self::Unavailable {
            collaborator: collaborator.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Infrastructure failures of a handler invocation.
///
/// These abort the individual request at the transport level. Validation
/// problems are never reported through this type.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The parameter mapping could not be converted to the handler's request type
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The handler panicked
    #[error("handler {handler} panicked: {message}")]
    Panicked { handler: String, message: String },

    /// The request was cancelled by the caller
    #[error("request cancelled")]
    Cancelled,

    /// IO failure unrelated to request validation
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
