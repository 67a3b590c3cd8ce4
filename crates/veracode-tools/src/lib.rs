//! Tool framework for the Veracode MCP server.
//!
//! Independent tool modules register constructors into a [`ToolRegistry`],
//! expose named request handlers, and are driven through a uniform
//! lifecycle.
//!
//! # Architecture
//!
//! ```text
//! [ register_builtin_tools ]
//!        | (name -> constructor)
//!        v
//! [ ToolRegistry ] --get_all_tools--> [ ToolLifecycle instances ]
//!                                            |
//!                 initialize -> register_handlers -> shutdown
//!                                            |
//!                                            v
//!                                  [ HandlerDispatch sink ]
//! ```
//!
//! Handlers return a [`HandlerOutcome`], which keeps business failures
//! (reported back as data) apart from infrastructure failures (propagated
//! by the transport).
//!
//! Everything a handler needs from the outside world (the findings API,
//! workspace discovery, the pipeline scanner process) is reached through
//! the traits in [`collaborators`].

pub mod builtins;
pub mod collaborators;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod tools;

pub use builtins::{BUILTIN_COUNT, register_builtin_tools};
pub use collaborators::{
    Collaborators, FindingsApi, FindingsKind, FindingsQuery, HealthReport, PipelineScanRequest,
    PipelineScanner, ScanProcessOutput, WorkspaceLocator,
};
pub use dispatch::{
    Handler, HandlerDispatch, HandlerOutcome, Params, RequestContext, handler, parse_params,
};
pub use error::{CollaboratorError, Error, HandlerError, Result};
pub use lifecycle::ToolLifecycle;
pub use registry::{ToolConstructor, ToolDescriptor, ToolRegistry};
