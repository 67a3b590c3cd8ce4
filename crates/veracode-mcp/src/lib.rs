//! Tool host for the Veracode MCP server
//!
//! This crate wires the tool framework together: it builds the registry,
//! drives every tool through `initialize -> register_handlers -> shutdown`,
//! owns the handler table and routes requests to handlers.
//!
//! # Architecture
//!
//! ```text
//! [ bootstrap(&Collaborators) ]
//!        |
//!        v
//! [ ToolRegistry ] --get_all_tools--> [ ToolHost ]
//!                                         |  enforces lifecycle order
//!                                         v
//!                                  [ HandlerTable ] <-- call(handler, params)
//!                                         |
//!                                         v
//!                              HandlerOutcome (panic isolated)
//! ```
//!
//! The protocol transport is not part of this crate; it consumes
//! [`ToolHost::call`] or [`ToolHost::call_json`].

pub mod bootstrap;
pub mod dispatch;
pub mod error;
pub mod host;

pub use bootstrap::{bootstrap, start_host, start_host_strict};
pub use dispatch::{HandlerEntry, HandlerTable, ToolScope};
pub use error::{Error, Result};
pub use host::{LifecycleState, ToolFailure, ToolHost, ToolSummary};
