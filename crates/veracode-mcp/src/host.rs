//! Tool host: drives every registered tool through its lifecycle
//!
//! The host owns one instance per registered tool, tracks each instance's
//! [`LifecycleState`] and refuses out-of-order transitions. A tool that
//! fails to initialize or to register its handlers is shut down, marked
//! `Failed` and skipped; the remaining tools keep loading. Strict hosts stop
//! at the first failure instead.
//!
//! Requests are routed through the [`HandlerTable`] built during
//! registration; every handler runs with panic isolation.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde_json::Value;
use veracode_tools::{
    HandlerError, HandlerOutcome, Params, RequestContext, ToolLifecycle, ToolRegistry,
};

use crate::dispatch::HandlerTable;
use crate::{Error, Result};

/// Where a tool instance is in its one-way lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Created,
    Initialized,
    HandlersRegistered,
    /// Skipped at startup after `initialize` or `register_handlers` failed
    Failed,
    ShutDown,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Created => write!(f, "created"),
            LifecycleState::Initialized => write!(f, "initialized"),
            LifecycleState::HandlersRegistered => write!(f, "serving"),
            LifecycleState::Failed => write!(f, "failed"),
            LifecycleState::ShutDown => write!(f, "shut down"),
        }
    }
}

/// Name, description and handlers of a hosted tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub state: LifecycleState,
    pub handlers: Vec<String>,
}

/// A tool skipped during startup and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFailure {
    pub tool: String,
    pub reason: String,
}

struct HostedTool {
    tool: Box<dyn ToolLifecycle>,
    state: LifecycleState,
}

impl HostedTool {
    fn name(&self) -> &str {
        self.tool.name()
    }

    fn violation(&self, operation: &'static str) -> Error {
        Error::LifecycleViolation {
            tool: self.name().to_string(),
            state: self.state,
            operation,
        }
    }

    /// Release a tool that could not start and record why.
    fn fail(&mut self, err: &Error, failures: &mut Vec<ToolFailure>) {
        tracing::error!(tool = %self.name(), error = %err, "Skipping tool that failed to start");
        if let Err(e) = self.tool.shutdown() {
            tracing::warn!(tool = %self.name(), error = %e, "Failed tool also failed to shut down");
        }
        self.state = LifecycleState::Failed;
        failures.push(ToolFailure {
            tool: self.name().to_string(),
            reason: err.to_string(),
        });
    }
}

/// Owner of the tool instances and the handler table.
///
/// # Example
///
/// ```ignore
/// let registry = ToolRegistry::new();
/// register_builtin_tools(&registry, &Collaborators::detached());
///
/// let mut host = ToolHost::new(&registry);
/// host.start()?;
/// let outcome = host.call(&RequestContext::new(), "api-health", &Params::new())?;
/// host.shutdown_all()?;
/// ```
pub struct ToolHost {
    tools: Vec<HostedTool>,
    handlers: HandlerTable,
    failures: Vec<ToolFailure>,
    strict: bool,
    shut_down: bool,
}

impl ToolHost {
    /// Materialize one fresh instance per registered tool (sorted by name).
    pub fn new(registry: &ToolRegistry) -> Self {
        let tools = registry
            .get_all_tools()
            .into_iter()
            .map(|tool| HostedTool {
                tool,
                state: LifecycleState::Created,
            })
            .collect();

        Self {
            tools,
            handlers: HandlerTable::new(),
            failures: Vec::new(),
            strict: false,
            shut_down: false,
        }
    }

    /// Stop at the first tool failure instead of skipping the tool.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Initialize every tool, then let every tool register its handlers.
    ///
    /// Tools that fail either phase are skipped (see [`ToolHost::failures`]).
    /// A strict host returns the first failure instead; tools already
    /// initialized stay that way until [`ToolHost::shutdown_all`].
    pub fn start(&mut self) -> Result<()> {
        self.initialize_all()?;
        self.register_all()?;
        tracing::info!(
            tools = self.tools.len(),
            handlers = self.handlers.len(),
            failed = self.failures.len(),
            "Tool host started"
        );
        Ok(())
    }

    /// Run `initialize` on every tool still in `Created`.
    pub fn initialize_all(&mut self) -> Result<()> {
        self.ensure_running()?;

        for hosted in &mut self.tools {
            match hosted.state {
                LifecycleState::Created => {}
                LifecycleState::Initialized
                | LifecycleState::HandlersRegistered
                | LifecycleState::Failed => continue,
                LifecycleState::ShutDown => return Err(hosted.violation("initialize")),
            }

            match hosted.tool.initialize() {
                Ok(()) => hosted.state = LifecycleState::Initialized,
                Err(e) if self.strict => {
                    tracing::error!(tool = %hosted.name(), error = %e, "Tool failed to initialize");
                    return Err(e.into());
                }
                Err(e) => hosted.fail(&e.into(), &mut self.failures),
            }
        }
        Ok(())
    }

    /// Run `register_handlers` on every tool in `Initialized`.
    ///
    /// A tool's bindings are committed only when its registration succeeded.
    ///
    /// # Errors
    ///
    /// - [`Error::LifecycleViolation`] for a tool that was never initialized
    ///
    /// Strict hosts also return:
    ///
    /// - [`Error::NoHandlersRegistered`] for a tool that bound nothing
    /// - [`Error::DuplicateHandler`] for a name another tool already owns
    pub fn register_all(&mut self) -> Result<()> {
        self.ensure_running()?;

        for hosted in &mut self.tools {
            match hosted.state {
                LifecycleState::Initialized => {}
                LifecycleState::HandlersRegistered | LifecycleState::Failed => continue,
                LifecycleState::Created | LifecycleState::ShutDown => {
                    return Err(hosted.violation("register handlers for"));
                }
            }

            let name = hosted.tool.name().to_string();
            let mut scope = self.handlers.scope(&name);
            let registered = hosted
                .tool
                .register_handlers(&mut scope)
                .map_err(Error::from)
                .and_then(|()| scope.commit());

            match registered {
                Ok(bound) => {
                    tracing::debug!(tool = %name, handlers = ?bound, "Registered handlers");
                    hosted.state = LifecycleState::HandlersRegistered;
                }
                Err(e) if self.strict => return Err(e),
                Err(e) => hosted.fail(&e, &mut self.failures),
            }
        }
        Ok(())
    }

    /// Shut down every tool not already shut down or failed.
    ///
    /// Every tool is visited even when some fail; the first failure is
    /// returned. The handler table is cleared and the host cannot be
    /// started again.
    pub fn shutdown_all(&mut self) -> Result<()> {
        let mut first_error = None;

        for hosted in &mut self.tools {
            if matches!(hosted.state, LifecycleState::ShutDown | LifecycleState::Failed) {
                continue;
            }
            if let Err(e) = hosted.tool.shutdown() {
                tracing::warn!(tool = %hosted.tool.name(), error = %e, "Tool failed to shut down");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            hosted.state = LifecycleState::ShutDown;
        }

        self.handlers.clear();
        self.shut_down = true;
        tracing::info!("Tool host shut down");

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Invoke the handler bound to `handler_name`.
    ///
    /// A panicking handler yields
    /// `InfrastructureError(HandlerError::Panicked)`; the host stays usable.
    pub fn call(
        &self,
        ctx: &RequestContext,
        handler_name: &str,
        params: &Params,
    ) -> Result<HandlerOutcome> {
        self.ensure_running()?;

        let entry = self
            .handlers
            .get(handler_name)
            .ok_or_else(|| Error::UnknownHandler(handler_name.to_string()))?;

        tracing::debug!(
            handler = handler_name,
            tool = entry.tool_name(),
            request_id = %ctx.request_id(),
            "Dispatching request"
        );

        let handler = entry.handler();
        let outcome = catch_unwind(AssertUnwindSafe(|| handler(ctx, params))).unwrap_or_else(
            |panic| {
                let message = panic_message(panic.as_ref());
                tracing::error!(handler = handler_name, %message, "Handler panicked");
                HandlerOutcome::from(HandlerError::Panicked {
                    handler: handler_name.to_string(),
                    message,
                })
            },
        );

        Ok(outcome)
    }

    /// Invoke a handler with JSON parameters and return the transport payload.
    ///
    /// Business errors come back as `Ok({"error": ...})`; infrastructure
    /// errors as [`Error::Handler`].
    pub fn call_json(
        &self,
        ctx: &RequestContext,
        handler_name: &str,
        params: Value,
    ) -> Result<Value> {
        let params = match params {
            Value::Object(map) => map,
            Value::Null => Params::new(),
            other => return Err(Error::ParamsNotObject(other.to_string())),
        };

        let payload = self.call(ctx, handler_name, &params)?.into_payload()?;
        Ok(payload)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(HostedTool::name).collect()
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.names()
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    pub fn state_of(&self, tool_name: &str) -> Option<LifecycleState> {
        self.tools
            .iter()
            .find(|hosted| hosted.name() == tool_name)
            .map(|hosted| hosted.state)
    }

    pub fn summaries(&self) -> Vec<ToolSummary> {
        self.tools
            .iter()
            .map(|hosted| ToolSummary {
                name: hosted.name().to_string(),
                description: hosted.tool.description().to_string(),
                state: hosted.state,
                handlers: self
                    .handlers
                    .names_for(hosted.name())
                    .into_iter()
                    .map(String::from)
                    .collect(),
            })
            .collect()
    }

    /// Tools skipped during startup, in startup order.
    pub fn failures(&self) -> &[ToolFailure] {
        &self.failures
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    fn ensure_running(&self) -> Result<()> {
        if self.shut_down {
            Err(Error::HostShutDown)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for ToolHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolHost")
            .field("tools", &self.tool_names())
            .field("handlers", &self.handlers)
            .field("shut_down", &self.shut_down)
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
