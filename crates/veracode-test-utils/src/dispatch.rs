//! [`StubDispatch`] sink recording handler bindings.

use std::collections::BTreeMap;

use serde_json::Value;
use veracode_tools::{Handler, HandlerDispatch, HandlerOutcome, Params, RequestContext};

/// Dispatch sink that keeps every registered handler for inspection.
///
/// # Example
///
/// ```rust,no_run
/// use veracode_test_utils::StubDispatch;
/// use veracode_tools::{Collaborators, ToolLifecycle, tools::api_health::ApiHealthTool};
///
/// let mut tool = ApiHealthTool::new(Collaborators::detached());
/// tool.initialize().unwrap();
/// let mut dispatch = StubDispatch::new();
/// tool.register_handlers(&mut dispatch).unwrap();
/// assert_eq!(dispatch.names(), vec!["api-health"]);
/// ```
#[derive(Default)]
pub struct StubDispatch {
    handlers: BTreeMap<String, Handler>,
}

impl StubDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered handler names (sorted).
    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Invoke a registered handler with a fresh context.
    ///
    /// `params` must be a JSON object.
    pub fn call(&self, name: &str, params: Value) -> HandlerOutcome {
        self.call_with(&RequestContext::new(), name, params)
    }

    /// Invoke a registered handler with the given context.
    pub fn call_with(&self, ctx: &RequestContext, name: &str, params: Value) -> HandlerOutcome {
        let handler = self
            .handlers
            .get(name)
            .unwrap_or_else(|| panic!("StubDispatch: no handler named {name}"));
        let params: Params = match params {
            Value::Object(map) => map,
            other => panic!("StubDispatch: params must be an object, got {other}"),
        };
        handler(ctx, &params)
    }
}

impl HandlerDispatch for StubDispatch {
    fn register_handler(&mut self, handler_name: &str, handler: Handler) {
        self.handlers.insert(handler_name.to_string(), handler);
    }
}
