//! Handler dispatch contract
//!
//! A handler maps a request context and a parameter mapping to a
//! [`HandlerOutcome`]. Tools bind handlers to request names through the
//! [`HandlerDispatch`] sink during their registration phase; the sink
//! itself belongs to the bootstrap layer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{CollaboratorError, HandlerError};

/// Request parameters as received from the transport
pub type Params = serde_json::Map<String, Value>;

/// An executable request handler.
///
/// Handlers may run concurrently across requests, so anything they capture
/// must be safe to share.
pub type Handler = Arc<dyn Fn(&RequestContext, &Params) -> HandlerOutcome + Send + Sync>;

/// Wrap a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&RequestContext, &Params) -> HandlerOutcome + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Sink a tool populates with name -> handler bindings.
pub trait HandlerDispatch {
    /// Bind `handler` to the request name `handler_name`.
    fn register_handler(&mut self, handler_name: &str, handler: Handler);
}

/// Per-request context handed to every handler invocation.
///
/// Clones share the cancellation flag, so the transport can keep one clone
/// and cancel while the handler runs on another thread.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    cancelled: Arc<AtomicBool>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Signal cancellation to the handler and its collaborators.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`HandlerError::Cancelled`] once cancellation was requested.
    pub fn ensure_active(&self) -> Result<(), HandlerError> {
        if self.is_cancelled() {
            Err(HandlerError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a handler invocation.
///
/// The three variants keep the two error taxonomies apart:
///
/// - `BusinessError` - validation and business failures (missing
///   parameters, unknown paths, missing credentials). The call itself
///   succeeded; the caller gets readable text.
/// - `InfrastructureError` - marshaling failures, panics, cancellation.
///   The transport must propagate these differently.
#[derive(Debug)]
pub enum HandlerOutcome {
    Ok(Value),
    BusinessError(String),
    InfrastructureError(HandlerError),
}

impl HandlerOutcome {
    /// Successful result carrying a single text content block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Ok(json!({
            "content": [{
                "type": "text",
                "text": text.into(),
            }]
        }))
    }

    pub fn business(message: impl Into<String>) -> Self {
        Self::BusinessError(message.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn is_business_error(&self) -> bool {
        matches!(self, Self::BusinessError(_))
    }

    pub fn is_infrastructure_error(&self) -> bool {
        matches!(self, Self::InfrastructureError(_))
    }

    /// Convert to the two-channel transport shape.
    ///
    /// Business errors become a successful payload with an `error` field;
    /// only infrastructure errors use the error channel.
    pub fn into_payload(self) -> Result<Value, HandlerError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::BusinessError(message) => Ok(json!({ "error": message })),
            Self::InfrastructureError(err) => Err(err),
        }
    }

    /// Map a collaborator failure: cancellation is infrastructure, anything
    /// else is reported back to the caller with `context` prepended.
    pub fn from_collaborator(context: &str, err: CollaboratorError) -> Self {
        match err {
            CollaboratorError::Cancelled => Self::InfrastructureError(HandlerError::Cancelled),
            other => Self::BusinessError(format!("{context}: {other}")),
        }
    }
}

impl From<HandlerError> for HandlerOutcome {
    fn from(err: HandlerError) -> Self {
        Self::InfrastructureError(err)
    }
}

/// Deserialize the parameter mapping into a typed request.
///
/// Type mismatches are marshaling failures and therefore infrastructure
/// errors; checking required values is left to the caller.
pub fn parse_params<T: DeserializeOwned>(params: &Params) -> Result<T, HandlerError> {
    serde_json::from_value(Value::Object(params.clone()))
        .map_err(|e| HandlerError::InvalidParams(e.to_string()))
}
