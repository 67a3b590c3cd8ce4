//! Three-phase tool lifecycle contract

use crate::Result;
use crate::dispatch::HandlerDispatch;

/// Contract every tool instance satisfies.
///
/// An instance moves through `Created -> Initialized -> HandlersRegistered
/// -> ShutDown`, one direction only. Calling `initialize` twice is not
/// guarded by the contract.
pub trait ToolLifecycle: Send + Sync {
    /// Unique tool name.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Prepare the tool to serve requests.
    fn initialize(&mut self) -> Result<()>;

    /// Bind at least one named handler into `dispatch`.
    ///
    /// Only valid after `initialize` succeeded.
    fn register_handlers(&self, dispatch: &mut dyn HandlerDispatch) -> Result<()>;

    /// Release whatever `initialize` acquired. Safe to call when
    /// `initialize` was a no-op.
    fn shutdown(&mut self) -> Result<()>;
}
