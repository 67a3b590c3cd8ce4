//! Tool registry storage
//!
//! Maps tool name -> constructor. Tool modules register into an explicit
//! registry object at bootstrap; the host then asks for one fresh instance
//! per registered name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::lifecycle::ToolLifecycle;

/// Zero-argument factory producing a fresh tool instance
pub type ToolConstructor = Arc<dyn Fn() -> Box<dyn ToolLifecycle> + Send + Sync>;

/// A registered tool: its name and how to build it.
#[derive(Clone)]
pub struct ToolDescriptor {
    name: String,
    constructor: ToolConstructor,
}

impl ToolDescriptor {
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Box<dyn ToolLifecycle> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            constructor: Arc::new(constructor),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a new instance. Instances are never cached.
    pub fn instantiate(&self) -> Box<dyn ToolLifecycle> {
        (self.constructor)()
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registry of tool constructors.
///
/// Safe for concurrent registration. Registering a name twice replaces the
/// earlier constructor (last write wins); no error is raised.
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, ToolDescriptor>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store `constructor` under `name`, replacing any previous entry.
    pub fn register_tool<F>(&self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn ToolLifecycle> + Send + Sync + 'static,
    {
        let descriptor = ToolDescriptor::new(name, constructor);
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        if tools.contains_key(descriptor.name()) {
            tracing::warn!(
                tool = %descriptor.name(),
                "Tool registered twice; replacing constructor"
            );
        } else {
            tracing::debug!(tool = %descriptor.name(), "Registered tool");
        }
        tools.insert(descriptor.name.clone(), descriptor);
    }

    /// Invoke every stored constructor exactly once.
    ///
    /// Instances come back ordered by tool name. An empty registry yields
    /// an empty vec.
    pub fn get_all_tools(&self) -> Vec<Box<dyn ToolLifecycle>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.values().map(ToolDescriptor::instantiate).collect()
    }

    /// Check if a tool is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered tool names (sorted).
    pub fn names(&self) -> Vec<String> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
