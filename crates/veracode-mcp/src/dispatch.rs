//! Handler table populated through the `HandlerDispatch` contract
//!
//! Each tool registers into a [`ToolScope`] borrowed from the table. The
//! scope buffers bindings and commits them only once the tool's
//! registration phase succeeded, so a failing tool leaves no handlers
//! behind.

use std::collections::BTreeMap;

use veracode_tools::{Handler, HandlerDispatch};

use crate::{Error, Result};

/// A bound handler and the tool that owns it.
#[derive(Clone)]
pub struct HandlerEntry {
    tool_name: String,
    handler: Handler,
}

impl HandlerEntry {
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("tool_name", &self.tool_name)
            .finish_non_exhaustive()
    }
}

/// Handler name -> entry, sorted by name.
#[derive(Debug, Default)]
pub struct HandlerTable {
    entries: BTreeMap<String, HandlerEntry>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handler_name: &str) -> Option<&HandlerEntry> {
        self.entries.get(handler_name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Handler names owned by `tool_name`.
    pub fn names_for(&self, tool_name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.tool_name == tool_name)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Open a registration scope for `tool_name`.
    pub fn scope(&mut self, tool_name: &str) -> ToolScope<'_> {
        ToolScope {
            table: self,
            tool_name: tool_name.to_string(),
            pending: Vec::new(),
        }
    }
}

/// Registration sink handed to a single tool.
pub struct ToolScope<'a> {
    table: &'a mut HandlerTable,
    tool_name: String,
    pending: Vec<(String, Handler)>,
}

impl ToolScope<'_> {
    /// Validate and commit the buffered bindings.
    ///
    /// # Errors
    ///
    /// - [`Error::NoHandlersRegistered`] if the tool bound nothing
    /// - [`Error::DuplicateHandler`] if a name is already bound, by this
    ///   tool or another one
    pub fn commit(self) -> Result<Vec<String>> {
        if self.pending.is_empty() {
            return Err(Error::NoHandlersRegistered {
                tool: self.tool_name,
            });
        }

        let mut seen: Vec<&str> = Vec::with_capacity(self.pending.len());
        for (name, _) in &self.pending {
            let owner = match self.table.entries.get(name) {
                Some(entry) => Some(entry.tool_name.clone()),
                None if seen.contains(&name.as_str()) => Some(self.tool_name.clone()),
                None => None,
            };
            if let Some(owner) = owner {
                return Err(Error::DuplicateHandler {
                    handler: name.clone(),
                    tool: self.tool_name.clone(),
                    owner,
                });
            }
            seen.push(name);
        }

        let mut committed = Vec::with_capacity(self.pending.len());
        for (name, handler) in self.pending {
            tracing::debug!(tool = %self.tool_name, handler = %name, "Bound handler");
            self.table.entries.insert(
                name.clone(),
                HandlerEntry {
                    tool_name: self.tool_name.clone(),
                    handler,
                },
            );
            committed.push(name);
        }
        Ok(committed)
    }
}

impl HandlerDispatch for ToolScope<'_> {
    fn register_handler(&mut self, handler_name: &str, handler: Handler) {
        self.pending.push((handler_name.to_string(), handler));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use veracode_tools::{HandlerOutcome, handler};

    fn noop() -> Handler {
        handler(|_, _| HandlerOutcome::text("ok"))
    }

    #[test]
    fn test_commit_records_owner() {
        let mut table = HandlerTable::new();
        let mut scope = table.scope("alpha");
        scope.register_handler("alpha-run", noop());
        scope.register_handler("alpha-list", noop());
        let committed = scope.commit().unwrap();

        assert_eq!(committed, vec!["alpha-run", "alpha-list"]);
        assert_eq!(table.names(), vec!["alpha-list", "alpha-run"]);
        assert_eq!(table.get("alpha-run").unwrap().tool_name(), "alpha");
        assert_eq!(table.names_for("alpha").len(), 2);
    }

    #[test]
    fn test_empty_scope_is_rejected() {
        let mut table = HandlerTable::new();
        let err = table.scope("silent").commit().unwrap_err();
        assert!(matches!(err, Error::NoHandlersRegistered { ref tool } if tool == "silent"));
    }

    #[test]
    fn test_duplicate_across_tools() {
        let mut table = HandlerTable::new();
        let mut scope = table.scope("alpha");
        scope.register_handler("shared", noop());
        scope.commit().unwrap();

        let mut scope = table.scope("beta");
        scope.register_handler("beta-only", noop());
        scope.register_handler("shared", noop());
        let err = scope.commit().unwrap_err();

        match err {
            Error::DuplicateHandler {
                handler,
                tool,
                owner,
            } => {
                assert_eq!(handler, "shared");
                assert_eq!(tool, "beta");
                assert_eq!(owner, "alpha");
            }
            other => panic!("Expected DuplicateHandler, got {other:?}"),
        }
        // Nothing from the failed scope was committed.
        assert!(table.get("beta-only").is_none());
    }

    #[test]
    fn test_duplicate_within_one_tool() {
        let mut table = HandlerTable::new();
        let mut scope = table.scope("alpha");
        scope.register_handler("run", noop());
        scope.register_handler("run", noop());
        assert!(matches!(
            scope.commit(),
            Err(Error::DuplicateHandler { .. })
        ));
        assert!(table.is_empty());
    }
}
