//! Tool registry
//!
//! Name-keyed store decoupling the execution engine from concrete tool
//! implementations. Explicitly constructed and injected, so tests and
//! concurrent sessions get isolated engine instances over a shared,
//! read-mostly registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::agent::tool::{Tool, ToolSpec};

/// A registry of invocable tools keyed by canonical name
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Create a new, empty tool registry
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
        }
    }

    /// Register a tool under its canonical name.
    ///
    /// Re-registration under the same name overwrites: last wins.
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        debug!(tool = %name, "registering tool");
        self.tools.write().insert(name, tool);
    }

    /// Look up a tool by name; never panics
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().get(name).cloned()
    }

    /// Check whether a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.read().contains_key(name)
    }

    /// All registered tool names, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Name → spec map used by planners for introspection
    pub fn capabilities(&self) -> HashMap<String, ToolSpec> {
        self.tools
            .read()
            .iter()
            .map(|(name, tool)| (name.clone(), ToolSpec::of(tool.as_ref())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::tool::ToolError;
    use async_trait::async_trait;
    use serde_json::{Map, Value};

    struct TaggedTool {
        name: &'static str,
        tag: &'static str,
    }

    #[async_trait]
    impl Tool for TaggedTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "test tool"
        }

        fn actions(&self) -> &[&str] {
            &["run"]
        }

        async fn invoke(
            &self,
            _action: &str,
            _params: &Map<String, Value>,
        ) -> Result<Value, ToolError> {
            Ok(Value::String(self.tag.to_string()))
        }
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(TaggedTool {
            name: "echo",
            tag: "first",
        }));
        registry.register(Arc::new(TaggedTool {
            name: "echo",
            tag: "second",
        }));

        assert_eq!(registry.len(), 1);
        let tool = registry.get("echo").unwrap();
        let result = tool.invoke("run", &Map::new()).await.unwrap();
        assert_eq!(result, Value::String("second".to_string()));
    }

    #[test]
    fn test_get_missing_returns_none() {
        let registry = ToolRegistry::new();
        assert!(registry.get("nope").is_none());
        assert!(!registry.contains("nope"));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_capabilities_lists_specs() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(TaggedTool {
            name: "echo",
            tag: "x",
        }));

        let caps = registry.capabilities();
        assert_eq!(caps.len(), 1);
        assert_eq!(caps["echo"].actions, vec!["run"]);
    }
}
