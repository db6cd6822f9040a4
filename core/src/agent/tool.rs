//! Capability interface for tools
//!
//! Every tool exposes exactly one calling convention: an action name plus a
//! parameter mapping, returning a JSON value or an error. The engine never
//! probes alternative shapes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Error raised by a tool during invocation
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ToolError {
    pub message: String,
    pub retryable: bool,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }
}

/// A named capability invocable by the execution engine.
///
/// Implementations must be `Send + Sync`; one instance serves concurrent
/// engines through the shared registry. The first entry of `actions()` is
/// the tool's default operation, used when a plan step names the tool
/// without an operation suffix.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Canonical registry name (e.g. "file_ops")
    fn name(&self) -> &str;

    /// A brief description of what the tool does
    fn description(&self) -> &str;

    /// Supported action names; the first is the default
    fn actions(&self) -> &[&str];

    /// Execute one action with the provided parameters
    async fn invoke(&self, action: &str, params: &Map<String, Value>) -> Result<Value, ToolError>;
}

/// Introspection record for a registered tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub actions: Vec<String>,
}

impl ToolSpec {
    pub fn of(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            actions: tool.actions().iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Fetch a required string parameter
pub fn require_str<'a>(params: &'a Map<String, Value>, key: &str) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::new(format!("missing required parameter '{}'", key)))
}

/// Fetch an optional string parameter
pub fn optional_str<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_str() {
        let mut params = Map::new();
        params.insert("path".to_string(), json!("notes.txt"));

        assert_eq!(require_str(&params, "path").unwrap(), "notes.txt");
        assert!(require_str(&params, "content").is_err());
    }

    #[test]
    fn test_optional_str_ignores_non_strings() {
        let mut params = Map::new();
        params.insert("count".to_string(), json!(3));
        assert_eq!(optional_str(&params, "count"), None);
    }
}
