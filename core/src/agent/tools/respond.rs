//! Literal response tool - the planner's echo floor

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::agent::tool::{optional_str, Tool, ToolError};

/// Returns its text parameter unchanged
#[derive(Debug, Default)]
pub struct RespondTool;

impl RespondTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for RespondTool {
    fn name(&self) -> &str {
        "respond"
    }

    fn description(&self) -> &str {
        "Echo text back to the user"
    }

    fn actions(&self) -> &[&str] {
        &["say"]
    }

    async fn invoke(&self, action: &str, params: &Map<String, Value>) -> Result<Value, ToolError> {
        match action {
            "say" => {
                let text = optional_str(params, "text").unwrap_or("");
                Ok(Value::String(text.to_string()))
            }
            other => Err(ToolError::new(format!("unknown respond action '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_say_echoes_text() {
        let tool = RespondTool::new();
        let mut params = Map::new();
        params.insert("text".to_string(), json!("hello there"));

        let result = tool.invoke("say", &params).await.unwrap();
        assert_eq!(result, json!("hello there"));
    }
}
