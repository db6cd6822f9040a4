//! Translation tool
//!
//! Delegates to the planner client; the model is consumed as plain text
//! in, text out.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::agent::tool::{optional_str, require_str, Tool, ToolError};
use crate::llm::PlannerClient;

const SYSTEM_PROMPT: &str =
    "You are a translator. Respond with only the translation, no commentary.";

/// Translates text through the configured model endpoint
pub struct TranslateTool {
    client: Option<Arc<PlannerClient>>,
}

impl TranslateTool {
    pub fn new(client: Option<Arc<PlannerClient>>) -> Self {
        Self { client }
    }

    async fn translate(&self, text: &str, target: &str) -> Result<Value, ToolError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ToolError::new("translation requires a configured planner endpoint"))?;

        let user = format!("Translate into {}:\n{}", target, text);
        let reply = client
            .complete(SYSTEM_PROMPT, &user)
            .await
            .map_err(|e| ToolError::retryable(format!("translation failed: {}", e)))?;

        let translation = reply
            .trim()
            .trim_matches('`')
            .trim_matches('"')
            .trim()
            .to_string();

        Ok(json!({
            "source": text,
            "target_language": target,
            "translation": translation,
        }))
    }
}

#[async_trait]
impl Tool for TranslateTool {
    fn name(&self) -> &str {
        "translate"
    }

    fn description(&self) -> &str {
        "Translate text into a target language"
    }

    fn actions(&self) -> &[&str] {
        &["translate"]
    }

    async fn invoke(&self, action: &str, params: &Map<String, Value>) -> Result<Value, ToolError> {
        match action {
            "translate" => {
                let text = require_str(params, "text")?;
                let target = optional_str(params, "target").unwrap_or("English");
                self.translate(text, target).await
            }
            other => Err(ToolError::new(format!(
                "unknown translate action '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_translate_without_client_fails() {
        let tool = TranslateTool::new(None);
        let mut params = Map::new();
        params.insert("text".to_string(), json!("bonjour"));

        let result = tool.invoke("translate", &params).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("planner endpoint"));
    }
}
