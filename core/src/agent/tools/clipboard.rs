//! Clipboard tool backed by arboard
//!
//! arboard is a blocking API; calls run on the blocking pool.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::agent::tool::{require_str, Tool, ToolError};

/// Read and write the system clipboard
#[derive(Debug, Default)]
pub struct ClipboardTool;

impl ClipboardTool {
    pub fn new() -> Self {
        Self
    }

    async fn read(&self) -> Result<Value, ToolError> {
        tokio::task::spawn_blocking(|| {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|e| ToolError::new(format!("clipboard unavailable: {}", e)))?;
            clipboard
                .get_text()
                .map(Value::String)
                .map_err(|e| ToolError::new(format!("clipboard read failed: {}", e)))
        })
        .await
        .map_err(|e| ToolError::new(format!("clipboard task failed: {}", e)))?
    }

    async fn write(&self, text: String) -> Result<Value, ToolError> {
        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|e| ToolError::new(format!("clipboard unavailable: {}", e)))?;
            clipboard
                .set_text(text)
                .map_err(|e| ToolError::new(format!("clipboard write failed: {}", e)))?;
            Ok(json!("Copied to clipboard"))
        })
        .await
        .map_err(|e| ToolError::new(format!("clipboard task failed: {}", e)))?
    }
}

#[async_trait]
impl Tool for ClipboardTool {
    fn name(&self) -> &str {
        "clipboard"
    }

    fn description(&self) -> &str {
        "Read and write the system clipboard"
    }

    fn actions(&self) -> &[&str] {
        &["read", "write"]
    }

    async fn invoke(&self, action: &str, params: &Map<String, Value>) -> Result<Value, ToolError> {
        match action {
            "read" => self.read().await,
            "write" => {
                let text = require_str(params, "text")?.to_string();
                self.write(text).await
            }
            other => Err(ToolError::new(format!(
                "unknown clipboard action '{}'",
                other
            ))),
        }
    }
}
