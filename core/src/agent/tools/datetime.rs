//! Date and time tool

use async_trait::async_trait;
use chrono::Local;
use serde_json::{json, Map, Value};

use crate::agent::tool::{Tool, ToolError};

/// Reports the local date and time
#[derive(Debug, Default)]
pub struct DateTimeTool;

impl DateTimeTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for DateTimeTool {
    fn name(&self) -> &str {
        "datetime"
    }

    fn description(&self) -> &str {
        "Current local date and time"
    }

    fn actions(&self) -> &[&str] {
        &["now", "date", "time"]
    }

    async fn invoke(&self, action: &str, _params: &Map<String, Value>) -> Result<Value, ToolError> {
        let now = Local::now();
        match action {
            "now" => Ok(json!({
                "iso": now.to_rfc3339(),
                "date": now.format("%Y-%m-%d").to_string(),
                "time": now.format("%H:%M:%S").to_string(),
                "weekday": now.format("%A").to_string(),
            })),
            "date" => Ok(json!(now.format("%Y-%m-%d").to_string())),
            "time" => Ok(json!(now.format("%H:%M:%S").to_string())),
            other => Err(ToolError::new(format!(
                "unknown datetime action '{}'",
                other
            ))),
        }
    }
}
