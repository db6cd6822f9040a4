//! Screenshot tool
//!
//! Delegates capture to the platform utility (`screencapture` on macOS,
//! `scrot` or `gnome-screenshot` elsewhere) and returns the saved path.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

use crate::agent::tool::{optional_str, Tool, ToolError};

/// Captures the screen to an image file
#[derive(Debug, Default)]
pub struct ScreenshotTool;

impl ScreenshotTool {
    pub fn new() -> Self {
        Self
    }

    fn default_path() -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        std::env::temp_dir().join(format!("taskling_screenshot_{}.png", stamp))
    }

    async fn capture(&self, path: &str) -> Result<Value, ToolError> {
        let target = if path.is_empty() {
            Self::default_path()
        } else {
            PathBuf::from(path)
        };
        let target_str = target.to_string_lossy().to_string();

        if cfg!(target_os = "macos") {
            run("screencapture", &["-x", &target_str]).await?;
        } else if run("scrot", &[&target_str]).await.is_err() {
            run("gnome-screenshot", &["-f", &target_str]).await?;
        }

        Ok(json!({ "path": target_str }))
    }
}

async fn run(program: &str, args: &[&str]) -> Result<(), ToolError> {
    let output = tokio::process::Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| ToolError::new(format!("'{}' unavailable: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ToolError::new(format!(
            "'{}' failed: {}",
            program,
            stderr.trim()
        )));
    }

    Ok(())
}

#[async_trait]
impl Tool for ScreenshotTool {
    fn name(&self) -> &str {
        "screenshot"
    }

    fn description(&self) -> &str {
        "Capture the screen to an image file"
    }

    fn actions(&self) -> &[&str] {
        &["capture"]
    }

    async fn invoke(&self, action: &str, params: &Map<String, Value>) -> Result<Value, ToolError> {
        match action {
            "capture" => {
                let path = optional_str(params, "path").unwrap_or("");
                self.capture(path).await
            }
            other => Err(ToolError::new(format!(
                "unknown screenshot action '{}'",
                other
            ))),
        }
    }
}
