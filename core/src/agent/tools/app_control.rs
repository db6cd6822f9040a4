//! Application lifecycle tool
//!
//! Open, close, focus, minimize and maximize applications through the
//! platform's own utilities (`open`/`osascript` on macOS, the target
//! binary and `wmctrl`/`pkill` elsewhere). The OS handlers themselves are
//! external collaborators; this tool is the dispatch seam.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::agent::tool::{require_str, Tool, ToolError};

/// Controls application windows by name
#[derive(Debug, Default)]
pub struct AppControlTool;

impl AppControlTool {
    pub fn new() -> Self {
        Self
    }

    async fn open(&self, target: &str) -> Result<Value, ToolError> {
        if cfg!(target_os = "macos") {
            run("open", &["-a", target]).await?;
        } else if cfg!(target_os = "windows") {
            run("cmd", &["/C", "start", "", target]).await?;
        } else {
            // Detach so the engine is not held by a long-lived app
            tokio::process::Command::new(target)
                .spawn()
                .map_err(|e| ToolError::new(format!("cannot launch '{}': {}", target, e)))?;
        }
        Ok(json!(format!("Opened {}", target)))
    }

    async fn close(&self, target: &str) -> Result<Value, ToolError> {
        if cfg!(target_os = "macos") {
            let script = format!("quit app \"{}\"", target);
            run("osascript", &["-e", &script]).await?;
        } else {
            run("pkill", &["-f", target]).await?;
        }
        Ok(json!(format!("Closed {}", target)))
    }

    async fn window(&self, verb: &str, target: &str) -> Result<Value, ToolError> {
        let result = match verb {
            "focus" => run("wmctrl", &["-a", target]).await,
            "minimize" => run("wmctrl", &["-r", target, "-b", "add,hidden"]).await,
            "maximize" => {
                run(
                    "wmctrl",
                    &["-r", target, "-b", "add,maximized_vert,maximized_horz"],
                )
                .await
            }
            _ => return Err(ToolError::new(format!("unknown window verb '{}'", verb))),
        };
        result?;
        Ok(json!(format!("{} {}", verb, target)))
    }
}

async fn run(program: &str, args: &[&str]) -> Result<String, ToolError> {
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

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[async_trait]
impl Tool for AppControlTool {
    fn name(&self) -> &str {
        "app_control"
    }

    fn description(&self) -> &str {
        "Open, close, focus, minimize or maximize an application"
    }

    fn actions(&self) -> &[&str] {
        &["open", "close", "focus", "minimize", "maximize"]
    }

    async fn invoke(&self, action: &str, params: &Map<String, Value>) -> Result<Value, ToolError> {
        let target = require_str(params, "target")?;
        match action {
            "open" => self.open(target).await,
            "close" => self.close(target).await,
            "focus" | "minimize" | "maximize" => self.window(action, target).await,
            other => Err(ToolError::new(format!(
                "unknown app_control action '{}'",
                other
            ))),
        }
    }
}
