//! System command tool
//!
//! Executes an extracted command line with safety checks and a timeout.
//! Process spawning itself is delegated to the OS; this tool is the seam
//! plans reach it through.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::time::{timeout, Duration};

use crate::agent::tool::{require_str, Tool, ToolError};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_OUTPUT_SIZE: usize = 100_000; // 100KB max output

/// Runs a single command line, without a shell
#[derive(Debug, Default)]
pub struct SystemCommandTool;

impl SystemCommandTool {
    pub fn new() -> Self {
        Self
    }

    async fn execute(&self, command: &str) -> Result<Value, ToolError> {
        let dangerous_patterns = ["rm -rf /", "> /dev/sda", "dd if=/dev/zero", "mkfs"];
        for pattern in &dangerous_patterns {
            if command.contains(pattern) {
                return Err(ToolError::new(format!(
                    "command blocked for safety: contains '{}'",
                    pattern
                )));
            }
        }

        let result = timeout(
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            run_command(command),
        )
        .await;

        match result {
            Ok(Ok(output)) => Ok(Value::String(output)),
            Ok(Err(e)) => Err(ToolError::new(format!("command failed: {}", e))),
            Err(_) => Err(ToolError::retryable(format!(
                "command timed out after {} seconds",
                DEFAULT_TIMEOUT_SECS
            ))),
        }
    }
}

async fn run_command(command: &str) -> Result<String, String> {
    use tokio::process::Command;

    let output = if cfg!(target_os = "windows") {
        Command::new("cmd")
            .args(["/C", command])
            .output()
            .await
            .map_err(|e| e.to_string())?
    } else {
        let argv = shell_words::split(command).map_err(|e| format!("unparsable command: {}", e))?;
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| "empty command".to_string())?;
        Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| e.to_string())?
    };

    let mut result = String::new();

    if !output.stdout.is_empty() {
        result.push_str(&String::from_utf8_lossy(&output.stdout));
    }

    if !output.stderr.is_empty() {
        if !result.is_empty() {
            result.push_str("\n\n[stderr]:\n");
        } else {
            result.push_str("[stderr]:\n");
        }
        result.push_str(&String::from_utf8_lossy(&output.stderr));
    }

    if !output.status.success() {
        result.push_str(&format!(
            "\n[exit status: {}]",
            output.status.code().unwrap_or(-1)
        ));
    }

    if result.len() > MAX_OUTPUT_SIZE {
        result.truncate(MAX_OUTPUT_SIZE);
        result.push_str("\n... (output truncated)");
    }

    Ok(result)
}

#[async_trait]
impl Tool for SystemCommandTool {
    fn name(&self) -> &str {
        "system_command"
    }

    fn description(&self) -> &str {
        "Run a single command line and return its output"
    }

    fn actions(&self) -> &[&str] {
        &["run"]
    }

    async fn invoke(&self, action: &str, params: &Map<String, Value>) -> Result<Value, ToolError> {
        match action {
            "run" => self.execute(require_str(params, "command")?).await,
            other => Err(ToolError::new(format!(
                "unknown system_command action '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn command_params(command: &str) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("command".to_string(), json!(command));
        params
    }

    #[tokio::test]
    async fn test_dangerous_command_is_blocked() {
        let tool = SystemCommandTool::new();
        let result = tool.invoke("run", &command_params("rm -rf / --no-preserve-root")).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("blocked"));
    }

    #[tokio::test]
    async fn test_missing_command_param_fails() {
        let tool = SystemCommandTool::new();
        assert!(tool.invoke("run", &Map::new()).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_echo_roundtrip() {
        let tool = SystemCommandTool::new();
        let result = tool.invoke("run", &command_params("echo hello")).await.unwrap();
        assert_eq!(result.as_str().unwrap().trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_quoted_arguments_survive_splitting() {
        let tool = SystemCommandTool::new();
        let result = tool
            .invoke("run", &command_params("echo 'hello world'"))
            .await
            .unwrap();
        assert_eq!(result.as_str().unwrap().trim(), "hello world");
    }
}
