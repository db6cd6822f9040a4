//! Filesystem tool - create, read, append, delete and list files

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::path::Path;

use crate::agent::tool::{optional_str, require_str, Tool, ToolError};

const MAX_FILE_SIZE: u64 = 10_000_000; // 10MB max read

/// File and folder operations rooted in the working directory
#[derive(Debug, Default)]
pub struct FileOpsTool;

impl FileOpsTool {
    pub fn new() -> Self {
        Self
    }

    async fn read_file(&self, path: &str) -> Result<Value, ToolError> {
        let path = Path::new(path);

        if path.is_dir() {
            return Err(ToolError::new(format!(
                "'{}' is a directory, not a file",
                path.display()
            )));
        }

        // Check file size before reading
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ToolError::new(format!("cannot access file: {}", e)))?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(ToolError::new(format!(
                "file too large: {} bytes (max {})",
                metadata.len(),
                MAX_FILE_SIZE
            )));
        }

        tokio::fs::read_to_string(path)
            .await
            .map(Value::String)
            .map_err(|e| ToolError::new(format!("error reading file: {}", e)))
    }

    async fn write_file(&self, path: &str, content: &str, append: bool) -> Result<Value, ToolError> {
        let path = Path::new(path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ToolError::new(format!("cannot create directory: {}", e)))?;
            }
        }

        if append {
            let mut existing = match tokio::fs::read_to_string(path).await {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
                Err(e) => return Err(ToolError::new(format!("error reading file: {}", e))),
            };
            existing.push_str(content);
            tokio::fs::write(path, existing)
                .await
                .map_err(|e| ToolError::new(format!("error writing file: {}", e)))?;
            return Ok(json!(format!("Appended to {}", path.display())));
        }

        tokio::fs::write(path, content)
            .await
            .map_err(|e| ToolError::new(format!("error writing file: {}", e)))?;
        Ok(json!(format!("Created {}", path.display())))
    }

    async fn delete_path(&self, path: &str) -> Result<Value, ToolError> {
        let target = Path::new(path);
        let result = if target.is_dir() {
            tokio::fs::remove_dir_all(target).await
        } else {
            tokio::fs::remove_file(target).await
        };
        result.map_err(|e| ToolError::new(format!("error deleting '{}': {}", path, e)))?;
        Ok(json!(format!("Deleted {}", path)))
    }

    async fn list_dir(&self, path: &str) -> Result<Value, ToolError> {
        let path = if path.is_empty() { "." } else { path };

        let mut entries = tokio::fs::read_dir(path)
            .await
            .map_err(|e| ToolError::new(format!("error listing directory: {}", e)))?;

        let mut names = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(json!(names))
    }

    async fn make_dir(&self, path: &str) -> Result<Value, ToolError> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| ToolError::new(format!("error creating directory: {}", e)))?;
        Ok(json!(format!("Created directory {}", path)))
    }
}

#[async_trait]
impl Tool for FileOpsTool {
    fn name(&self) -> &str {
        "file_ops"
    }

    fn description(&self) -> &str {
        "Create, read, append, delete and list files and folders"
    }

    fn actions(&self) -> &[&str] {
        &["list", "read", "create", "append", "delete", "mkdir"]
    }

    async fn invoke(&self, action: &str, params: &Map<String, Value>) -> Result<Value, ToolError> {
        match action {
            "list" => {
                let path = optional_str(params, "path").unwrap_or(".");
                self.list_dir(path).await
            }
            "read" => self.read_file(require_str(params, "path")?).await,
            "create" => {
                let path = require_str(params, "path")?;
                let content = optional_str(params, "content").unwrap_or("");
                self.write_file(path, content, false).await
            }
            "append" => {
                let path = require_str(params, "path")?;
                let content = require_str(params, "content")?;
                self.write_file(path, content, true).await
            }
            "delete" => self.delete_path(require_str(params, "path")?).await,
            "mkdir" => self.make_dir(require_str(params, "path")?).await,
            other => Err(ToolError::new(format!("unknown file_ops action '{}'", other))),
        }
    }
}
