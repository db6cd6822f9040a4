//! Structured error types for Taskling
//!
//! Provides type-safe error handling with rich context for debugging,
//! user-friendly messages, and uniform rendering across CLI/API callers.

use thiserror::Error;

/// Primary error type for Taskling operations
#[derive(Error, Debug)]
pub enum TasklingError {
    // =========================================================================
    // Extraction Errors (structural)
    // =========================================================================
    /// Response text was empty or whitespace-only
    #[error("empty response: nothing to extract")]
    EmptyResponse,

    /// No extraction strategy produced a command
    #[error("no command found in response")]
    NoCommandFound,

    /// Structured data parsed but did not match any known plan shape
    #[error("unrecognized structured response shape: {detail}")]
    UnrecognizedShape { detail: String },

    /// Response explicitly signaled refusal
    #[error("model refused the request: {line}")]
    Refusal { line: String },

    // =========================================================================
    // Tool Errors
    // =========================================================================
    /// A plan step names a tool that is not registered
    #[error("tool not found: {tool_name}")]
    ToolNotFound { tool_name: String },

    /// A resolved tool failed during execution
    #[error("tool execution failed: {tool_name} - {message}")]
    ToolExecutionFailed { tool_name: String, message: String },

    // =========================================================================
    // Remote Planner Errors
    // =========================================================================
    /// Remote planner unreachable, timed out, or returned an invalid payload
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Remote planning is disabled or not configured
    #[error("remote planner is not configured")]
    PlannerUnavailable,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    // =========================================================================
    // External Error Wrappers
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),
}

impl TasklingError {
    /// Check whether this error is a structural extraction failure,
    /// as opposed to an explicit refusal or an execution problem.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::EmptyResponse | Self::NoCommandFound | Self::UnrecognizedShape { .. }
        )
    }

    /// Check whether the pipeline can recover from this error by falling
    /// through to a lower planner tier.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Transport and structural failures fall through to local tiers
            Self::Transport { .. } => true,
            Self::PlannerUnavailable => true,
            Self::EmptyResponse | Self::NoCommandFound | Self::UnrecognizedShape { .. } => true,

            // A refusal is a terminal answer for that response text
            Self::Refusal { .. } => false,

            // Tool and config errors surface to the caller
            Self::ToolNotFound { .. }
            | Self::ToolExecutionFailed { .. }
            | Self::InvalidConfig { .. }
            | Self::Io(_)
            | Self::Json(_) => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyResponse => "The assistant returned an empty response.".to_string(),
            Self::NoCommandFound => {
                "I couldn't find an actionable command in that response.".to_string()
            }
            Self::Refusal { line } => format!("The request was declined: {}", line.trim()),
            Self::ToolNotFound { tool_name } => {
                format!("No capability named '{}' is available.", tool_name)
            }
            Self::ToolExecutionFailed { tool_name, .. } => {
                format!("The '{}' capability failed while running.", tool_name)
            }
            Self::Transport { .. } => "The planning service could not be reached.".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<serde_json::Error> for TasklingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<reqwest::Error> for TasklingError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}

/// Result type alias using TasklingError
pub type Result<T> = std::result::Result<T, TasklingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_classification() {
        assert!(TasklingError::EmptyResponse.is_structural());
        assert!(TasklingError::NoCommandFound.is_structural());
        assert!(!TasklingError::Refusal {
            line: "I cannot do that".to_string()
        }
        .is_structural());
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(TasklingError::Transport {
            message: "connection refused".to_string()
        }
        .is_recoverable());

        assert!(TasklingError::NoCommandFound.is_recoverable());

        assert!(!TasklingError::ToolNotFound {
            tool_name: "file_ops".to_string()
        }
        .is_recoverable());
    }

    #[test]
    fn test_user_messages() {
        let err = TasklingError::ToolNotFound {
            tool_name: "clipboard".to_string(),
        };
        assert!(err.user_message().contains("clipboard"));

        let err = TasklingError::Refusal {
            line: "I cannot help with that.".to_string(),
        };
        assert!(err.user_message().contains("declined"));
    }
}
