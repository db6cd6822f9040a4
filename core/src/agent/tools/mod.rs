//! Concrete tool implementations
//!
//! Each tool implements the single `Tool` capability interface and is
//! registered under its canonical name. The default registry wires up the
//! full set used by the planner tiers.

pub mod app_control;
pub mod calc;
pub mod clipboard;
pub mod datetime;
pub mod fs;
pub mod respond;
pub mod screenshot;
pub mod shell;
pub mod system;
pub mod translate;
pub mod weather;

pub use app_control::AppControlTool;
pub use calc::CalcTool;
pub use clipboard::ClipboardTool;
pub use datetime::DateTimeTool;
pub use fs::FileOpsTool;
pub use respond::RespondTool;
pub use screenshot::ScreenshotTool;
pub use shell::SystemCommandTool;
pub use system::SystemInfoTool;
pub use translate::TranslateTool;
pub use weather::WeatherTool;

use std::sync::Arc;

use crate::agent::tool_registry::ToolRegistry;
use crate::llm::PlannerClient;

/// Build a registry with the full default tool set.
///
/// The planner client is optional; without it the translate tool reports
/// that no endpoint is configured instead of being absent.
pub fn default_registry(client: Option<Arc<PlannerClient>>) -> ToolRegistry {
    let registry = ToolRegistry::new();
    registry.register(Arc::new(RespondTool::new()));
    registry.register(Arc::new(FileOpsTool::new()));
    registry.register(Arc::new(SystemCommandTool::new()));
    registry.register(Arc::new(SystemInfoTool::new()));
    registry.register(Arc::new(AppControlTool::new()));
    registry.register(Arc::new(ClipboardTool::new()));
    registry.register(Arc::new(DateTimeTool::new()));
    registry.register(Arc::new(WeatherTool::new()));
    registry.register(Arc::new(CalcTool::new()));
    registry.register(Arc::new(ScreenshotTool::new()));
    registry.register(Arc::new(TranslateTool::new(client)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_covers_planner_targets() {
        let registry = default_registry(None);
        for name in [
            "respond",
            "file_ops",
            "system_command",
            "system_info",
            "app_control",
            "clipboard",
            "datetime",
            "weather",
            "calc",
            "screenshot",
            "translate",
        ] {
            assert!(registry.contains(name), "missing tool: {}", name);
        }
    }
}
