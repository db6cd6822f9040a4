//! System query tool backed by sysinfo

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use sysinfo::{Disks, System};

use crate::agent::tool::{Tool, ToolError};

/// Reports CPU, memory, disk and uptime figures
#[derive(Debug, Default)]
pub struct SystemInfoTool;

impl SystemInfoTool {
    pub fn new() -> Self {
        Self
    }

    async fn cpu(&self) -> Value {
        let mut sys = System::new();
        sys.refresh_cpu();
        // Usage needs two samples a beat apart
        tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
        sys.refresh_cpu();

        json!({
            "cores": sys.cpus().len(),
            "usage_percent": format!("{:.1}", sys.global_cpu_info().cpu_usage()),
        })
    }

    fn memory(&self) -> Value {
        let mut sys = System::new();
        sys.refresh_memory();

        json!({
            "total_mb": sys.total_memory() / 1_048_576,
            "used_mb": sys.used_memory() / 1_048_576,
            "available_mb": sys.available_memory() / 1_048_576,
        })
    }

    fn disks(&self) -> Value {
        let disks = Disks::new_with_refreshed_list();
        let entries: Vec<Value> = disks
            .iter()
            .map(|disk| {
                json!({
                    "mount": disk.mount_point().display().to_string(),
                    "total_gb": disk.total_space() / 1_073_741_824,
                    "available_gb": disk.available_space() / 1_073_741_824,
                })
            })
            .collect();
        json!(entries)
    }

    fn uptime(&self) -> Value {
        let seconds = System::uptime();
        json!({
            "seconds": seconds,
            "pretty": format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60),
        })
    }
}

#[async_trait]
impl Tool for SystemInfoTool {
    fn name(&self) -> &str {
        "system_info"
    }

    fn description(&self) -> &str {
        "Query system resources: CPU, memory, disks, uptime"
    }

    fn actions(&self) -> &[&str] {
        &["overview", "cpu", "memory", "disks", "uptime"]
    }

    async fn invoke(&self, action: &str, _params: &Map<String, Value>) -> Result<Value, ToolError> {
        match action {
            "overview" => Ok(json!({
                "cpu": self.cpu().await,
                "memory": self.memory(),
                "disks": self.disks(),
                "uptime": self.uptime(),
            })),
            "cpu" => Ok(self.cpu().await),
            "memory" => Ok(self.memory()),
            "disks" => Ok(self.disks()),
            "uptime" => Ok(self.uptime()),
            other => Err(ToolError::new(format!(
                "unknown system_info action '{}'",
                other
            ))),
        }
    }
}
