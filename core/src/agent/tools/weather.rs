//! Weather lookup via wttr.in

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::agent::tool::{optional_str, Tool, ToolError};

/// Fetches current conditions from wttr.in
pub struct WeatherTool {
    http_client: reqwest::Client,
}

impl WeatherTool {
    pub fn new() -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("taskling/0.1")
            .build()
            .unwrap_or_default();
        Self { http_client }
    }

    async fn current(&self, location: &str) -> Result<Value, ToolError> {
        let url = format!(
            "https://wttr.in/{}?format=j1",
            urlencoding::encode(location)
        );

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ToolError::retryable(format!("weather service unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(ToolError::new(format!(
                "weather service returned {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ToolError::new(format!("invalid weather payload: {}", e)))?;

        let current = payload["current_condition"]
            .get(0)
            .ok_or_else(|| ToolError::new("weather payload missing current conditions"))?;

        Ok(json!({
            "location": if location.is_empty() { "auto" } else { location },
            "temp_c": current["temp_C"].as_str().unwrap_or("?"),
            "feels_like_c": current["FeelsLikeC"].as_str().unwrap_or("?"),
            "humidity": current["humidity"].as_str().unwrap_or("?"),
            "description": current["weatherDesc"][0]["value"].as_str().unwrap_or("?"),
        }))
    }
}

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Current weather for a location"
    }

    fn actions(&self) -> &[&str] {
        &["current"]
    }

    async fn invoke(&self, action: &str, params: &Map<String, Value>) -> Result<Value, ToolError> {
        match action {
            "current" => {
                let location = optional_str(params, "location").unwrap_or("");
                self.current(location).await
            }
            other => Err(ToolError::new(format!("unknown weather action '{}'", other))),
        }
    }
}
