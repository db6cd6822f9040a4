//! Planner client
//!
//! Thin HTTP client for an OpenAI-compatible chat endpoint with a bounded
//! wait. Timeouts and transport failures are reported as recoverable
//! `Transport` errors so the caller can fall through to local planner
//! tiers instead of stalling.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as HttpClient, StatusCode};
use tracing::debug;

use super::chat::{ChatMessage, ChatRequest, ChatResponse};
use crate::config::PlannerConfig;
use crate::error::{Result, TasklingError};
use crate::util::{sanitize_base_url, validate_api_key};

/// Client for the remote planning endpoint
pub struct PlannerClient {
    config: PlannerConfig,
    base_url: String,
    http_client: HttpClient,
}

impl PlannerClient {
    /// Create a new planner client with the configured bounded timeout
    pub fn new(config: PlannerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(api_key) = &config.api_key {
            let key = validate_api_key(api_key)?;
            let value = format!("Bearer {}", key);
            let header = HeaderValue::from_str(&value).map_err(|_| {
                TasklingError::InvalidConfig {
                    message: "API key is not a valid header value".to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, header);
        }

        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent("taskling/0.1")
            .default_headers(headers)
            .build()
            .map_err(|e| TasklingError::Transport {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        let base_url = sanitize_base_url(&config.base_url);

        Ok(Self {
            config,
            base_url,
            http_client,
        })
    }

    /// The configured model identifier
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a system+user prompt and return the raw response text.
    ///
    /// The response is free text that may or may not embed structured data;
    /// interpreting it is the response extractor's job.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest::new(
            self.config.model.clone(),
            vec![ChatMessage::system(system), ChatMessage::user(user)],
        )
        .with_temperature(0.2);

        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.config.model, %url, "sending planner request");

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TasklingError::Transport {
                message: format!("planner request failed: {}", e),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(TasklingError::Transport {
                message: format!(
                    "planner endpoint returned {}: {}",
                    status,
                    body.chars().take(200).collect::<String>()
                ),
            });
        }

        let parsed: ChatResponse =
            response.json().await.map_err(|e| TasklingError::Transport {
                message: format!("invalid planner payload: {}", e),
            })?;

        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "planner usage"
            );
        }

        parsed
            .first_content()
            .map(|s| s.to_string())
            .ok_or_else(|| TasklingError::Transport {
                message: "planner response contained no choices".to_string(),
            })
    }
}
