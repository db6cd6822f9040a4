//! Agent pipeline
//!
//! Wires the intent planner, execution engine, tool registry and memory
//! into one entry point: utterance in, reply out. Each `Agent` owns one
//! session; independent sessions run independent agents over a shared
//! registry.

pub mod executor;
pub mod extractor;
pub mod memory;
pub mod plan;
pub mod planner;
pub mod tool;
pub mod tool_registry;
pub mod tools;

pub use executor::{ExecutionEngine, ExecutionMode, ExecutionReport};
pub use extractor::{Extraction, ResponseExtractor};
pub use memory::{AgentMemory, StepOutcome};
pub use plan::{ExtractionMetadata, ExtractionSource, MultiStepPlan, PlanStep, StepCondition};
pub use planner::{IntentPlanner, PlanTier, PlannedIntent};
pub use tool::{Tool, ToolError, ToolSpec};
pub use tool_registry::ToolRegistry;

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::llm::PlannerClient;

/// The assistant's answer to one command
#[derive(Debug, Clone)]
pub struct AgentReply {
    /// Rendered text for the user
    pub text: String,
    /// Planner tier that produced the executed plan
    pub tier: PlanTier,
    /// Description of the executed plan
    pub plan_description: String,
    /// Whether the plan's final step succeeded
    pub succeeded: bool,
}

/// One conversational session over the pipeline
pub struct Agent {
    planner: IntentPlanner,
    engine: ExecutionEngine,
}

impl Agent {
    /// Create an agent over an existing registry, without a remote planner
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            planner: IntentPlanner::new(registry.clone()),
            engine: ExecutionEngine::new(registry),
        }
    }

    /// Create a fully wired agent from configuration: default tool set,
    /// remote planner when enabled, locale preference, memory cap and
    /// failure mode.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = if config.planner.enabled {
            Some(Arc::new(PlannerClient::new(config.planner.clone())?))
        } else {
            None
        };

        let registry = Arc::new(tools::default_registry(client.clone()));

        let mut planner = IntentPlanner::new(registry.clone());
        if let Some(client) = client {
            planner = planner.with_client(client);
        }
        if let Some(locale) = &config.agent.locale {
            planner = planner.with_locale(locale.clone());
        }

        let mode = if config.agent.fail_fast {
            ExecutionMode::FailFast
        } else {
            ExecutionMode::ContinueOnError
        };
        let engine = ExecutionEngine::new(registry)
            .with_memory(AgentMemory::with_cap(config.agent.conversation_cap))
            .with_mode(mode);

        Ok(Self { planner, engine })
    }

    pub fn memory(&self) -> &AgentMemory {
        self.engine.memory()
    }

    /// Handle one command: plan, execute, record the conversational turn.
    pub async fn handle(&mut self, command: &str) -> Result<AgentReply> {
        let previous_reply = self
            .engine
            .memory()
            .last_agent_reply()
            .map(|s| s.to_string());

        let intent = self.planner.plan(command, previous_reply.as_deref()).await;
        info!(
            tier = ?intent.tier,
            confidence = intent.confidence,
            steps = intent.plan.len(),
            "executing planned intent"
        );

        let report = self.engine.execute(&intent.plan, command).await;
        let text = render_outcome(&report.result);

        self.engine.memory_mut().record_turn(command, &text);

        Ok(AgentReply {
            text,
            tier: intent.tier,
            plan_description: report.plan_description.clone(),
            succeeded: report.succeeded(),
        })
    }
}

/// Render a step outcome as user-facing text
fn render_outcome(outcome: &StepOutcome) -> String {
    match outcome {
        StepOutcome::Success(Value::String(text)) => text.clone(),
        StepOutcome::Success(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        StepOutcome::Skipped(reason) => format!("(skipped: {})", reason),
        StepOutcome::Failed(message) => message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_echoes_unknown_commands() {
        let registry = Arc::new(tools::default_registry(None));
        let mut agent = Agent::new(registry);

        let reply = agent.handle("mumble grumble").await.unwrap();
        assert_eq!(reply.tier, PlanTier::Echo);
        assert_eq!(reply.text, "mumble grumble");
        assert!(reply.succeeded);
    }

    #[tokio::test]
    async fn test_handle_records_conversation() {
        let registry = Arc::new(tools::default_registry(None));
        let mut agent = Agent::new(registry);

        agent.handle("hello there").await.unwrap();
        assert_eq!(agent.memory().conversation.len(), 1);
        assert_eq!(agent.memory().last_agent_reply(), Some("hello there"));
    }

    #[tokio::test]
    async fn test_from_config_defaults() {
        let agent = Agent::from_config(&Config::default()).unwrap();
        assert_eq!(agent.memory().conversation_cap(), 20);
    }
}
