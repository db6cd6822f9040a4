//! Agent memory
//!
//! Session-lifetime record of what the engine has done: an append-only log
//! of attempted steps, a free-form context map mutated as steps run, and a
//! FIFO-capped conversation transcript. Owned by exactly one execution
//! engine instance; a surrounding layer may serialize it, the core keeps it
//! in-process only.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Default cap on retained conversation turns
pub const DEFAULT_CONVERSATION_CAP: usize = 20;

/// Outcome of one attempted plan step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The tool ran and returned a value
    Success(Value),
    /// The step's condition evaluated false; no tool was invoked
    Skipped(String),
    /// The step failed (unresolved tool or tool error)
    Failed(String),
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

/// One entry in the append-only step log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Source command text the plan was derived from
    pub command: String,
    /// Action identifier of the step
    pub action: String,
    pub params: Map<String, Value>,
    pub outcome: StepOutcome,
}

/// One user/agent turn pair in the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user: String,
    pub agent: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-session memory owned by an execution engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMemory {
    pub session_id: Uuid,
    /// Append-only log of attempted steps
    pub steps: Vec<StepRecord>,
    /// Free-form context mutated by steps, read by condition predicates
    pub context: Map<String, Value>,
    /// Bounded transcript, oldest turns evicted first
    pub conversation: VecDeque<ConversationTurn>,
    conversation_cap: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentMemory {
    pub fn new() -> Self {
        Self::with_cap(DEFAULT_CONVERSATION_CAP)
    }

    /// Create with a custom transcript cap (minimum 1)
    pub fn with_cap(conversation_cap: usize) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            steps: Vec::new(),
            context: Map::new(),
            conversation: VecDeque::new(),
            conversation_cap: conversation_cap.max(1),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a step record
    pub fn record_step(
        &mut self,
        command: &str,
        action: &str,
        params: &Map<String, Value>,
        outcome: StepOutcome,
    ) {
        self.steps.push(StepRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            command: command.to_string(),
            action: action.to_string(),
            params: params.clone(),
            outcome,
        });
        self.touch();
    }

    /// Write a context entry
    pub fn set_context(&mut self, key: impl Into<String>, value: Value) {
        self.context.insert(key.into(), value);
        self.touch();
    }

    /// Append a conversational turn, evicting the oldest beyond the cap
    pub fn record_turn(&mut self, user: impl Into<String>, agent: impl Into<String>) {
        if self.conversation.len() == self.conversation_cap {
            self.conversation.pop_front();
        }
        self.conversation.push_back(ConversationTurn {
            user: user.into(),
            agent: agent.into(),
            timestamp: Utc::now(),
        });
        self.touch();
    }

    /// The previous assistant utterance, for localized multi-turn phrasing
    pub fn last_agent_reply(&self) -> Option<&str> {
        self.conversation.back().map(|turn| turn.agent.as_str())
    }

    pub fn conversation_cap(&self) -> usize {
        self.conversation_cap
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for AgentMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conversation_cap_evicts_oldest() {
        let mut memory = AgentMemory::with_cap(3);
        for i in 0..5 {
            memory.record_turn(format!("user {}", i), format!("agent {}", i));
        }

        assert_eq!(memory.conversation.len(), 3);
        assert_eq!(memory.conversation.front().unwrap().user, "user 2");
        assert_eq!(memory.last_agent_reply(), Some("agent 4"));
    }

    #[test]
    fn test_record_step_appends() {
        let mut memory = AgentMemory::new();
        let params = Map::new();
        memory.record_step("list files", "file_ops.list", &params, StepOutcome::Success(json!("ok")));
        memory.record_step(
            "list files",
            "file_ops.list",
            &params,
            StepOutcome::Failed("boom".to_string()),
        );

        assert_eq!(memory.steps.len(), 2);
        assert!(memory.steps[0].outcome.is_success());
        assert!(memory.steps[1].outcome.is_failure());
    }

    #[test]
    fn test_context_roundtrip() {
        let mut memory = AgentMemory::new();
        memory.set_context("last_result", json!({"path": "notes.txt"}));
        assert!(memory.context.contains_key("last_result"));
    }
}
