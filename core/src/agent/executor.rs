//! Execution engine
//!
//! Walks a `MultiStepPlan`, resolving each step in the tool registry and
//! recording exactly one memory entry per attempted step. Failures are
//! local: a failed or unresolved step does not abort the remaining steps,
//! favoring partial progress over atomic rollback. Steps run strictly
//! sequentially because later conditions may read context written by
//! earlier steps.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::agent::memory::{AgentMemory, StepOutcome};
use crate::agent::plan::{MultiStepPlan, PlanStep};
use crate::agent::tool_registry::ToolRegistry;
use crate::error::TasklingError;

/// Step-failure policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Record the failure and continue with subsequent steps
    #[default]
    ContinueOnError,
    /// Abort the remaining steps after the first failure
    FailFast,
}

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Executing(usize),
    Done,
}

/// Outcome of one attempted step within a report
#[derive(Debug, Clone)]
pub struct StepResult {
    pub index: usize,
    pub action: String,
    pub outcome: StepOutcome,
}

/// Aggregate result of executing a plan.
///
/// The overall result is the last attempted step's outcome, not an
/// aggregate of all of them.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub plan_description: String,
    pub steps: Vec<StepResult>,
    pub result: StepOutcome,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> bool {
        self.result.is_success()
    }

    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.is_failure()).count()
    }

    pub fn skipped_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Skipped(_)))
            .count()
    }
}

/// Executes plans against an injected tool registry, owning one session's
/// memory. Independent sessions run independent engine instances; the
/// registry is the only shared state.
pub struct ExecutionEngine {
    registry: Arc<ToolRegistry>,
    memory: AgentMemory,
    mode: ExecutionMode,
    state: EngineState,
}

impl ExecutionEngine {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            memory: AgentMemory::new(),
            mode: ExecutionMode::default(),
            state: EngineState::Idle,
        }
    }

    pub fn with_memory(mut self, memory: AgentMemory) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn memory(&self) -> &AgentMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut AgentMemory {
        &mut self.memory
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Execute a plan derived from `command`, updating memory after every
    /// attempted step.
    pub async fn execute(&mut self, plan: &MultiStepPlan, command: &str) -> ExecutionReport {
        if plan.is_empty() {
            warn!("refusing to execute empty plan");
            self.state = EngineState::Done;
            return ExecutionReport {
                plan_description: plan.description.clone(),
                steps: Vec::new(),
                result: StepOutcome::Failed("plan contained no steps".to_string()),
            };
        }

        info!(steps = plan.len(), description = %plan.description, "executing plan");
        let mut results: Vec<StepResult> = Vec::with_capacity(plan.len());

        for (index, step) in plan.steps.iter().enumerate() {
            self.state = EngineState::Executing(index);

            let outcome = self.execute_step(index, step).await;
            self.memory
                .record_step(command, &step.action, &step.params, outcome.clone());

            let failed = outcome.is_failure();
            results.push(StepResult {
                index,
                action: step.action.clone(),
                outcome,
            });

            if failed && self.mode == ExecutionMode::FailFast {
                warn!(step = index, "aborting remaining steps");
                break;
            }
        }

        self.state = EngineState::Done;

        let result = results
            .last()
            .map(|s| s.outcome.clone())
            .unwrap_or_else(|| StepOutcome::Failed("plan contained no steps".to_string()));

        ExecutionReport {
            plan_description: plan.description.clone(),
            steps: results,
            result,
        }
    }

    async fn execute_step(&mut self, index: usize, step: &PlanStep) -> StepOutcome {
        if let Some(condition) = &step.condition {
            if !condition.evaluate(&self.memory.context) {
                debug!(step = index, key = %condition.key, "condition not met, skipping");
                return StepOutcome::Skipped(format!(
                    "condition on '{}' not met",
                    condition.key
                ));
            }
        }

        let tool_name = step.tool_name();
        let tool = match self.registry.get(tool_name) {
            Some(tool) => tool,
            None => {
                let err = TasklingError::ToolNotFound {
                    tool_name: tool_name.to_string(),
                };
                warn!(step = index, tool = tool_name, "unresolved tool");
                return StepOutcome::Failed(err.to_string());
            }
        };

        let action = step
            .operation()
            .map(|op| op.to_string())
            .or_else(|| tool.actions().first().map(|a| a.to_string()))
            .unwrap_or_default();

        debug!(step = index, tool = tool_name, action = %action, "invoking tool");
        match tool.invoke(&action, &step.params).await {
            Ok(value) => {
                self.memory.set_context("last_result", value.clone());
                self.memory
                    .set_context(format!("step_{}_result", index), value.clone());
                StepOutcome::Success(value)
            }
            Err(e) => {
                let err = TasklingError::ToolExecutionFailed {
                    tool_name: tool_name.to_string(),
                    message: e.message.clone(),
                };
                warn!(step = index, tool = tool_name, error = %e, "tool failed");
                StepOutcome::Failed(err.to_string())
            }
        }
    }
}
