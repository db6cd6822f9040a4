//! Plan model - the contract between every plan producer and the executor
//!
//! Rule matching, remote planning, and response extraction all converge on
//! `MultiStepPlan`, so the execution engine never branches on provenance.
//! Plans are immutable value types created per request and discarded once
//! executed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One tool invocation within a plan.
///
/// The action identifier resolves in the tool registry. A dotted form
/// selects an operation within the tool (`"file_ops.create"`); a bare name
/// (`"system_command"`) uses the tool's default operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    /// Action identifier: registry tool name, optionally `.operation` suffixed
    #[serde(alias = "operation", alias = "tool")]
    pub action: String,

    /// Parameter mapping passed to the tool
    #[serde(default, alias = "parameters")]
    pub params: Map<String, Value>,

    /// Human-readable description of the step
    #[serde(default)]
    pub description: String,

    /// Tool capabilities this step depends on, beyond its own action
    #[serde(default)]
    pub required_tools: Vec<String>,

    /// What the step is expected to produce, if known
    #[serde(default)]
    pub expected_result: Option<String>,

    /// Optional precondition evaluated against accumulated context
    #[serde(default)]
    pub condition: Option<StepCondition>,
}

impl PlanStep {
    /// Create a step for the given action identifier
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: Map::new(),
            description: String::new(),
            required_tools: Vec::new(),
            expected_result: None,
            condition: None,
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the expected result
    pub fn with_expected_result(mut self, expected: impl Into<String>) -> Self {
        self.expected_result = Some(expected.into());
        self
    }

    /// Set the precondition
    pub fn with_condition(mut self, condition: StepCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// The registry tool name (the part before any `.` operation suffix)
    pub fn tool_name(&self) -> &str {
        self.action.split('.').next().unwrap_or(&self.action)
    }

    /// The operation within the tool, when the action carries one
    pub fn operation(&self) -> Option<&str> {
        self.action.split_once('.').map(|(_, op)| op)
    }
}

/// Ordered sequence of plan steps with aggregate metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiStepPlan {
    pub steps: Vec<PlanStep>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_tools: Vec<String>,
    #[serde(default)]
    pub expected_result: Option<String>,
}

impl MultiStepPlan {
    /// Create a plan from steps, computing the aggregate required-tools set
    pub fn new(steps: Vec<PlanStep>, description: impl Into<String>) -> Self {
        let mut required_tools: Vec<String> = Vec::new();
        for step in &steps {
            let tool = step.tool_name().to_string();
            if !required_tools.contains(&tool) {
                required_tools.push(tool);
            }
            for extra in &step.required_tools {
                if !required_tools.contains(extra) {
                    required_tools.push(extra.clone());
                }
            }
        }

        Self {
            steps,
            description: description.into(),
            required_tools,
            expected_result: None,
        }
    }

    /// Create a one-step plan
    pub fn single(step: PlanStep, description: impl Into<String>) -> Self {
        Self::new(vec![step], description)
    }

    /// Set the expected result
    pub fn with_expected_result(mut self, expected: impl Into<String>) -> Self {
        self.expected_result = Some(expected.into());
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Comparison applied by a step precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOp {
    Exists,
    NotExists,
    Equals,
    Contains,
}

/// Data predicate over the accumulated context map.
///
/// Evaluated by the execution engine before a step runs; false skips the
/// step without invoking its tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCondition {
    pub key: String,
    pub op: ConditionOp,
    #[serde(default)]
    pub value: Option<Value>,
}

impl StepCondition {
    pub fn exists(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            op: ConditionOp::Exists,
            value: None,
        }
    }

    pub fn not_exists(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            op: ConditionOp::NotExists,
            value: None,
        }
    }

    pub fn equals(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            op: ConditionOp::Equals,
            value: Some(value.into()),
        }
    }

    pub fn contains(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            op: ConditionOp::Contains,
            value: Some(value.into()),
        }
    }

    /// Evaluate against the context map
    pub fn evaluate(&self, context: &Map<String, Value>) -> bool {
        let current = context.get(&self.key);
        match self.op {
            ConditionOp::Exists => current.is_some(),
            ConditionOp::NotExists => current.is_none(),
            ConditionOp::Equals => match (current, &self.value) {
                (Some(found), Some(expected)) => found == expected,
                _ => false,
            },
            ConditionOp::Contains => match (current, &self.value) {
                (Some(Value::String(s)), Some(Value::String(needle))) => s.contains(needle),
                (Some(Value::Array(items)), Some(expected)) => items.contains(expected),
                _ => false,
            },
        }
    }
}

/// Strategy that produced an extracted plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    /// A ```json fenced block parsed into a plan shape
    FencedJson,
    /// A brace-balanced object found in raw text
    InlineJson,
    /// First fenced code block taken as a literal command
    CodeBlock,
    /// Command following an indicator phrase ("use the command ...")
    IndicatorPhrase,
    /// Locale verb matching synthesized a canonical file operation
    LocaleVerb,
}

impl std::fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionSource::FencedJson => write!(f, "fenced_json"),
            ExtractionSource::InlineJson => write!(f, "inline_json"),
            ExtractionSource::CodeBlock => write!(f, "code_block"),
            ExtractionSource::IndicatorPhrase => write!(f, "indicator_phrase"),
            ExtractionSource::LocaleVerb => write!(f, "locale_verb"),
        }
    }
}

/// Metadata describing how a plan was extracted from response text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Strategy that produced the plan
    pub source: ExtractionSource,
    /// Advisory confidence in [0, 1]
    pub confidence: f64,
    /// Non-fatal problem encountered while extracting
    #[serde(default)]
    pub error: Option<String>,
    /// Detected language tag, when a localized strategy matched
    #[serde(default)]
    pub language: Option<String>,
    /// Other structured candidates that were present but not used
    #[serde(default)]
    pub alternatives: Vec<String>,
    /// Raw parsed payload, when a structured strategy matched
    #[serde(default)]
    pub raw: Option<Value>,
}

impl ExtractionMetadata {
    /// Default confidence when the source payload provides none
    pub const DEFAULT_CONFIDENCE: f64 = 0.9;

    pub fn new(source: ExtractionSource) -> Self {
        Self {
            source,
            confidence: Self::DEFAULT_CONFIDENCE,
            error: None,
            language: None,
            alternatives: Vec::new(),
            raw: None,
        }
    }

    /// Set confidence, clamped to [0, 1]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_alternatives(mut self, alternatives: Vec<String>) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_action_parts() {
        let step = PlanStep::new("file_ops.create");
        assert_eq!(step.tool_name(), "file_ops");
        assert_eq!(step.operation(), Some("create"));

        let bare = PlanStep::new("system_command");
        assert_eq!(bare.tool_name(), "system_command");
        assert_eq!(bare.operation(), None);
    }

    #[test]
    fn test_plan_aggregates_required_tools() {
        let plan = MultiStepPlan::new(
            vec![
                PlanStep::new("file_ops.create"),
                PlanStep::new("file_ops.read"),
                PlanStep::new("respond"),
            ],
            "create then read",
        );
        assert_eq!(plan.required_tools, vec!["file_ops", "respond"]);
    }

    #[test]
    fn test_step_deserializes_operation_alias() {
        let step: PlanStep = serde_json::from_value(json!({
            "operation": "system_command",
            "parameters": {"command": "uptime"}
        }))
        .unwrap();
        assert_eq!(step.action, "system_command");
        assert_eq!(step.params.get("command"), Some(&json!("uptime")));
    }

    #[test]
    fn test_condition_evaluation() {
        let mut context = Map::new();
        context.insert("last_result".to_string(), json!("file created"));

        assert!(StepCondition::exists("last_result").evaluate(&context));
        assert!(!StepCondition::exists("missing").evaluate(&context));
        assert!(StepCondition::not_exists("missing").evaluate(&context));
        assert!(StepCondition::equals("last_result", "file created").evaluate(&context));
        assert!(!StepCondition::equals("last_result", "other").evaluate(&context));
        assert!(StepCondition::contains("last_result", "created").evaluate(&context));
    }

    #[test]
    fn test_confidence_is_clamped() {
        let meta = ExtractionMetadata::new(ExtractionSource::FencedJson).with_confidence(1.7);
        assert_eq!(meta.confidence, 1.0);
    }
}
