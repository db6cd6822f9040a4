//! End-to-end pipeline tests: text extraction through plan execution

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use taskling_core::agent::{
    tools, Agent, ExecutionEngine, PlanTier, ResponseExtractor, StepOutcome, Tool, ToolError,
    ToolRegistry,
};
use taskling_core::TasklingError;

struct CountingTool {
    name: &'static str,
    calls: Arc<Mutex<usize>>,
}

#[async_trait]
impl Tool for CountingTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "counts invocations"
    }

    fn actions(&self) -> &[&str] {
        &["run"]
    }

    async fn invoke(&self, _action: &str, params: &Map<String, Value>) -> Result<Value, ToolError> {
        *self.calls.lock() += 1;
        Ok(params
            .get("value")
            .cloned()
            .unwrap_or_else(|| json!("done")))
    }
}

#[tokio::test]
async fn extracted_plan_runs_through_engine() {
    let calls = Arc::new(Mutex::new(0));
    let registry = Arc::new(ToolRegistry::new());
    registry.register(Arc::new(CountingTool {
        name: "probe",
        calls: calls.clone(),
    }));

    let text = r#"{"plan":[
        {"operation":"probe","parameters":{"value":1}},
        {"operation":"probe","parameters":{"value":2},
         "condition":{"key":"never_set","op":"exists"}},
        {"operation":"probe","parameters":{"value":3}}
    ]}"#;

    let extraction = ResponseExtractor::new().extract(text).unwrap();
    assert_eq!(extraction.plan.len(), 3);

    let mut engine = ExecutionEngine::new(registry);
    let report = engine.execute(&extraction.plan, "probe three times").await;

    // one memory record per attempted step, skipped included
    assert_eq!(engine.memory().steps.len(), 3);
    assert!(matches!(report.steps[1].outcome, StepOutcome::Skipped(_)));
    assert_eq!(*calls.lock(), 2);
    // overall result is the last step's outcome
    assert_eq!(report.result, StepOutcome::Success(json!(3)));
}

#[tokio::test]
async fn unregistered_tool_yields_tool_not_found_result() {
    let registry = Arc::new(ToolRegistry::new());
    let extraction = ResponseExtractor::new()
        .extract(r#"{"plan":[{"operation":"missing_tool","parameters":{}}]}"#)
        .unwrap();

    let mut engine = ExecutionEngine::new(registry);
    let report = engine.execute(&extraction.plan, "call the void").await;

    assert!(!report.succeeded());
    match &report.result {
        StepOutcome::Failed(message) => assert!(message.contains("tool not found")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn re_registration_last_wins_end_to_end() {
    let first_calls = Arc::new(Mutex::new(0));
    let second_calls = Arc::new(Mutex::new(0));

    let registry = Arc::new(ToolRegistry::new());
    registry.register(Arc::new(CountingTool {
        name: "probe",
        calls: first_calls.clone(),
    }));
    registry.register(Arc::new(CountingTool {
        name: "probe",
        calls: second_calls.clone(),
    }));

    let extraction = ResponseExtractor::new()
        .extract(r#"{"plan":[{"operation":"probe","parameters":{}}]}"#)
        .unwrap();
    let mut engine = ExecutionEngine::new(registry);
    engine.execute(&extraction.plan, "probe").await;

    assert_eq!(*first_calls.lock(), 0);
    assert_eq!(*second_calls.lock(), 1);
}

#[tokio::test]
async fn spec_fixture_uptime_payload() {
    let text = r#"{"plan":[{"operation":"system_command","parameters":{"command":"uptime"},"confidence":0.95}]}"#;
    let extraction = ResponseExtractor::new().extract(text).unwrap();

    assert_eq!(extraction.plan.len(), 1);
    assert_eq!(
        extraction.plan.steps[0].params.get("command"),
        Some(&json!("uptime"))
    );
}

#[tokio::test]
async fn spec_fixture_phrase_extraction() {
    let extraction = ResponseExtractor::new()
        .extract("Use the command `ls -la` to list files.")
        .unwrap();
    assert_eq!(
        extraction.plan.steps[0].params.get("command"),
        Some(&json!("ls -la"))
    );
}

#[tokio::test]
async fn spec_fixture_empty_response() {
    let result = ResponseExtractor::new().extract("");
    assert!(matches!(result, Err(TasklingError::EmptyResponse)));
}

#[tokio::test]
async fn cross_language_commands_converge() {
    let registry = Arc::new(tools::default_registry(None));
    let phrasings = [
        "delete file ghost.txt",
        "șterge fișierul ghost.txt",
        "borra el archivo ghost.txt",
        "supprime le fichier ghost.txt",
        "lösche die Datei ghost.txt",
        "удали файл ghost.txt",
    ];

    for phrase in phrasings {
        let planner = taskling_core::agent::IntentPlanner::new(registry.clone());
        let intent = planner.plan(phrase, None).await;
        assert_eq!(intent.tier, PlanTier::LocalePhrase, "phrase: {}", phrase);
        assert_eq!(
            intent.plan.steps[0].action, "file_ops.delete",
            "phrase: {}",
            phrase
        );
        assert_eq!(
            intent.plan.steps[0].params.get("path"),
            Some(&json!("ghost.txt")),
            "phrase: {}",
            phrase
        );
    }
}

#[tokio::test]
async fn template_command_round_trips_through_filesystem() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("pipeline.txt");
    let command = format!(
        "create and read file {} with content it works",
        path.to_str().unwrap()
    );

    let registry = Arc::new(tools::default_registry(None));
    let mut agent = Agent::new(registry);
    let reply = agent.handle(&command).await.unwrap();

    assert_eq!(reply.tier, PlanTier::Template);
    assert!(reply.succeeded);
    assert_eq!(reply.text, "it works");
    // both steps recorded, conversation turn stored
    assert_eq!(agent.memory().steps.len(), 2);
    assert_eq!(agent.memory().conversation.len(), 1);
}

#[tokio::test]
async fn failed_step_keeps_session_responsive() {
    let registry = Arc::new(tools::default_registry(None));
    let mut agent = Agent::new(registry);

    let reply = agent.handle("read file /no/such/file.txt").await.unwrap();
    assert!(!reply.succeeded);

    // the next command still goes through
    let reply = agent.handle("just echo this back").await.unwrap();
    assert!(reply.succeeded);
    assert_eq!(reply.tier, PlanTier::Echo);
}
