//! Intent planner
//!
//! Converts a natural-language command into a plan, independent of whether
//! the text came from a user or from the response extractor. The cascade is
//! deterministic and stateless; first match wins, and the final tier always
//! produces a plan:
//!
//! 1. application-lifecycle verbs,
//! 2. pre-programmed multi-step templates,
//! 3. localized phrase tables,
//! 4. the remote planning call (response text goes through the extractor),
//! 5. coarse keyword routing,
//! 6. literal echo.

mod locales;
mod templates;

pub use locales::{LocaleTable, PhraseMatch};
pub use templates::match_template;

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agent::extractor::ResponseExtractor;
use crate::agent::plan::{MultiStepPlan, PlanStep};
use crate::agent::tool_registry::ToolRegistry;
use crate::llm::PlannerClient;

/// Planner tier that produced a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Lifecycle,
    Template,
    LocalePhrase,
    Remote,
    Keyword,
    Echo,
}

/// A plan with its provenance and advisory confidence
#[derive(Debug, Clone)]
pub struct PlannedIntent {
    pub plan: MultiStepPlan,
    pub tier: PlanTier,
    pub confidence: f64,
    pub language: Option<String>,
}

lazy_static! {
    static ref LIFECYCLE_RE: Regex = Regex::new(
        r"(?i)^\s*(?P<verb>open|launch|close|quit|focus|minimize|minimise|maximize|maximise)\s+(?P<target>.+?)\s*$"
    )
    .unwrap();
    static ref WEATHER_LOCATION_RE: Regex =
        Regex::new(r"(?i)\b(?:in|for)\s+(?P<loc>[\w][\w \-]*)\s*\??\s*$").unwrap();
    static ref MATH_EXPR_RE: Regex = Regex::new(r"[-+]?\d[\d\s.+*/()-]*").unwrap();
}

/// Intent planner over an injected registry and an optional remote client
pub struct IntentPlanner {
    registry: Arc<ToolRegistry>,
    client: Option<Arc<PlannerClient>>,
    extractor: ResponseExtractor,
    preferred_locale: Option<String>,
}

impl IntentPlanner {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            client: None,
            extractor: ResponseExtractor::new(),
            preferred_locale: None,
        }
    }

    /// Enable the remote planning tier
    pub fn with_client(mut self, client: Arc<PlannerClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Scan this locale's phrase table before the others
    pub fn with_locale(mut self, tag: impl Into<String>) -> Self {
        self.preferred_locale = Some(tag.into());
        self
    }

    /// Produce a plan for the command. Always succeeds; the literal-echo
    /// tier is the floor.
    pub async fn plan(&self, command: &str, previous_reply: Option<&str>) -> PlannedIntent {
        if let Some(intent) = self.match_lifecycle(command) {
            info!(tier = "lifecycle", "planned command");
            return intent;
        }

        if let Some(plan) = templates::match_template(command) {
            info!(tier = "template", steps = plan.len(), "planned command");
            return PlannedIntent {
                plan,
                tier: PlanTier::Template,
                confidence: 0.9,
                language: None,
            };
        }

        if let Some(hit) =
            LocaleTable::shared().match_command(command, self.preferred_locale.as_deref())
        {
            info!(tier = "locale", locale = %hit.locale, intent = %hit.intent, "planned command");
            let description = hit.step.description.clone();
            return PlannedIntent {
                plan: MultiStepPlan::single(hit.step, description),
                tier: PlanTier::LocalePhrase,
                confidence: 0.85,
                language: Some(hit.locale),
            };
        }

        if let Some(intent) = self.plan_remote(command, previous_reply).await {
            info!(tier = "remote", steps = intent.plan.len(), "planned command");
            return intent;
        }

        if let Some(intent) = self.match_keyword(command) {
            info!(tier = "keyword", "planned command");
            return intent;
        }

        info!(tier = "echo", "planned command");
        self.echo_plan(command)
    }

    /// Tier 1: fixed application-lifecycle verbs
    fn match_lifecycle(&self, command: &str) -> Option<PlannedIntent> {
        let caps = LIFECYCLE_RE.captures(command)?;
        let target = caps["target"].trim().to_string();

        // "open file notes.txt" belongs to the file tables, not app control
        let lowered = target.to_lowercase();
        for noun in ["file ", "folder ", "directory ", "the file ", "a file "] {
            if lowered.starts_with(noun) {
                return None;
            }
        }

        let verb = match caps["verb"].to_lowercase().as_str() {
            "launch" => "open".to_string(),
            "quit" => "close".to_string(),
            "minimise" => "minimize".to_string(),
            "maximise" => "maximize".to_string(),
            other => other.to_string(),
        };

        let step = PlanStep::new(format!("app_control.{}", verb))
            .with_param("target", target.clone())
            .with_description(format!("{} {}", verb, target));
        let description = step.description.clone();

        Some(PlannedIntent {
            plan: MultiStepPlan::single(step, description),
            tier: PlanTier::Lifecycle,
            confidence: 0.9,
            language: None,
        })
    }

    /// Tier 4: delegate to the remote planning call.
    ///
    /// Transport failures, timeouts, and unusable responses all fall
    /// through rather than stalling the cascade.
    async fn plan_remote(&self, command: &str, previous_reply: Option<&str>) -> Option<PlannedIntent> {
        let client = self.client.as_ref()?;

        let system = self.build_system_prompt();
        let user = match previous_reply {
            Some(reply) => format!("Previous assistant reply: {}\n\nCommand: {}", reply, command),
            None => format!("Command: {}", command),
        };

        let text = match client.complete(&system, &user).await {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "remote planning call failed, falling through");
                return None;
            }
        };

        match self.extractor.extract(&text) {
            Ok(extraction) => Some(PlannedIntent {
                plan: extraction.plan,
                tier: PlanTier::Remote,
                confidence: extraction.metadata.confidence,
                language: extraction.metadata.language,
            }),
            Err(e) => {
                debug!(error = %e, "remote response yielded no plan, falling through");
                None
            }
        }
    }

    /// Render the environment context handed to the remote planner
    fn build_system_prompt(&self) -> String {
        let mut prompt = String::from(
            "You are the planning backend for a task automation assistant. \
             Turn the user's command into tool invocations.\n\nAvailable tools:\n",
        );

        let capabilities = self.registry.capabilities();
        let mut names: Vec<&String> = capabilities.keys().collect();
        names.sort();
        for name in names {
            let spec = &capabilities[name];
            prompt.push_str(&format!(
                "- {}: {} (actions: {})\n",
                spec.name,
                spec.description,
                spec.actions.join(", ")
            ));
        }

        prompt.push_str(
            "\nRespond with JSON only, in the form:\n\
             {\"plan\": [{\"operation\": \"tool.action\", \"parameters\": {...}, \
             \"description\": \"...\"}]}\n\
             Use `tool.action` identifiers from the list above.",
        );
        prompt
    }

    /// Tier 5: coarse keyword routing, a low-confidence guess
    fn match_keyword(&self, command: &str) -> Option<PlannedIntent> {
        let lowered = command.to_lowercase();
        let contains_any =
            |words: &[&str]| words.iter().any(|w| lowered.contains(w));

        let step = if contains_any(&["cpu", "memory", "ram", "disk", "uptime", "system load"]) {
            PlanStep::new("system_info.overview").with_description("System overview")
        } else if contains_any(&["file", "folder", "directory"]) {
            PlanStep::new("file_ops.list")
                .with_param("path", ".")
                .with_description("List files")
        } else if contains_any(&["date", "time", "today", "what day"]) {
            PlanStep::new("datetime.now").with_description("Current date and time")
        } else if contains_any(&["weather", "forecast", "temperature"]) {
            let mut step = PlanStep::new("weather.current").with_description("Weather lookup");
            if let Some(caps) = WEATHER_LOCATION_RE.captures(command) {
                step = step.with_param("location", caps["loc"].trim());
            }
            step
        } else if contains_any(&["calculate", "compute", "how much is", "what is"]) {
            let expression = MATH_EXPR_RE.find(command)?.as_str().trim().to_string();
            if expression.is_empty() {
                return None;
            }
            PlanStep::new("calc.evaluate")
                .with_param("expression", expression)
                .with_description("Evaluate expression")
        } else {
            return None;
        };

        let description = step.description.clone();
        Some(PlannedIntent {
            plan: MultiStepPlan::single(step, description),
            tier: PlanTier::Keyword,
            confidence: 0.4,
            language: None,
        })
    }

    /// Tier 6: the planner must always produce a plan
    fn echo_plan(&self, command: &str) -> PlannedIntent {
        let step = PlanStep::new("respond.say")
            .with_param("text", command)
            .with_description("Echo the command back");

        PlannedIntent {
            plan: MultiStepPlan::single(step, "Literal echo"),
            tier: PlanTier::Echo,
            confidence: 0.2,
            language: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn planner() -> IntentPlanner {
        IntentPlanner::new(Arc::new(ToolRegistry::new()))
    }

    #[tokio::test]
    async fn test_lifecycle_verbs_route_to_app_control() {
        let intent = planner().plan("open firefox", None).await;
        assert_eq!(intent.tier, PlanTier::Lifecycle);
        assert_eq!(intent.plan.steps[0].action, "app_control.open");
        assert_eq!(intent.plan.steps[0].params["target"], json!("firefox"));

        let intent = planner().plan("quit spotify", None).await;
        assert_eq!(intent.plan.steps[0].action, "app_control.close");
    }

    #[tokio::test]
    async fn test_open_file_is_not_app_control() {
        let intent = planner().plan("open file notes.txt", None).await;
        assert_ne!(intent.tier, PlanTier::Lifecycle);
    }

    #[tokio::test]
    async fn test_template_beats_locale_phrase() {
        let intent = planner().plan("create and read file a.txt", None).await;
        assert_eq!(intent.tier, PlanTier::Template);
        assert_eq!(intent.plan.len(), 2);
    }

    #[tokio::test]
    async fn test_locale_phrase_tier() {
        let intent = planner().plan("șterge fișierul vechi.log", None).await;
        assert_eq!(intent.tier, PlanTier::LocalePhrase);
        assert_eq!(intent.language.as_deref(), Some("ro"));
        assert_eq!(intent.plan.steps[0].action, "file_ops.delete");
    }

    #[tokio::test]
    async fn test_keyword_router_low_confidence() {
        let intent = planner().plan("how is the weather in Berlin?", None).await;
        assert_eq!(intent.tier, PlanTier::Keyword);
        assert_eq!(intent.plan.steps[0].action, "weather.current");
        assert_eq!(intent.plan.steps[0].params["location"], json!("Berlin"));
        assert!(intent.confidence < 0.5);
    }

    #[tokio::test]
    async fn test_math_keyword_captures_expression() {
        let intent = planner().plan("calculate 12 * (3 + 4)", None).await;
        assert_eq!(intent.plan.steps[0].action, "calc.evaluate");
        assert_eq!(
            intent.plan.steps[0].params["expression"],
            json!("12 * (3 + 4)")
        );
    }

    #[tokio::test]
    async fn test_echo_is_the_floor() {
        let intent = planner().plan("mumble grumble", None).await;
        assert_eq!(intent.tier, PlanTier::Echo);
        assert_eq!(intent.plan.len(), 1);
        assert_eq!(intent.plan.steps[0].params["text"], json!("mumble grumble"));
    }

    #[tokio::test]
    async fn test_planning_is_deterministic() {
        let p = planner();
        let a = p.plan("create file x.txt", None).await;
        let b = p.plan("create file x.txt", None).await;
        assert_eq!(a.plan, b.plan);
        assert_eq!(a.tier, b.tier);
    }
}
