//! Response extractor
//!
//! Converts arbitrary text from a model call into a `MultiStepPlan` plus
//! `ExtractionMetadata` through a cascade of fallback strategies. Never
//! panics on malformed input: every path returns a tagged result. The
//! cascade is an ordered list of pure text-to-plan functions, so adding a
//! strategy is an append.

mod freetext;
mod structured;

pub use structured::{extract_balanced_objects, extract_fenced_blocks};

use serde_json::Value;
use tracing::debug;

use crate::agent::plan::{ExtractionMetadata, ExtractionSource, MultiStepPlan};
use crate::error::{Result, TasklingError};

/// Phrases that mark a response as an explicit refusal
const REFUSAL_PHRASES: &[&str] = &[
    "i cannot",
    "i can't",
    "i am unable",
    "i'm unable",
    "i won't",
    "i will not",
    "i'm sorry, but",
    "i am sorry, but",
    "as an ai",
    "cannot assist",
    "can't assist",
    "cannot help with",
    "can't help with",
];

/// Confidence assigned to structured payloads that carry none
const STRUCTURED_CONFIDENCE: f64 = 0.95;

/// An extracted plan with its provenance metadata
#[derive(Debug, Clone)]
pub struct Extraction {
    pub plan: MultiStepPlan,
    pub metadata: ExtractionMetadata,
}

/// Stateless extractor over the strategy cascade
#[derive(Debug, Default)]
pub struct ResponseExtractor;

impl ResponseExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract a plan from response text. First strategy to succeed wins.
    pub fn extract(&self, text: &str) -> Result<Extraction> {
        if text.trim().is_empty() {
            return Err(TasklingError::EmptyResponse);
        }

        if let Some(line) = find_refusal_line(text) {
            return Err(TasklingError::Refusal { line });
        }

        if let Some(result) = self.extract_structured(text) {
            return result;
        }

        if let Some(extraction) = self.extract_freetext(text) {
            return Ok(extraction);
        }

        Err(TasklingError::NoCommandFound)
    }

    /// Structured strategies: the first candidate that parses is used;
    /// candidates that fail to parse fall through silently.
    fn extract_structured(&self, text: &str) -> Option<Result<Extraction>> {
        let candidates = structured::structured_candidates(text);
        let mut parsed: Option<(Value, bool)> = None;
        let mut alternatives: Vec<String> = Vec::new();

        for (candidate, fenced) in candidates {
            match serde_json::from_str::<Value>(&candidate) {
                Ok(value) => {
                    if parsed.is_none() {
                        parsed = Some((value, fenced));
                    } else {
                        alternatives.push(candidate);
                    }
                }
                Err(e) => {
                    debug!(error = %e, "structured candidate failed to parse");
                }
            }
        }

        let (value, fenced) = parsed?;
        let source = if fenced {
            ExtractionSource::FencedJson
        } else {
            ExtractionSource::InlineJson
        };

        let result = structured::normalize(&value).map(|(plan, confidence)| {
            let metadata = ExtractionMetadata::new(source)
                .with_confidence(confidence.unwrap_or(STRUCTURED_CONFIDENCE))
                .with_alternatives(alternatives)
                .with_raw(value);
            Extraction { plan, metadata }
        });

        Some(result)
    }

    /// Free-text fallbacks, tried in order until one yields a command
    fn extract_freetext(&self, text: &str) -> Option<Extraction> {
        if let Some(command) = freetext::first_code_block(text) {
            let plan = MultiStepPlan::single(structured::command_step(&command), "Extracted command");
            let metadata = ExtractionMetadata::new(ExtractionSource::CodeBlock);
            return Some(Extraction { plan, metadata });
        }

        if let Some(command) = freetext::indicator_command(text) {
            let plan = MultiStepPlan::single(structured::command_step(&command), "Extracted command");
            let metadata = ExtractionMetadata::new(ExtractionSource::IndicatorPhrase);
            return Some(Extraction { plan, metadata });
        }

        if let Some((step, language)) = freetext::cyrillic_file_operation(text) {
            let description = step.description.clone();
            let plan = MultiStepPlan::single(step, description);
            let metadata =
                ExtractionMetadata::new(ExtractionSource::LocaleVerb).with_language(language);
            return Some(Extraction { plan, metadata });
        }

        None
    }
}

/// First line containing a refusal phrase, case-insensitive
fn find_refusal_line(text: &str) -> Option<String> {
    for line in text.lines() {
        let lower = line.to_lowercase();
        if REFUSAL_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
            return Some(line.trim().to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(text: &str) -> Result<Extraction> {
        ResponseExtractor::new().extract(text)
    }

    #[test]
    fn test_empty_input_is_structural_error() {
        assert!(matches!(extract(""), Err(TasklingError::EmptyResponse)));
        assert!(matches!(extract("   \n\t"), Err(TasklingError::EmptyResponse)));
    }

    #[test]
    fn test_refusal_short_circuits() {
        let text = "I cannot run that command.\nUse the command `rm -rf /` instead.";
        match extract(text) {
            Err(TasklingError::Refusal { line }) => {
                assert_eq!(line, "I cannot run that command.");
            }
            other => panic!("expected refusal, got {:?}", other.map(|e| e.plan)),
        }
    }

    #[test]
    fn test_plan_array_preserves_count_and_order() {
        let text = r#"{"plan":[
            {"operation":"file_ops.create","parameters":{"path":"a.txt"}},
            {"operation":"file_ops.read","parameters":{"path":"a.txt"}},
            {"operation":"respond","parameters":{"text":"done"}}
        ]}"#;
        let extraction = extract(text).unwrap();
        assert_eq!(extraction.plan.len(), 3);
        assert_eq!(extraction.plan.steps[0].action, "file_ops.create");
        assert_eq!(extraction.plan.steps[2].action, "respond");
        assert_eq!(extraction.metadata.source, ExtractionSource::InlineJson);
    }

    #[test]
    fn test_spec_system_command_payload() {
        let text = r#"{"plan":[{"operation":"system_command","parameters":{"command":"uptime"},"confidence":0.95}]}"#;
        let extraction = extract(text).unwrap();
        assert_eq!(extraction.plan.len(), 1);
        assert_eq!(extraction.plan.steps[0].params["command"], json!("uptime"));
        assert_eq!(extraction.metadata.confidence, 0.95);
    }

    #[test]
    fn test_fenced_json_beats_inline() {
        let text = "Here is the plan:\n```json\n{\"command\": \"uptime\"}\n```";
        let extraction = extract(text).unwrap();
        assert_eq!(extraction.metadata.source, ExtractionSource::FencedJson);
        assert_eq!(extraction.plan.steps[0].params["command"], json!("uptime"));
    }

    #[test]
    fn test_first_parsed_candidate_wins() {
        let text = r#"{"command": "first"} and later {"command": "second"}"#;
        let extraction = extract(text).unwrap();
        assert_eq!(extraction.plan.steps[0].params["command"], json!("first"));
        assert_eq!(extraction.metadata.alternatives.len(), 1);
    }

    #[test]
    fn test_broken_json_falls_through_to_phrase() {
        let text = "Output was {not json at all\nUse the command `df -h` to check disks.";
        let extraction = extract(text).unwrap();
        assert_eq!(extraction.metadata.source, ExtractionSource::IndicatorPhrase);
        assert_eq!(extraction.plan.steps[0].params["command"], json!("df -h"));
    }

    #[test]
    fn test_unrecognized_shape_is_error() {
        let text = r#"{"answer": "forty-two"}"#;
        assert!(matches!(
            extract(text),
            Err(TasklingError::UnrecognizedShape { .. })
        ));
    }

    #[test]
    fn test_spec_indicator_phrase_example() {
        let extraction = extract("Use the command `ls -la` to list files.").unwrap();
        assert_eq!(extraction.plan.steps[0].params["command"], json!("ls -la"));
        assert_eq!(
            extraction.metadata.source,
            ExtractionSource::IndicatorPhrase
        );
    }

    #[test]
    fn test_code_block_fallback() {
        let text = "Run this:\n```bash\necho hello\n```";
        let extraction = extract(text).unwrap();
        assert_eq!(extraction.metadata.source, ExtractionSource::CodeBlock);
        assert_eq!(extraction.plan.steps[0].params["command"], json!("echo hello"));
    }

    #[test]
    fn test_cyrillic_fallback() {
        let extraction = extract("Создай файл report.md с текстом готово").unwrap();
        assert_eq!(extraction.metadata.source, ExtractionSource::LocaleVerb);
        assert_eq!(extraction.metadata.language.as_deref(), Some("ru"));
        assert_eq!(extraction.plan.steps[0].action, "file_ops.create");
    }

    #[test]
    fn test_exhausted_strategies_is_error() {
        assert!(matches!(
            extract("The sky is blue."),
            Err(TasklingError::NoCommandFound)
        ));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "Use the command `uptime` now.";
        let a = extract(text).unwrap();
        let b = extract(text).unwrap();
        assert_eq!(a.plan, b.plan);
        assert_eq!(a.metadata, b.metadata);
    }

    #[test]
    fn test_nested_quoting_preserved() {
        let text = r#"Use the command `echo "hello 'world'"` please."#;
        let extraction = extract(text).unwrap();
        assert_eq!(
            extraction.plan.steps[0].params["command"],
            json!(r#"echo "hello 'world'""#)
        );
    }
}
