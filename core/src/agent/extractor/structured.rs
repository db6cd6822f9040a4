//! Structured-data extraction
//!
//! Finds JSON candidates in response text (fenced blocks first, then
//! brace-balanced scanning of raw text) and normalizes a parsed object
//! into a `MultiStepPlan`. Parse failures fall through silently; shape
//! failures are structural errors.

use serde_json::Value;

use crate::agent::plan::{MultiStepPlan, PlanStep};
use crate::error::{Result, TasklingError};

/// Extract fenced code blocks for a given language tag (```json ... ```)
pub fn extract_fenced_blocks(content: &str, language: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let fence_pattern = format!("```{}\n", language);
    let lowered = content.to_lowercase();
    // Byte indices must line up with `content`; skip case folding when
    // lowercasing changed the length (non-ASCII text).
    let lower: &str = if lowered.len() == content.len() {
        &lowered
    } else {
        content
    };

    let mut search_from = 0usize;

    while let Some(rel_start) = lower[search_from..].find(&fence_pattern) {
        let fence_start = search_from + rel_start;
        let content_start = fence_start + fence_pattern.len();

        // Find closing fence
        if let Some(rel_end) = lower[content_start..].find("```") {
            let content_end = content_start + rel_end;
            blocks.push(content[content_start..content_end].trim().to_string());
            search_from = content_end + 3;
        } else {
            break;
        }
    }

    blocks
}

/// Extract JSON objects from raw text using brace balancing
///
/// Handles nested braces and escaped quotes within strings.
pub fn extract_balanced_objects(content: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut in_string = false;
    let mut escape = false;
    let mut depth: i32 = 0;
    let mut start: Option<usize> = None;

    for (i, ch) in content.char_indices() {
        if in_string {
            if escape {
                escape = false;
                continue;
            }
            match ch {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(s) = start.take() {
                            out.push(content[s..=i].to_string());
                        }
                    }
                }
            }
            _ => {}
        }
    }

    out
}

/// All structured candidates in priority order: fenced blocks, then
/// brace-balanced objects, deduplicated.
pub fn structured_candidates(content: &str) -> Vec<(String, bool)> {
    let mut seen: Vec<String> = Vec::new();
    let mut out: Vec<(String, bool)> = Vec::new();

    for block in extract_fenced_blocks(content, "json") {
        if !seen.contains(&block) {
            seen.push(block.clone());
            out.push((block, true));
        }
    }

    for object in extract_balanced_objects(content) {
        let trimmed = object.trim().to_string();
        if !seen.contains(&trimmed) {
            seen.push(trimmed.clone());
            out.push((trimmed, false));
        }
    }

    out
}

/// Build the canonical one-step plan for a literal command string
pub fn command_step(command: &str) -> PlanStep {
    PlanStep::new("system_command")
        .with_param("command", command)
        .with_description(format!("Run command: {}", command))
}

/// Normalize a parsed object into a plan.
///
/// Recognized shapes: a `plan` array used as-is, a single `command` field,
/// or a `commands` array with one step per entry. Returns the plan and the
/// payload's confidence when it provides one.
pub fn normalize(value: &Value) -> Result<(MultiStepPlan, Option<f64>)> {
    let object = value.as_object().ok_or_else(|| TasklingError::UnrecognizedShape {
        detail: "top-level value is not an object".to_string(),
    })?;

    let confidence = object
        .get("confidence")
        .and_then(|v| v.as_f64())
        .or_else(|| {
            object
                .get("plan")
                .and_then(|p| p.as_array())
                .and_then(|steps| steps.first())
                .and_then(|step| step.get("confidence"))
                .and_then(|v| v.as_f64())
        });

    if let Some(plan_value) = object.get("plan") {
        let entries = plan_value.as_array().ok_or_else(|| TasklingError::UnrecognizedShape {
            detail: "'plan' is not an array".to_string(),
        })?;
        if entries.is_empty() {
            return Err(TasklingError::UnrecognizedShape {
                detail: "'plan' array is empty".to_string(),
            });
        }

        let mut steps = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let step: PlanStep =
                serde_json::from_value(entry.clone()).map_err(|e| TasklingError::UnrecognizedShape {
                    detail: format!("plan step {} is malformed: {}", i, e),
                })?;
            steps.push(step);
        }

        let description = object
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("Extracted plan")
            .to_string();
        return Ok((MultiStepPlan::new(steps, description), confidence));
    }

    if let Some(command) = object.get("command").and_then(|v| v.as_str()) {
        if command.trim().is_empty() {
            return Err(TasklingError::UnrecognizedShape {
                detail: "'command' is empty".to_string(),
            });
        }
        let plan = MultiStepPlan::single(command_step(command), "Extracted command");
        return Ok((plan, confidence));
    }

    if let Some(commands) = object.get("commands").and_then(|v| v.as_array()) {
        let mut steps = Vec::with_capacity(commands.len());
        for (i, entry) in commands.iter().enumerate() {
            let command = entry
                .as_str()
                .or_else(|| entry.get("command").and_then(|v| v.as_str()))
                .ok_or_else(|| TasklingError::UnrecognizedShape {
                    detail: format!("commands entry {} is not a command", i),
                })?;
            steps.push(command_step(command));
        }
        if steps.is_empty() {
            return Err(TasklingError::UnrecognizedShape {
                detail: "'commands' array is empty".to_string(),
            });
        }
        return Ok((MultiStepPlan::new(steps, "Extracted command sequence"), confidence));
    }

    let keys: Vec<&str> = object.keys().map(|k| k.as_str()).collect();
    Err(TasklingError::UnrecognizedShape {
        detail: format!("no plan/command/commands field (found: {})", keys.join(", ")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_balanced_objects() {
        let content = r#"Some text {"key": "value"} more text {"num": 42}"#;
        let objects = extract_balanced_objects(content);

        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0], r#"{"key": "value"}"#);
        assert_eq!(objects[1], r#"{"num": 42}"#);
    }

    #[test]
    fn test_extract_balanced_objects_nested() {
        let content = r#"{"outer": {"inner": "value"}}"#;
        let objects = extract_balanced_objects(content);

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0], r#"{"outer": {"inner": "value"}}"#);
    }

    #[test]
    fn test_extract_balanced_ignores_braces_in_strings() {
        let content = r#"{"cmd": "echo {not a block}"}"#;
        let objects = extract_balanced_objects(content);
        assert_eq!(objects.len(), 1);
    }

    #[test]
    fn test_extract_fenced_blocks() {
        let content = "Text before\n```json\n{\"key\": \"value\"}\n```\nText after";
        let blocks = extract_fenced_blocks(content, "json");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0], r#"{"key": "value"}"#);
    }

    #[test]
    fn test_candidates_prefer_fenced() {
        let content = "{\"a\": 1}\n```json\n{\"b\": 2}\n```";
        let candidates = structured_candidates(content);
        assert_eq!(candidates[0].0, r#"{"b": 2}"#);
        assert!(candidates[0].1);
        assert_eq!(candidates[1].0, r#"{"a": 1}"#);
        assert!(!candidates[1].1);
    }

    #[test]
    fn test_normalize_plan_array() {
        let value = json!({
            "plan": [
                {"operation": "file_ops.create", "parameters": {"path": "a.txt"}},
                {"operation": "file_ops.read", "parameters": {"path": "a.txt"}}
            ]
        });
        let (plan, confidence) = normalize(&value).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.steps[0].action, "file_ops.create");
        assert!(confidence.is_none());
    }

    #[test]
    fn test_normalize_single_command() {
        let value = json!({"command": "uptime", "confidence": 0.8});
        let (plan, confidence) = normalize(&value).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.steps[0].params["command"], json!("uptime"));
        assert_eq!(confidence, Some(0.8));
    }

    #[test]
    fn test_normalize_commands_array() {
        let value = json!({"commands": ["uptime", {"command": "df -h"}]});
        let (plan, _) = normalize(&value).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.steps[1].params["command"], json!("df -h"));
    }

    #[test]
    fn test_normalize_rejects_unknown_shape() {
        let value = json!({"answer": 42});
        assert!(matches!(
            normalize(&value),
            Err(TasklingError::UnrecognizedShape { .. })
        ));
    }

    #[test]
    fn test_normalize_rejects_empty_plan() {
        let value = json!({"plan": []});
        assert!(matches!(
            normalize(&value),
            Err(TasklingError::UnrecognizedShape { .. })
        ));
    }
}
