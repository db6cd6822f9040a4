//! Free-text fallback extraction
//!
//! When no structured candidate parses, the response may still describe a
//! command in prose: a fenced code block, an indicator phrase ("use the
//! command ..."), or a localized action verb in a non-Latin script. These
//! strategies each yield at most one command; nothing is guessed.

use lazy_static::lazy_static;
use regex::Regex;

use crate::agent::plan::PlanStep;

lazy_static! {
    static ref INDICATOR_RE: Regex = Regex::new(
        r"(?i)\b(?:use the command|try the following command|try the following|run the command|execute the command|you can use|you can run|run|execute)\b[:,]?\s*"
    )
    .unwrap();

    // Cyrillic action verbs with filename/content companion markers
    static ref CYR_CREATE_RE: Regex = Regex::new(r"(?i)\b(?:создай|создать|сделай)\b").unwrap();
    static ref CYR_READ_RE: Regex = Regex::new(r"(?i)\b(?:прочитай|прочти|открой)\b").unwrap();
    static ref CYR_DELETE_RE: Regex = Regex::new(r"(?i)\b(?:удали|удалить|сотри)\b").unwrap();
    static ref CYR_APPEND_RE: Regex = Regex::new(r"(?i)\b(?:добавь|допиши)\b").unwrap();
    static ref CYR_LIST_RE: Regex =
        Regex::new(r"(?i)\b(?:покажи|перечисли|список)\b.*\b(?:файлы|файлов)\b").unwrap();
    static ref CYR_FILENAME_RE: Regex =
        Regex::new(r#"(?i)файл\w*\s+[«"'`]?(?P<name>[\w][\w./\-]*)"#).unwrap();
    static ref CYR_CONTENT_RE: Regex =
        Regex::new(r#"(?i)(?:с текстом|с содержимым|содержащий)\s+[«"'`]?(?P<content>.+?)[»"'`]?\s*$"#)
            .unwrap();
}

/// Content of the first fenced code block, regardless of language tag
pub fn first_code_block(text: &str) -> Option<String> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];

    // Skip the language tag line, if any
    let content_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let content = &after_fence[content_start..];
    let end = content.find("```")?;

    let command = content[..end].trim();
    if command.is_empty() {
        None
    } else {
        Some(command.to_string())
    }
}

/// Command following an indicator phrase.
///
/// Scans each phrase occurrence and takes the span after it, honoring
/// backticked and quoted spans; quoting inside the captured command is
/// preserved literally, never re-escaped.
pub fn indicator_command(text: &str) -> Option<String> {
    for m in INDICATOR_RE.find_iter(text) {
        let tail = &text[m.end()..];
        if let Some(command) = command_span(tail) {
            return Some(command);
        }
    }
    None
}

/// Take the command span at the start of `tail`
fn command_span(tail: &str) -> Option<String> {
    let tail = tail.trim_start();
    let mut chars = tail.chars();
    let first = chars.next()?;

    if first == '`' || first == '"' || first == '\'' {
        let rest = &tail[first.len_utf8()..];
        let end = rest.find(first)?;
        let span = rest[..end].trim();
        return if span.is_empty() {
            None
        } else {
            Some(span.to_string())
        };
    }

    // Unquoted: take the remainder of the line, minus trailing punctuation
    let line = tail.lines().next()?;
    let span = line.trim().trim_end_matches(['.', '!', '?']).trim();
    if span.is_empty() {
        None
    } else {
        Some(span.to_string())
    }
}

fn has_cyrillic(text: &str) -> bool {
    text.chars().any(|c| ('\u{0400}'..='\u{04FF}').contains(&c))
}

/// Locale verb matching for Cyrillic-script responses.
///
/// Detects an action verb plus a filename/content marker and synthesizes
/// the canonical file operation. Returns the step and the language tag.
pub fn cyrillic_file_operation(text: &str) -> Option<(PlanStep, &'static str)> {
    if !has_cyrillic(text) {
        return None;
    }

    let filename = CYR_FILENAME_RE
        .captures(text)
        .map(|c| c["name"].to_string());
    let content = CYR_CONTENT_RE
        .captures(text)
        .map(|c| c["content"].to_string());

    let step = if CYR_CREATE_RE.is_match(text) {
        let path = filename?;
        let mut step = PlanStep::new("file_ops.create")
            .with_param("path", path.clone())
            .with_description(format!("Create file {}", path));
        if let Some(content) = content {
            step = step.with_param("content", content);
        }
        step
    } else if CYR_APPEND_RE.is_match(text) {
        let path = filename?;
        PlanStep::new("file_ops.append")
            .with_param("path", path.clone())
            .with_param("content", content.unwrap_or_default())
            .with_description(format!("Append to file {}", path))
    } else if CYR_READ_RE.is_match(text) {
        let path = filename?;
        PlanStep::new("file_ops.read")
            .with_param("path", path.clone())
            .with_description(format!("Read file {}", path))
    } else if CYR_DELETE_RE.is_match(text) {
        let path = filename?;
        PlanStep::new("file_ops.delete")
            .with_param("path", path.clone())
            .with_description(format!("Delete file {}", path))
    } else if CYR_LIST_RE.is_match(text) {
        PlanStep::new("file_ops.list")
            .with_param("path", ".")
            .with_description("List files")
    } else {
        return None;
    };

    Some((step, "ru"))
}
