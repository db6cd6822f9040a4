//! Pre-programmed multi-step templates
//!
//! A fixed utterance can expand into a fixed multi-step plan. Templates
//! are the only source of multi-step plans in the local tiers; general
//! decomposition of free text stays out of scope.

use lazy_static::lazy_static;
use regex::Regex;

use crate::agent::plan::{MultiStepPlan, PlanStep, StepCondition};

lazy_static! {
    static ref CREATE_AND_READ_RE: Regex = Regex::new(
        r#"(?i)\bcreate\s+and\s+read\s+(?:a\s+)?file\s+["'`]?(?P<name>[\w./~-]*[\w])(?:["'`]?\s+with\s+(?:content|text)\s+(?P<content>.+))?"#
    )
    .unwrap();
    static ref READ_AND_DELETE_RE: Regex = Regex::new(
        r#"(?i)\bread\s+and\s+delete\s+(?:the\s+)?file\s+["'`]?(?P<name>[\w./~-]*[\w])"#
    )
    .unwrap();
}

/// Expand a fixed utterance into a multi-step plan, when one applies
pub fn match_template(command: &str) -> Option<MultiStepPlan> {
    if let Some(caps) = CREATE_AND_READ_RE.captures(command) {
        let path = caps["name"].to_string();
        let mut create = PlanStep::new("file_ops.create")
            .with_param("path", path.clone())
            .with_description(format!("Create file {}", path));
        if let Some(content) = caps.name("content") {
            create = create.with_param("content", content.as_str().trim());
        }
        let read = PlanStep::new("file_ops.read")
            .with_param("path", path.clone())
            .with_description(format!("Read file {}", path));

        return Some(MultiStepPlan::new(
            vec![create, read],
            format!("Create and read file {}", path),
        ));
    }

    if let Some(caps) = READ_AND_DELETE_RE.captures(command) {
        let path = caps["name"].to_string();
        let read = PlanStep::new("file_ops.read")
            .with_param("path", path.clone())
            .with_description(format!("Read file {}", path));
        // Delete only once the read actually produced something
        let delete = PlanStep::new("file_ops.delete")
            .with_param("path", path.clone())
            .with_description(format!("Delete file {}", path))
            .with_condition(StepCondition::exists("last_result"));

        return Some(MultiStepPlan::new(
            vec![read, delete],
            format!("Read and delete file {}", path),
        ));
    }

    None
}
