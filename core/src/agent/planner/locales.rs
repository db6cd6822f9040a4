//! Localized phrase tables
//!
//! Phrase-to-tool rules are loaded data keyed by locale, not inline
//! branches: adding a language or dialect is an edit to `locales.json`.
//! Patterns carry named captures (`arg`, `content`, `lang`) that become
//! tool parameters; every locale maps onto the same canonical
//! tool/action/parameter shape.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::agent::plan::PlanStep;

const LOCALES_JSON: &str = include_str!("locales.json");

#[derive(Debug, Deserialize)]
struct LocaleFile {
    intents: HashMap<String, IntentSpec>,
    locales: Vec<LocaleDef>,
}

/// Canonical tool/action/parameter mapping for one intent
#[derive(Debug, Clone, Deserialize)]
pub struct IntentSpec {
    pub tool: String,
    pub action: String,
    #[serde(default)]
    pub param: Option<String>,
    /// Value used when the pattern captured no argument
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocaleDef {
    tag: String,
    patterns: Vec<PatternDef>,
}

#[derive(Debug, Deserialize)]
struct PatternDef {
    intent: String,
    pattern: String,
}

struct CompiledLocale {
    tag: String,
    patterns: Vec<(String, Regex)>,
}

/// A phrase-table hit resolved to a canonical plan step
#[derive(Debug, Clone)]
pub struct PhraseMatch {
    pub locale: String,
    pub intent: String,
    pub step: PlanStep,
}

/// Compiled phrase tables for all shipped locales
pub struct LocaleTable {
    intents: HashMap<String, IntentSpec>,
    locales: Vec<CompiledLocale>,
}

lazy_static! {
    static ref LOCALE_TABLE: LocaleTable =
        LocaleTable::from_json(LOCALES_JSON).expect("embedded locale table is valid");
}

impl LocaleTable {
    /// The process-wide table compiled from the embedded data
    pub fn shared() -> &'static LocaleTable {
        &LOCALE_TABLE
    }

    fn from_json(raw: &str) -> Result<Self, String> {
        let file: LocaleFile = serde_json::from_str(raw).map_err(|e| e.to_string())?;

        let mut locales = Vec::with_capacity(file.locales.len());
        for locale in file.locales {
            let mut patterns = Vec::with_capacity(locale.patterns.len());
            for def in locale.patterns {
                if !file.intents.contains_key(&def.intent) {
                    return Err(format!(
                        "locale '{}' references unknown intent '{}'",
                        locale.tag, def.intent
                    ));
                }
                let regex = Regex::new(&def.pattern).map_err(|e| {
                    format!("locale '{}' intent '{}': {}", locale.tag, def.intent, e)
                })?;
                patterns.push((def.intent, regex));
            }
            locales.push(CompiledLocale {
                tag: locale.tag,
                patterns,
            });
        }

        Ok(Self {
            intents: file.intents,
            locales,
        })
    }

    /// Shipped locale tags, in scan order
    pub fn tags(&self) -> Vec<&str> {
        self.locales.iter().map(|l| l.tag.as_str()).collect()
    }

    /// Scan the command against all locales; first match wins.
    ///
    /// A preferred locale, when given, is scanned before the others.
    pub fn match_command(&self, command: &str, preferred: Option<&str>) -> Option<PhraseMatch> {
        let ordered = self.scan_order(preferred);

        for locale in ordered {
            for (intent, regex) in &locale.patterns {
                if let Some(caps) = regex.captures(command) {
                    let spec = &self.intents[intent];
                    let mut step = PlanStep::new(format!("{}.{}", spec.tool, spec.action))
                        .with_description(caps.get(0).map(|m| m.as_str()).unwrap_or(command));

                    if let Some(param) = &spec.param {
                        let arg = caps
                            .name("arg")
                            .map(|m| m.as_str().trim().to_string())
                            .or_else(|| spec.default.clone());
                        if let Some(arg) = arg {
                            step = step.with_param(param.clone(), arg);
                        }
                    }
                    if let Some(content) = caps.name("content") {
                        step = step.with_param("content", content.as_str().trim());
                    }
                    if let Some(lang) = caps.name("lang") {
                        step = step.with_param("target", lang.as_str());
                    }

                    return Some(PhraseMatch {
                        locale: locale.tag.clone(),
                        intent: intent.clone(),
                        step,
                    });
                }
            }
        }

        None
    }

    fn scan_order(&self, preferred: Option<&str>) -> Vec<&CompiledLocale> {
        let mut ordered: Vec<&CompiledLocale> = Vec::with_capacity(self.locales.len());
        if let Some(tag) = preferred {
            if let Some(first) = self.locales.iter().find(|l| l.tag == tag) {
                ordered.push(first);
            }
        }
        for locale in &self.locales {
            if Some(locale.tag.as_str()) != preferred {
                ordered.push(locale);
            }
        }
        ordered
    }
}
