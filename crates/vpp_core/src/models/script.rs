//! Video script produced by the content stage.

use serde::{Deserialize, Serialize};

/// One section of the script body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptSection {
    #[serde(default)]
    pub section_title: String,
    #[serde(default)]
    pub content: String,
}

impl ScriptSection {
    pub fn new(section_title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            section_title: section_title.into(),
            content: content.into(),
        }
    }
}

/// Structured script for one video.
///
/// Every field defaults to empty so that partial replies from the content
/// service still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptPayload {
    #[serde(default)]
    pub topic: String,
    /// Attention-grabbing opening.
    #[serde(default)]
    pub hook: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub main_content: Vec<ScriptSection>,
    /// Summary and call to action.
    #[serde(default)]
    pub conclusion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Number of reply characters used as the introduction of a fallback script.
const FALLBACK_INTRO_CHARS: usize = 200;

impl ScriptPayload {
    /// Minimal valid script built from an unstructured reply.
    pub fn fallback(topic: &str, reply: &str) -> Self {
        Self {
            topic: topic.to_string(),
            hook: "Welcome to today's video!".to_string(),
            introduction: reply.chars().take(FALLBACK_INTRO_CHARS).collect(),
            main_content: vec![ScriptSection::new("Main Content", reply)],
            conclusion: "Thanks for watching!".to_string(),
            estimated_duration: Some("5-8 minutes".to_string()),
            generated_at: None,
            model: None,
        }
    }

    /// Short context used when asking for metadata: the introduction
    /// (first 200 characters) and up to three section titles.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.introduction.is_empty() {
            parts.push(self.introduction.chars().take(200).collect::<String>());
        }
        for section in self.main_content.iter().take(3) {
            parts.push(format!("- {}", section.section_title));
        }
        parts.join("\n")
    }
}

/// Flatten a script into plain narration text.
///
/// Order is hook, introduction, each section's content in list order, then
/// conclusion. Parts are joined with a blank line; empty parts are left out
/// entirely so no separator appears at the boundaries.
pub fn flatten_for_narration(script: &ScriptPayload) -> String {
    let sections = script.main_content.iter().map(|s| s.content.as_str());

    std::iter::once(script.hook.as_str())
        .chain(std::iter::once(script.introduction.as_str()))
        .chain(sections)
        .chain(std::iter::once(script.conclusion.as_str()))
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
