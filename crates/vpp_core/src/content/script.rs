//! Script generation.

use std::path::PathBuf;

use rand::seq::SliceRandom;
use rand::Rng;

use super::chat::{strip_code_fence, ChatService};
use super::{generated_at, write_timestamped_json};
use crate::collaborators::{Generated, ScriptGenerator, StageError, StepResult};
use crate::models::ScriptPayload;

const TOPIC_PROMPT: &str = "Generate a single evergreen technology topic that would make a great \
educational YouTube video. The topic should be timeless, educational, interesting to tech \
enthusiasts and suitable for a 5-10 minute video. Return ONLY the topic title, nothing else.";

fn script_prompt(topic: &str) -> String {
    format!(
        r#"Create a comprehensive, engaging YouTube video script about: {topic}

The script should be 5-8 minutes long when spoken (750-1200 words), educational,
structured with clear sections, conversational, and evergreen.

Return JSON with this structure:
{{
    "topic": "topic title",
    "hook": "attention-grabbing opening (15-20 seconds)",
    "introduction": "introduce the topic and what viewers will learn",
    "main_content": [
        {{"section_title": "section name", "content": "detailed explanation"}}
    ],
    "conclusion": "summary and call-to-action",
    "estimated_duration": "duration in minutes"
}}"#
    )
}

/// Script generator backed by a chat service.
pub struct ChatScriptGenerator {
    chat: Box<dyn ChatService>,
    topics: Vec<String>,
    output_dir: PathBuf,
}

impl ChatScriptGenerator {
    pub fn new(chat: impl ChatService + 'static, topics: Vec<String>, output_dir: PathBuf) -> Self {
        Self {
            chat: Box::new(chat),
            topics,
            output_dir,
        }
    }

    /// Pick a topic: half the time from the configured list, otherwise
    /// from the chat service. A failed request falls back to the list.
    fn pick_topic(&self, warnings: &mut Vec<String>) -> StepResult<String> {
        let mut rng = rand::thread_rng();

        if rng.gen_bool(0.5) {
            if let Some(topic) = self.topics.choose(&mut rng) {
                return Ok(topic.clone());
            }
        }

        match self.chat.complete(TOPIC_PROMPT, 0.8, 50) {
            Ok(topic) => Ok(topic.trim().trim_matches('"').to_string()),
            Err(e) => match self.topics.choose(&mut rng) {
                Some(topic) => {
                    warnings.push(format!("Topic request failed ({}), picked from list", e));
                    Ok(topic.clone())
                }
                None => Err(StageError::generation(format!("topic request failed: {}", e))),
            },
        }
    }
}

impl ScriptGenerator for ChatScriptGenerator {
    fn generate(&self, topic: Option<&str>) -> StepResult<Generated<ScriptPayload>> {
        let mut warnings = Vec::new();
        let topic = match topic.map(str::trim).filter(|t| !t.is_empty()) {
            Some(topic) => topic.to_string(),
            None => self.pick_topic(&mut warnings)?,
        };

        tracing::info!("Generating script for topic: {}", topic);

        let reply = self
            .chat
            .complete(&script_prompt(&topic), 0.7, 2500)
            .map_err(|e| StageError::generation(e.to_string()))?;

        let mut script = match serde_json::from_str::<ScriptPayload>(strip_code_fence(&reply)) {
            Ok(script) => script,
            Err(e) => {
                warnings.push(format!("Script reply was not valid JSON ({}), used plain-text fallback", e));
                ScriptPayload::fallback(&topic, &reply)
            }
        };

        if script.topic.trim().is_empty() {
            script.topic = topic;
        }
        script.generated_at = Some(generated_at());
        script.model = Some(self.chat.model().to_string());

        Ok(Generated {
            value: script,
            warnings,
        })
    }

    fn persist(&self, script: &ScriptPayload) -> StepResult<PathBuf> {
        write_timestamped_json(&self.output_dir, "script", script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::ScriptedChat;
    use crate::content::ChatError;
    use std::rc::Rc;
    use tempfile::tempdir;

    fn generator(replies: Vec<Result<String, ChatError>>) -> (ChatScriptGenerator, Rc<ScriptedChat>) {
        let chat = Rc::new(ScriptedChat::new(replies));
        let generator = ChatScriptGenerator::new(Rc::clone(&chat), Vec::new(), PathBuf::from("out"));
        (generator, chat)
    }

    #[test]
    fn parses_fenced_json_reply() {
        let reply = "```json\n{\"topic\": \"Rust\", \"hook\": \"Hi\", \"main_content\": []}\n```";
        let (generator, chat) = generator(vec![Ok(reply.to_string())]);

        let generated = generator.generate(Some("Rust")).unwrap();
        assert_eq!(generated.value.hook, "Hi");
        assert_eq!(generated.value.model.as_deref(), Some("test-model"));
        assert!(generated.value.generated_at.is_some());
        assert!(generated.warnings.is_empty());
        assert!(chat.prompts.borrow()[0].contains("about: Rust"));
    }

    #[test]
    fn plain_text_reply_uses_fallback_with_warning() {
        let (generator, _) = generator(vec![Ok("Just some prose about Rust.".to_string())]);

        let generated = generator.generate(Some("Rust")).unwrap();
        assert_eq!(generated.value.topic, "Rust");
        assert_eq!(generated.value.hook, "Welcome to today's video!");
        assert_eq!(generated.warnings.len(), 1);
    }

    #[test]
    fn unreachable_service_is_generation_error() {
        let (generator, _) = generator(vec![Err(ChatError::EmptyReply)]);
        let err = generator.generate(Some("Rust")).unwrap_err();
        assert!(matches!(err, StageError::Generation(_)));
    }

    #[test]
    fn missing_topic_without_list_asks_service() {
        let script = "{\"hook\": \"Hi\"}";
        let (generator, chat) = generator(vec![
            Ok("\"Quantum Computing\"".to_string()),
            Ok(script.to_string()),
        ]);

        let generated = generator.generate(None).unwrap();
        assert_eq!(generated.value.topic, "Quantum Computing");
        assert_eq!(chat.prompts.borrow().len(), 2);
    }

    #[test]
    fn persist_writes_script_file() {
        let dir = tempdir().unwrap();
        let generator = ChatScriptGenerator::new(
            ScriptedChat::new(Vec::new()),
            Vec::new(),
            dir.path().join("output"),
        );
        let script = ScriptPayload::fallback("Rust", "body");

        let path = generator.persist(&script).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("script_") && name.ends_with(".json"));

        let loaded: ScriptPayload =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, script);
    }
}
