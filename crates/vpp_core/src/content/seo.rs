//! SEO metadata generation.

use std::path::PathBuf;

use super::chat::{strip_code_fence, ChatService};
use super::{generated_at, write_timestamped_json};
use crate::collaborators::{Generated, MetadataGenerator, StageError, StepResult};
use crate::models::{fallback_caption, MetadataPayload, ScriptPayload};

fn metadata_prompt(topic: &str, summary: &str) -> String {
    format!(
        r##"Create SEO-optimized YouTube metadata for a video about: {topic}

Video content summary:
{summary}

Return JSON:
{{
    "title": "catchy title with the main keyword (max 60 characters)",
    "description": "detailed description (300-500 words) with keywords, timestamps and a call to action",
    "tags": ["15-20 tags mixing broad and specific terms"],
    "hashtags": ["#5-10 relevant hashtags"],
    "keywords": ["primary search terms"]
}}"##
    )
}

fn caption_prompt(title: &str) -> String {
    format!(
        "From this YouTube video title, extract the 2-4 most important words that would work \
         well as large text on a thumbnail:\n\nTitle: {}\n\nReturn ONLY the key words, nothing else.",
        title
    )
}

pub struct ChatMetadataGenerator {
    chat: Box<dyn ChatService>,
    output_dir: PathBuf,
}

impl ChatMetadataGenerator {
    pub fn new(chat: impl ChatService + 'static, output_dir: PathBuf) -> Self {
        Self {
            chat: Box::new(chat),
            output_dir,
        }
    }
}

impl MetadataGenerator for ChatMetadataGenerator {
    fn generate(&self, script: &ScriptPayload) -> StepResult<Generated<MetadataPayload>> {
        let topic = if script.topic.trim().is_empty() {
            "Technology"
        } else {
            script.topic.as_str()
        };
        tracing::info!("Generating SEO metadata for: {}", topic);

        let reply = self
            .chat
            .complete(&metadata_prompt(topic, &script.summary()), 0.7, 1500)
            .map_err(|e| StageError::generation(e.to_string()))?;

        let mut warnings = Vec::new();
        let mut metadata = match serde_json::from_str::<MetadataPayload>(strip_code_fence(&reply)) {
            Ok(metadata) => metadata,
            Err(e) => {
                warnings.push(format!("Metadata reply was not valid JSON ({}), used generic metadata", e));
                MetadataPayload::fallback(topic)
            }
        };

        metadata.enforce_limits();
        metadata.generated_at = Some(generated_at());
        metadata.original_topic = Some(topic.to_string());

        Ok(Generated {
            value: metadata,
            warnings,
        })
    }

    fn derive_thumbnail_caption(&self, metadata: &MetadataPayload) -> String {
        let title = metadata.title.trim();
        if title.split_whitespace().count() <= 3 {
            return title.to_string();
        }

        match self.chat.complete(&caption_prompt(title), 0.5, 20) {
            Ok(reply) => {
                let caption = reply.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
                if caption.is_empty() {
                    fallback_caption(title)
                } else {
                    caption.to_string()
                }
            }
            Err(e) => {
                tracing::warn!("Thumbnail caption request failed, using title words: {}", e);
                fallback_caption(title)
            }
        }
    }

    fn persist(&self, metadata: &MetadataPayload) -> StepResult<PathBuf> {
        write_timestamped_json(&self.output_dir, "metadata", metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::ScriptedChat;
    use crate::content::ChatError;

    fn script() -> ScriptPayload {
        ScriptPayload {
            topic: "machine learning concepts".to_string(),
            introduction: "ML is everywhere".to_string(),
            ..Default::default()
        }
    }

    fn generator(replies: Vec<Result<String, ChatError>>) -> ChatMetadataGenerator {
        ChatMetadataGenerator::new(ScriptedChat::new(replies), PathBuf::from("out"))
    }

    #[test]
    fn reply_is_limited_and_stamped() {
        let reply = format!(
            "{{\"title\": \"{}\", \"description\": \"d\", \"tags\": [], \"hashtags\": [\"ml\"]}}",
            "x".repeat(80)
        );
        let generated = generator(vec![Ok(reply)]).generate(&script()).unwrap();

        let metadata = generated.value;
        assert_eq!(metadata.title.chars().count(), 60);
        assert_eq!(metadata.hashtags, vec!["#ml".to_string()]);
        assert_eq!(metadata.original_topic.as_deref(), Some("machine learning concepts"));
        assert!(generated.warnings.is_empty());
    }

    #[test]
    fn unparsable_reply_uses_generic_metadata() {
        let generated = generator(vec![Ok("no json here".to_string())])
            .generate(&script())
            .unwrap();
        assert_eq!(generated.value.title, "machine learning concepts");
        assert_eq!(generated.value.tags.len(), 4);
        assert_eq!(generated.warnings.len(), 1);
    }

    #[test]
    fn service_failure_is_generation_error() {
        let err = generator(vec![Err(ChatError::EmptyReply)])
            .generate(&script())
            .unwrap_err();
        assert!(matches!(err, StageError::Generation(_)));
    }

    #[test]
    fn short_title_is_caption_without_request() {
        let metadata = MetadataPayload {
            title: "Rust In Depth".to_string(),
            ..Default::default()
        };
        // No replies queued: any request would fail.
        assert_eq!(generator(Vec::new()).derive_thumbnail_caption(&metadata), "Rust In Depth");
    }

    #[test]
    fn caption_strips_quotes() {
        let metadata = MetadataPayload {
            title: "Understanding Machine Learning From Scratch".to_string(),
            ..Default::default()
        };
        let caption = generator(vec![Ok("\"MACHINE LEARNING\"".to_string())])
            .derive_thumbnail_caption(&metadata);
        assert_eq!(caption, "MACHINE LEARNING");
    }

    #[test]
    fn caption_falls_back_to_first_three_words() {
        let metadata = MetadataPayload {
            title: "Understanding Machine Learning From Scratch".to_string(),
            ..Default::default()
        };
        let caption = generator(vec![Err(ChatError::EmptyReply)]).derive_thumbnail_caption(&metadata);
        assert_eq!(caption, "Understanding Machine Learning");
    }
}
