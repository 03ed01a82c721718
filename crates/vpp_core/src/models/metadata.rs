//! SEO metadata produced by the metadata stage.

use serde::{Deserialize, Serialize};

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 60;
/// Maximum description length in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 5000;
/// Maximum number of tags.
pub const MAX_TAGS: usize = 30;
/// Maximum number of hashtags.
pub const MAX_HASHTAGS: usize = 15;

/// Number of title tokens used for subtitles and caption fallbacks.
const CAPTION_TOKENS: usize = 3;

/// Caption used when the metadata carries neither thumbnail text nor title.
const DEFAULT_CAPTION: &str = "VIDEO";

/// Title, description and discovery data for one video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Large caption rendered on the thumbnail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_topic: Option<String>,
}

impl MetadataPayload {
    /// Generic metadata used when the service reply cannot be parsed.
    pub fn fallback(topic: &str) -> Self {
        Self {
            title: topic.chars().take(MAX_TITLE_CHARS).collect(),
            description: format!("Learn about {} in this comprehensive guide.", topic),
            tags: vec![
                "technology".to_string(),
                "tech".to_string(),
                "tutorial".to_string(),
                "education".to_string(),
            ],
            hashtags: vec![
                "#tech".to_string(),
                "#technology".to_string(),
                "#tutorial".to_string(),
            ],
            keywords: vec![topic.to_string()],
            ..Default::default()
        }
    }

    /// Apply platform limits in place.
    ///
    /// Over-long title and description are cut and end in `...`, tags and
    /// hashtags are truncated to their maximum count, and every hashtag
    /// starts with `#`.
    pub fn enforce_limits(&mut self) {
        self.title = truncate_with_ellipsis(&self.title, MAX_TITLE_CHARS);
        self.description = truncate_with_ellipsis(&self.description, MAX_DESCRIPTION_CHARS);
        self.tags.truncate(MAX_TAGS);
        self.hashtags = self
            .hashtags
            .iter()
            .take(MAX_HASHTAGS)
            .map(|tag| {
                if tag.starts_with('#') {
                    tag.clone()
                } else {
                    format!("#{}", tag)
                }
            })
            .collect();
    }

    /// Caption for the thumbnail: thumbnail text, else title, else `VIDEO`.
    pub fn thumbnail_caption(&self) -> String {
        match self.thumbnail_text.as_deref() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ if !self.title.trim().is_empty() => self.title.clone(),
            _ => DEFAULT_CAPTION.to_string(),
        }
    }
}

fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars - 3).collect();
    format!("{}...", kept)
}

/// Thumbnail subtitle: the last three title tokens when the title has more
/// than three, otherwise none.
pub fn derive_subtitle(title: &str) -> Option<String> {
    let tokens: Vec<&str> = title.split_whitespace().collect();
    if tokens.len() > CAPTION_TOKENS {
        Some(tokens[tokens.len() - CAPTION_TOKENS..].join(" "))
    } else {
        None
    }
}

/// Caption used when no better key phrase is available: the first three
/// title tokens.
pub fn fallback_caption(title: &str) -> String {
    title
        .split_whitespace()
        .take(CAPTION_TOKENS)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_title_is_cut_to_57_plus_ellipsis() {
        let mut metadata = MetadataPayload {
            title: "t".repeat(70),
            ..Default::default()
        };
        metadata.enforce_limits();

        assert_eq!(metadata.title.chars().count(), 60);
        assert_eq!(metadata.title, format!("{}...", "t".repeat(57)));
    }

    #[test]
    fn title_at_limit_is_untouched() {
        let mut metadata = MetadataPayload {
            title: "t".repeat(60),
            ..Default::default()
        };
        metadata.enforce_limits();
        assert_eq!(metadata.title, "t".repeat(60));
    }

    #[test]
    fn long_description_is_cut() {
        let mut metadata = MetadataPayload {
            description: "d".repeat(6000),
            ..Default::default()
        };
        metadata.enforce_limits();
        assert_eq!(metadata.description.chars().count(), 5000);
        assert!(metadata.description.ends_with("..."));
    }

    #[test]
    fn hashtags_get_prefix_and_limit() {
        let mut metadata = MetadataPayload {
            hashtags: (0..20).map(|i| format!("tag{}", i)).collect(),
            ..Default::default()
        };
        metadata.hashtags[1] = "#already".to_string();
        metadata.hashtags[0] = "tech".to_string();
        metadata.enforce_limits();

        assert_eq!(metadata.hashtags.len(), 15);
        assert_eq!(metadata.hashtags[0], "#tech");
        assert_eq!(metadata.hashtags[1], "#already");
        assert!(metadata.hashtags.iter().all(|h| h.starts_with('#')));
    }

    #[test]
    fn tags_are_truncated_to_30() {
        let mut metadata = MetadataPayload {
            tags: (0..31).map(|i| format!("tag{}", i)).collect(),
            ..Default::default()
        };
        metadata.enforce_limits();
        assert_eq!(metadata.tags.len(), 30);
        assert_eq!(metadata.tags[29], "tag29");
    }

    #[test]
    fn subtitle_takes_last_three_tokens() {
        assert_eq!(derive_subtitle("A B C D E"), Some("C D E".to_string()));
        assert_eq!(derive_subtitle("A B C"), None);
        assert_eq!(derive_subtitle(""), None);
    }

    #[test]
    fn fallback_caption_takes_first_three_tokens() {
        assert_eq!(fallback_caption("Quantum Computing Basics Explained"), "Quantum Computing Basics");
        assert_eq!(fallback_caption("Short"), "Short");
    }

    #[test]
    fn caption_prefers_thumbnail_text() {
        let mut metadata = MetadataPayload {
            title: "Full Title".to_string(),
            ..Default::default()
        };
        assert_eq!(metadata.thumbnail_caption(), "Full Title");

        metadata.thumbnail_text = Some("KEY WORDS".to_string());
        assert_eq!(metadata.thumbnail_caption(), "KEY WORDS");

        assert_eq!(MetadataPayload::default().thumbnail_caption(), "VIDEO");
    }

    #[test]
    fn fallback_metadata_respects_limits() {
        let topic = "a very long topic name that keeps going well past the sixty character limit";
        let mut metadata = MetadataPayload::fallback(topic);
        metadata.enforce_limits();

        assert_eq!(metadata.title.chars().count(), 60);
        assert_eq!(metadata.keywords, vec![topic.to_string()]);
    }
}
