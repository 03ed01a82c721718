//! Data passed between pipeline stages.

mod media;
mod metadata;
mod script;

pub use media::{ArtifactRef, AudioArtifact, PublishFailure, PublishOutcome, PublishResult};
pub use metadata::{
    derive_subtitle, fallback_caption, MetadataPayload, MAX_DESCRIPTION_CHARS, MAX_HASHTAGS,
    MAX_TAGS, MAX_TITLE_CHARS,
};
pub use script::{flatten_for_narration, ScriptPayload, ScriptSection};
