//! Contracts between the pipeline and the components doing the real work.
//!
//! The pipeline only sees these traits. Each fail-fast collaborator
//! returns [`StepResult`]; the publisher and notifier cannot fail and
//! report problems as data instead.

mod errors;
mod provider;

use std::path::PathBuf;

pub use errors::{StageError, StepResult};
pub use provider::{Collaborators, Provider};

use crate::config::Settings;
use crate::content::{ChatClient, ChatMetadataGenerator, ChatScriptGenerator};
use crate::models::{
    flatten_for_narration, ArtifactRef, AudioArtifact, MetadataPayload, PublishOutcome,
    PublishResult, ScriptPayload,
};
use crate::notification::{EmailNotifier, ErrorNotification};
use crate::publish::YouTubePublisher;
use crate::render::{CommandAudioRenderer, FfmpegThumbnailRenderer, FfmpegVideoRenderer};

/// A collaborator's output plus any fallbacks it had to take.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub value: T,
    pub warnings: Vec<String>,
}

impl<T> Generated<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Generated<U> {
        Generated {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

/// Topic to structured script.
pub trait ScriptGenerator {
    /// Generate a script. Without a topic the generator picks one.
    fn generate(&self, topic: Option<&str>) -> StepResult<Generated<ScriptPayload>>;

    /// Write the script next to the other run outputs.
    fn persist(&self, script: &ScriptPayload) -> StepResult<PathBuf>;

    fn flatten_for_narration(&self, script: &ScriptPayload) -> String {
        flatten_for_narration(script)
    }
}

/// Script to SEO metadata.
pub trait MetadataGenerator {
    /// Generate metadata. Implementations apply
    /// [`MetadataPayload::enforce_limits`] before returning.
    fn generate(&self, script: &ScriptPayload) -> StepResult<Generated<MetadataPayload>>;

    /// Short caption for the thumbnail. Never fails.
    fn derive_thumbnail_caption(&self, metadata: &MetadataPayload) -> String;

    fn persist(&self, metadata: &MetadataPayload) -> StepResult<PathBuf>;
}

pub trait ThumbnailRenderer {
    fn render(&self, caption: &str, subtitle: Option<&str>) -> StepResult<Generated<ArtifactRef>>;
}

pub trait AudioRenderer {
    /// Render narration. A successful artifact has a positive duration.
    fn render(&self, narration: &str) -> StepResult<Generated<AudioArtifact>>;
}

pub trait VideoRenderer {
    fn render(
        &self,
        audio: &AudioArtifact,
        thumbnail: &ArtifactRef,
        script: &ScriptPayload,
    ) -> StepResult<Generated<ArtifactRef>>;
}

/// Uploads a finished video. Never fails: rejected or interrupted uploads
/// come back as [`PublishOutcome::Failed`].
pub trait Publisher {
    fn publish(
        &self,
        video: &ArtifactRef,
        metadata: &MetadataPayload,
        thumbnail: Option<&ArtifactRef>,
    ) -> PublishOutcome;
}

/// Best-effort delivery of run events. Returns whether delivery succeeded.
pub trait Notifier {
    fn notify_success(&self, result: &PublishResult, metadata: &MetadataPayload) -> bool;

    fn notify_error(&self, notification: &ErrorNotification) -> bool;
}

impl Collaborators {
    /// Wire the shipped implementations. Nothing is built until a stage
    /// asks for it.
    pub fn from_settings(settings: &Settings) -> Self {
        let script_settings = settings.clone();
        let metadata_settings = settings.clone();
        let thumbnail_settings = settings.clone();
        let audio_settings = settings.clone();
        let video_settings = settings.clone();
        let youtube_settings = settings.youtube.clone();
        let email_settings = settings.email.clone();
        let channel_name = settings.content.channel_name.clone();

        Self {
            script: Provider::lazy(move || {
                let client = ChatClient::from_settings(&script_settings.content)
                    .map_err(|e| StageError::configuration(e.to_string()))?;
                Ok(Box::new(ChatScriptGenerator::new(
                    client,
                    script_settings.content.topics.clone(),
                    script_settings.output_folder(),
                )) as Box<dyn ScriptGenerator>)
            }),
            metadata: Provider::lazy(move || {
                let client = ChatClient::from_settings(&metadata_settings.content)
                    .map_err(|e| StageError::configuration(e.to_string()))?;
                Ok(Box::new(ChatMetadataGenerator::new(
                    client,
                    metadata_settings.output_folder(),
                )) as Box<dyn MetadataGenerator>)
            }),
            thumbnail: Provider::lazy(move || {
                Ok(Box::new(FfmpegThumbnailRenderer::new(
                    thumbnail_settings.thumbnail.clone(),
                    thumbnail_settings.audio.ffmpeg.clone(),
                    thumbnail_settings.output_folder(),
                )) as Box<dyn ThumbnailRenderer>)
            }),
            audio: Provider::lazy(move || {
                Ok(Box::new(CommandAudioRenderer::new(
                    audio_settings.audio.clone(),
                    audio_settings.assets_folder(),
                    audio_settings.output_folder(),
                )) as Box<dyn AudioRenderer>)
            }),
            video: Provider::lazy(move || {
                Ok(Box::new(FfmpegVideoRenderer::new(
                    video_settings.video.clone(),
                    video_settings.audio.ffmpeg.clone(),
                    video_settings.thumbnail.font_file.clone(),
                    video_settings.output_folder(),
                )) as Box<dyn VideoRenderer>)
            }),
            publisher: Provider::lazy(move || {
                let publisher = YouTubePublisher::from_settings(&youtube_settings)
                    .map_err(|e| StageError::configuration(e.to_string()))?;
                Ok(Box::new(publisher) as Box<dyn Publisher>)
            }),
            notifier: Provider::lazy(move || {
                let notifier = EmailNotifier::from_settings(&email_settings, &channel_name)
                    .map_err(|e| StageError::configuration(e.to_string()))?;
                Ok(Box::new(notifier) as Box<dyn Notifier>)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_collects_warnings() {
        let generated = Generated::new(2)
            .with_warning("used fallback")
            .map(|v| v * 10);
        assert_eq!(generated.value, 20);
        assert_eq!(generated.warnings, vec!["used fallback".to_string()]);
    }

    #[test]
    fn from_settings_builds_nothing_up_front() {
        let collaborators = Collaborators::from_settings(&Settings::default());
        assert!(!collaborators.script.is_initialized());
        assert!(!collaborators.publisher.is_initialized());
        assert!(!collaborators.notifier.is_initialized());
    }

    #[test]
    fn missing_credentials_surface_on_first_use() {
        let mut settings = Settings::default();
        settings.email.password_env = "VPP_TEST_UNSET_SMTP_PASSWORD".to_string();
        settings.email.sender_env = "VPP_TEST_UNSET_SMTP_EMAIL".to_string();

        let collaborators = Collaborators::from_settings(&settings);
        let err = collaborators.notifier.get().err().unwrap();
        assert!(matches!(err, StageError::Configuration(_)));
    }
}
