//! The run record: one pipeline execution and what each stage did.

use std::fmt;

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::{ArtifactRef, AudioArtifact, MetadataPayload, PublishResult, ScriptPayload};

/// Attribution used when no stage recorded an error.
pub const UNKNOWN_STAGE: &str = "unknown";

/// The seven stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    ContentGeneration,
    SeoOptimization,
    ThumbnailCreation,
    AudioProduction,
    VideoEditing,
    YoutubeUpload,
    EmailNotification,
}

impl StageName {
    pub const ALL: [StageName; 7] = [
        StageName::ContentGeneration,
        StageName::SeoOptimization,
        StageName::ThumbnailCreation,
        StageName::AudioProduction,
        StageName::VideoEditing,
        StageName::YoutubeUpload,
        StageName::EmailNotification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::ContentGeneration => "content_generation",
            StageName::SeoOptimization => "seo_optimization",
            StageName::ThumbnailCreation => "thumbnail_creation",
            StageName::AudioProduction => "audio_production",
            StageName::VideoEditing => "video_editing",
            StageName::YoutubeUpload => "youtube_upload",
            StageName::EmailNotification => "email_notification",
        }
    }

    /// 1-based position in the pipeline.
    pub fn number(&self) -> usize {
        *self as usize + 1
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Success,
    Error,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Success,
    Error,
    Skipped,
}

/// What a stage produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StagePayload {
    Script(ScriptPayload),
    Metadata(MetadataPayload),
    Artifact(ArtifactRef),
    Audio(AudioArtifact),
    Publish(PublishResult),
    Notification { delivered: bool },
}

/// Outcome of one attempted stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub status: StageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<StagePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl StageResult {
    pub fn success(payload: StagePayload, warnings: Vec<String>) -> Self {
        Self {
            status: StageStatus::Success,
            payload: Some(payload),
            error: None,
            warnings,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Error,
            payload: None,
            error: Some(message.into()),
            warnings: Vec::new(),
        }
    }

    pub fn skipped() -> Self {
        Self {
            status: StageStatus::Skipped,
            payload: None,
            error: None,
            warnings: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == StageStatus::Error
    }
}

/// One end-to-end pipeline execution.
///
/// Starts `running`; [`Run::finish`] or [`Run::fail`] move it to a terminal
/// status exactly once. Stages appear in `stages` in the order they were
/// attempted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub start_time: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub status: RunStatus,
    pub stages: IndexMap<StageName, StageResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Run {
    pub fn new(topic: Option<&str>) -> Self {
        Self::started_at(Local::now(), topic)
    }

    pub fn started_at(start_time: DateTime<Local>, topic: Option<&str>) -> Self {
        Self {
            id: start_time.format("%Y%m%d_%H%M%S").to_string(),
            start_time,
            topic: topic.map(|t| t.to_string()),
            status: RunStatus::Running,
            stages: IndexMap::new(),
            end_time: None,
            duration_seconds: None,
            error: None,
        }
    }

    /// Record a stage result. Returns false (and keeps the existing entry)
    /// if the stage was already recorded or the run is terminal.
    pub fn record_stage(&mut self, stage: StageName, result: StageResult) -> bool {
        if self.status.is_terminal() || self.stages.contains_key(&stage) {
            return false;
        }
        self.stages.insert(stage, result);
        true
    }

    pub fn stage(&self, stage: StageName) -> Option<&StageResult> {
        self.stages.get(&stage)
    }

    /// The first stage in execution order with an error, as a name.
    pub fn failed_stage(&self) -> &'static str {
        self.stages
            .iter()
            .find(|(_, result)| result.is_error())
            .map(|(stage, _)| stage.as_str())
            .unwrap_or(UNKNOWN_STAGE)
    }

    /// Error message of the first failed stage.
    pub fn first_stage_error(&self) -> Option<&str> {
        self.stages
            .values()
            .find(|result| result.is_error())
            .and_then(|result| result.error.as_deref())
    }

    /// Terminate successfully. Returns false if already terminal.
    pub fn finish(&mut self) -> bool {
        self.terminate(RunStatus::Success, None)
    }

    /// Terminate with an error. Returns false if already terminal.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        self.terminate(RunStatus::Error, Some(message.into()))
    }

    fn terminate(&mut self, status: RunStatus, error: Option<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        let end_time = Local::now();
        let elapsed = end_time.signed_duration_since(self.start_time);

        self.status = status;
        self.error = error;
        self.duration_seconds = Some(elapsed.num_milliseconds().max(0) as f64 / 1000.0);
        self.end_time = Some(end_time);
        true
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// The published video, if the upload stage succeeded.
    pub fn published(&self) -> Option<&PublishResult> {
        match self.stage(StageName::YoutubeUpload)?.payload.as_ref()? {
            StagePayload::Publish(result) => Some(result),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_start_time() {
        let start = Local::now();
        let run = Run::started_at(start, Some("AI"));
        assert_eq!(run.id, start.format("%Y%m%d_%H%M%S").to_string());
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.end_time.is_none());
    }

    #[test]
    fn stage_recorded_once() {
        let mut run = Run::new(None);
        assert!(run.record_stage(StageName::ContentGeneration, StageResult::skipped()));
        assert!(!run.record_stage(StageName::ContentGeneration, StageResult::error("again")));
        assert_eq!(
            run.stage(StageName::ContentGeneration).unwrap().status,
            StageStatus::Skipped
        );
    }

    #[test]
    fn terminal_transition_happens_once() {
        let mut run = Run::new(None);
        assert!(run.fail("boom"));
        assert!(!run.finish());
        assert_eq!(run.status, RunStatus::Error);
        assert_eq!(run.error.as_deref(), Some("boom"));
        assert!(run.duration_seconds.is_some());
        assert!(!run.record_stage(StageName::VideoEditing, StageResult::skipped()));
    }

    #[test]
    fn failed_stage_is_first_error_in_order() {
        let mut run = Run::new(None);
        assert_eq!(run.failed_stage(), "unknown");

        run.record_stage(
            StageName::ContentGeneration,
            StageResult::success(StagePayload::Notification { delivered: true }, Vec::new()),
        );
        run.record_stage(StageName::ThumbnailCreation, StageResult::error("first"));
        run.record_stage(StageName::AudioProduction, StageResult::error("second"));

        assert_eq!(run.failed_stage(), "thumbnail_creation");
        assert_eq!(run.first_stage_error(), Some("first"));
    }

    #[test]
    fn serializes_stage_keys_and_status() {
        let mut run = Run::new(Some("AI"));
        run.record_stage(StageName::YoutubeUpload, StageResult::skipped());
        run.finish();

        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["stages"]["youtube_upload"]["status"], "skipped");
        assert!(json.get("error").is_none());

        let back: Run = serde_json::from_value(json).unwrap();
        assert_eq!(back.stages.len(), 1);
    }

    #[test]
    fn stage_numbers_follow_order() {
        let numbers: Vec<usize> = StageName::ALL.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
    }
}
