//! Core types for the orchestrator pipeline.

use std::path::{Path, PathBuf};

use super::run::StagePayload;
use crate::collaborators::{Collaborators, StageError, StepResult};
use crate::logging::RunLogger;
use crate::models::{ArtifactRef, AudioArtifact, MetadataPayload, PublishResult, ScriptPayload};

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (stage_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Per-run switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Topic requested by the caller. `None` lets the script generator pick.
    pub topic: Option<String>,
    pub do_publish: bool,
    pub do_notify: bool,
}

/// Read-only context passed to pipeline steps.
///
/// Mutable state goes in [`RunState`].
pub struct Context<'a> {
    pub collaborators: &'a Collaborators,
    pub logger: &'a RunLogger,
    pub options: RunOptions,
    /// Directory for run outputs and the run record.
    pub output_dir: PathBuf,
    progress_callback: Option<&'a ProgressCallback>,
}

impl<'a> Context<'a> {
    pub fn new(
        collaborators: &'a Collaborators,
        logger: &'a RunLogger,
        options: RunOptions,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            collaborators,
            logger,
            options,
            output_dir: output_dir.into(),
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: Option<&'a ProgressCallback>) -> Self {
        self.progress_callback = callback;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, stage_name: &str, percent: u32, message: &str) {
        if let Some(callback) = self.progress_callback {
            callback(stage_name, percent, message);
        }
    }
}

/// Values handed from one stage to the next.
#[derive(Debug, Default)]
pub struct RunState {
    pub script: Option<ScriptPayload>,
    pub metadata: Option<MetadataPayload>,
    pub thumbnail: Option<ArtifactRef>,
    pub audio: Option<AudioArtifact>,
    pub video: Option<ArtifactRef>,
    pub published: Option<PublishResult>,
}

fn missing(what: &str) -> StageError {
    StageError::invalid_input(format!("No {} from an earlier stage", what))
}

impl RunState {
    pub fn script(&self) -> StepResult<&ScriptPayload> {
        self.script.as_ref().ok_or_else(|| missing("script"))
    }

    pub fn metadata(&self) -> StepResult<&MetadataPayload> {
        self.metadata.as_ref().ok_or_else(|| missing("metadata"))
    }

    pub fn thumbnail(&self) -> StepResult<&ArtifactRef> {
        self.thumbnail.as_ref().ok_or_else(|| missing("thumbnail"))
    }

    pub fn audio(&self) -> StepResult<&AudioArtifact> {
        self.audio.as_ref().ok_or_else(|| missing("audio"))
    }

    pub fn video(&self) -> StepResult<&ArtifactRef> {
        self.video.as_ref().ok_or_else(|| missing("video"))
    }
}

/// Outcome of a step execution.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Step completed with a payload for the run record.
    Success {
        payload: StagePayload,
        warnings: Vec<String>,
    },
    /// Step was skipped (with reason).
    Skipped(String),
    /// Step failed without aborting the run.
    SoftFailure(String),
}

impl StepOutcome {
    pub fn success(payload: StagePayload, warnings: Vec<String>) -> Self {
        StepOutcome::Success { payload, warnings }
    }
}

/// Progress percentage at the start of step `index`.
pub(crate) fn stage_percent(index: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((index as f64 / total as f64) * 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_state_is_invalid_input() {
        let state = RunState::default();
        let err = state.audio().unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
        assert!(err.to_string().contains("audio"));
    }

    #[test]
    fn percent_spreads_over_steps() {
        assert_eq!(stage_percent(0, 7), 0);
        assert_eq!(stage_percent(1, 4), 25);
        assert_eq!(stage_percent(3, 0), 0);
    }
}
