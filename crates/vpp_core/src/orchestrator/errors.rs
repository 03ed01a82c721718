//! Error types for the orchestrator.
//!
//! A failed run still carries its record: callers get the original stage
//! error plus the terminal, already persisted [`Run`].

use thiserror::Error;

use super::run::{Run, StageName};
use crate::collaborators::StageError;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// A fail-fast stage failed.
    #[error("Run {} failed at stage '{stage}': {source}", .run.id)]
    StageFailed {
        stage: StageName,
        #[source]
        source: StageError,
        run: Box<Run>,
    },

    /// The run could not start (output directory etc.).
    #[error("Run {} setup failed: {message}", .run.id)]
    SetupFailed { message: String, run: Box<Run> },
}

impl PipelineError {
    pub fn stage_failed(stage: StageName, source: StageError, run: Run) -> Self {
        Self::StageFailed {
            stage,
            source,
            run: Box::new(run),
        }
    }

    pub fn setup_failed(message: impl Into<String>, run: Run) -> Self {
        Self::SetupFailed {
            message: message.into(),
            run: Box::new(run),
        }
    }

    /// The recorded run.
    pub fn run(&self) -> &Run {
        match self {
            PipelineError::StageFailed { run, .. } => run,
            PipelineError::SetupFailed { run, .. } => run,
        }
    }

    pub fn into_run(self) -> Run {
        match self {
            PipelineError::StageFailed { run, .. } => *run,
            PipelineError::SetupFailed { run, .. } => *run,
        }
    }

    /// Stage the failure is attributed to.
    pub fn failed_stage(&self) -> &'static str {
        self.run().failed_stage()
    }
}

/// Result type for pipeline runs.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::run::StageResult;

    #[test]
    fn stage_failure_chains_context() {
        let mut run = Run::new(None);
        run.record_stage(StageName::AudioProduction, StageResult::error("disk full"));
        run.fail("disk full");
        let id = run.id.clone();

        let err = PipelineError::stage_failed(
            StageName::AudioProduction,
            StageError::render("disk full"),
            run,
        );
        let msg = err.to_string();
        assert!(msg.contains(&id));
        assert!(msg.contains("audio_production"));
        assert_eq!(err.failed_stage(), "audio_production");
    }

    #[test]
    fn setup_failure_is_unattributed() {
        let mut run = Run::new(None);
        run.fail("cannot create output");
        let err = PipelineError::setup_failed("cannot create output", run);
        assert_eq!(err.failed_stage(), "unknown");
        assert!(err.run().stages.is_empty());
    }
}
