//! Stage 6: upload.
//!
//! Never aborts the run. Failures are recorded on the stage and turn the
//! run status to error once all stages have run.

use crate::collaborators::StepResult;
use crate::models::PublishOutcome;
use crate::orchestrator::run::{StageName, StagePayload};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct PublishStep;

impl PipelineStep for PublishStep {
    fn stage(&self) -> StageName {
        StageName::YoutubeUpload
    }

    fn description(&self) -> &str {
        "Uploading video"
    }

    fn validate_input(&self, ctx: &Context, state: &RunState) -> StepResult<()> {
        if ctx.options.do_publish {
            state.video()?;
            state.metadata()?;
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        if !ctx.options.do_publish {
            return Ok(StepOutcome::Skipped("upload disabled".to_string()));
        }

        let publisher = match ctx.collaborators.publisher.get() {
            Ok(publisher) => publisher,
            Err(e) => return Ok(StepOutcome::SoftFailure(e.message())),
        };

        let outcome = publisher.publish(state.video()?, state.metadata()?, state.thumbnail.as_ref());
        match outcome {
            PublishOutcome::Published(result) => {
                ctx.logger.info(&format!("Published: {}", result.video_url));
                state.published = Some(result.clone());
                Ok(StepOutcome::success(StagePayload::Publish(result), Vec::new()))
            }
            PublishOutcome::Failed(failure) => Ok(StepOutcome::SoftFailure(failure.message)),
        }
    }
}
