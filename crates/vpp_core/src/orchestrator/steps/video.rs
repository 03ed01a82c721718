//! Stage 5: video assembly.

use crate::collaborators::StepResult;
use crate::orchestrator::run::{StageName, StagePayload};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct VideoStep;

impl PipelineStep for VideoStep {
    fn stage(&self) -> StageName {
        StageName::VideoEditing
    }

    fn description(&self) -> &str {
        "Editing video"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        state.script()?;
        state.thumbnail()?;
        state.audio()?;
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let renderer = ctx.collaborators.video.get()?;
        let generated = renderer.render(state.audio()?, state.thumbnail()?, state.script()?)?;
        ctx.logger
            .info(&format!("Video: {}", generated.value.path().display()));

        state.video = Some(generated.value.clone());
        Ok(StepOutcome::success(
            StagePayload::Artifact(generated.value),
            generated.warnings,
        ))
    }
}
