//! Stage 3: thumbnail.

use crate::collaborators::StepResult;
use crate::models::derive_subtitle;
use crate::orchestrator::run::{StageName, StagePayload};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct ThumbnailStep;

impl PipelineStep for ThumbnailStep {
    fn stage(&self) -> StageName {
        StageName::ThumbnailCreation
    }

    fn description(&self) -> &str {
        "Creating thumbnail"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        state.metadata().map(|_| ())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let metadata = state.metadata()?;
        let caption = metadata.thumbnail_caption();
        let subtitle = derive_subtitle(&metadata.title);

        let renderer = ctx.collaborators.thumbnail.get()?;
        let generated = renderer.render(&caption, subtitle.as_deref())?;
        ctx.logger
            .info(&format!("Thumbnail: {}", generated.value.path().display()));

        state.thumbnail = Some(generated.value.clone());
        Ok(StepOutcome::success(
            StagePayload::Artifact(generated.value),
            generated.warnings,
        ))
    }
}
