//! Stage 2: SEO metadata.

use crate::collaborators::StepResult;
use crate::orchestrator::run::{StageName, StagePayload};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct MetadataStep;

impl PipelineStep for MetadataStep {
    fn stage(&self) -> StageName {
        StageName::SeoOptimization
    }

    fn description(&self) -> &str {
        "Optimizing metadata"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        state.script().map(|_| ())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let generator = ctx.collaborators.metadata.get()?;
        let generated = generator.generate(state.script()?)?;
        let mut metadata = generated.value;

        // The caption goes through the persisted metadata to the thumbnail stage.
        metadata.thumbnail_text = Some(generator.derive_thumbnail_caption(&metadata));

        let path = generator.persist(&metadata)?;
        ctx.logger.info(&format!(
            "Title '{}', {} tags, saved to {}",
            metadata.title,
            metadata.tags.len(),
            path.display()
        ));

        state.metadata = Some(metadata.clone());
        Ok(StepOutcome::success(
            StagePayload::Metadata(metadata),
            generated.warnings,
        ))
    }
}
