//! Stage 4: narration and music.

use crate::collaborators::{StageError, StepResult};
use crate::orchestrator::run::{StageName, StagePayload};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct AudioStep;

impl PipelineStep for AudioStep {
    fn stage(&self) -> StageName {
        StageName::AudioProduction
    }

    fn description(&self) -> &str {
        "Producing audio"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        state.script().map(|_| ())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let narration = ctx
            .collaborators
            .script
            .get()?
            .flatten_for_narration(state.script()?);
        ctx.logger
            .debug(&format!("Narration is {} characters", narration.chars().count()));

        let generated = ctx.collaborators.audio.get()?.render(&narration)?;
        ctx.logger.info(&format!(
            "Audio: {} ({:.1}s)",
            generated.value.audio.path().display(),
            generated.value.duration_seconds
        ));

        state.audio = Some(generated.value.clone());
        Ok(StepOutcome::success(
            StagePayload::Audio(generated.value),
            generated.warnings,
        ))
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        let duration = state.audio()?.duration_seconds;
        if !(duration.is_finite() && duration > 0.0) {
            return Err(StageError::invalid_output(format!(
                "Audio duration must be positive, got {}",
                duration
            )));
        }
        Ok(())
    }
}
