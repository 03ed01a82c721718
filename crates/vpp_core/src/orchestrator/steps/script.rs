//! Stage 1: script generation.

use crate::collaborators::{StageError, StepResult};
use crate::orchestrator::run::{StageName, StagePayload};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct ScriptStep;

impl PipelineStep for ScriptStep {
    fn stage(&self) -> StageName {
        StageName::ContentGeneration
    }

    fn description(&self) -> &str {
        "Generating script"
    }

    fn validate_input(&self, _ctx: &Context, _state: &RunState) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let generator = ctx.collaborators.script.get()?;
        let generated = generator.generate(ctx.options.topic.as_deref())?;
        let script = generated.value;

        let path = generator.persist(&script)?;
        ctx.logger.info(&format!(
            "Script for '{}' with {} sections saved to {}",
            script.topic,
            script.main_content.len(),
            path.display()
        ));

        state.script = Some(script.clone());
        Ok(StepOutcome::success(
            StagePayload::Script(script),
            generated.warnings,
        ))
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.script.is_none() {
            return Err(StageError::invalid_output("Script not recorded"));
        }
        Ok(())
    }
}
