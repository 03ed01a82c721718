//! Pipeline step trait definition.

use super::run::StageName;
use super::types::{Context, RunState, StepOutcome};
use crate::collaborators::StepResult;

/// One stage of the pipeline.
///
/// The runner calls, in order:
///
/// 1. `is_active` - a false return means the stage leaves no record at all
/// 2. `validate_input` - check values from earlier stages
/// 3. `execute` - do the work and store results in `state`
/// 4. `validate_output` - only after `StepOutcome::Success`
///
/// An `Err` from any of these aborts the run. Steps that must not abort
/// the run return `StepOutcome::SoftFailure` instead.
pub trait PipelineStep {
    fn stage(&self) -> StageName;

    /// Human readable description for logs and progress.
    fn description(&self) -> &str;

    fn is_active(&self, _ctx: &Context, _state: &RunState) -> bool {
        true
    }

    fn validate_input(&self, ctx: &Context, state: &RunState) -> StepResult<()>;

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome>;

    fn validate_output(&self, _ctx: &Context, _state: &RunState) -> StepResult<()> {
        Ok(())
    }
}
