//! Stage 7: success notification.

use crate::collaborators::StepResult;
use crate::orchestrator::run::{StageName, StagePayload};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct NotifyStep;

impl PipelineStep for NotifyStep {
    fn stage(&self) -> StageName {
        StageName::EmailNotification
    }

    fn description(&self) -> &str {
        "Sending notification"
    }

    /// Only after a successful upload.
    fn is_active(&self, ctx: &Context, state: &RunState) -> bool {
        ctx.options.do_notify && state.published.is_some()
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        state.metadata().map(|_| ())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let Some(published) = state.published.as_ref() else {
            return Ok(StepOutcome::Skipped("nothing was published".to_string()));
        };

        let mut warnings = Vec::new();
        let delivered = match ctx.collaborators.notifier.get() {
            Ok(notifier) => notifier.notify_success(published, state.metadata()?),
            Err(e) => {
                warnings.push(e.to_string());
                false
            }
        };
        if !delivered {
            warnings.push("Success notification was not delivered".to_string());
        }

        Ok(StepOutcome::success(
            StagePayload::Notification { delivered },
            warnings,
        ))
    }
}
