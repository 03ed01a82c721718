//! Pipeline runner that executes the stages in sequence.

use std::fs;
use std::path::PathBuf;

use super::errors::{PipelineError, PipelineResult};
use super::recorder::RunRecorder;
use super::run::{Run, StageResult};
use super::step::PipelineStep;
use super::steps::standard_steps;
use super::types::{stage_percent, Context, ProgressCallback, RunOptions, RunState, StepOutcome};
use crate::collaborators::{Collaborators, StepResult};
use crate::config::Settings;
use crate::logging::{LogConfig, RunLogger};
use crate::notification::error_notification;

/// Runs the seven stages for one video and records what happened.
///
/// Stages 1-5 abort the run on the first error. The upload stage records
/// its failure and lets the run finish. The notification stage never
/// fails the run.
pub struct Pipeline {
    /// Steps to execute in order.
    steps: Vec<Box<dyn PipelineStep>>,
    collaborators: Collaborators,
    recorder: RunRecorder,
    /// Directory for per-run log files. `None` logs to tracing only.
    logs_dir: Option<PathBuf>,
    log_config: LogConfig,
    progress_callback: Option<ProgressCallback>,
}

impl Pipeline {
    /// Create a pipeline with the standard stages writing to `output_dir`.
    pub fn new(collaborators: Collaborators, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            steps: standard_steps(),
            collaborators,
            recorder: RunRecorder::new(output_dir),
            logs_dir: None,
            log_config: LogConfig::default(),
            progress_callback: None,
        }
    }

    /// Wire the shipped collaborators and directories from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(Collaborators::from_settings(settings), settings.output_folder())
            .with_log_dir(settings.logs_folder(), LogConfig::from(&settings.logging))
    }

    /// Write a log file per run into `logs_dir`.
    pub fn with_log_dir(mut self, logs_dir: impl Into<PathBuf>, config: LogConfig) -> Self {
        self.logs_dir = Some(logs_dir.into());
        self.log_config = config;
        self
    }

    /// Replace the stage sequence (builder pattern).
    pub fn with_steps(mut self, steps: Vec<Box<dyn PipelineStep>>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    pub fn recorder(&self) -> &RunRecorder {
        &self.recorder
    }

    /// Get stage names in order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.stage().as_str()).collect()
    }

    /// Run every stage once for `topic`.
    ///
    /// Returns the terminal run when stages 1-5 succeed, even if the upload
    /// failed (`status == error` in that case). A stage 1-5 failure returns
    /// [`PipelineError`] carrying the original error and the run, which has
    /// already been persisted and reported by error notification.
    pub fn execute(&self, topic: Option<&str>, do_publish: bool, do_notify: bool) -> PipelineResult<Run> {
        let mut run = Run::new(topic);
        let logger = self.create_logger(&run.id);
        let options = RunOptions {
            topic: topic.map(|t| t.to_string()),
            do_publish,
            do_notify,
        };
        let ctx = Context::new(&self.collaborators, &logger, options, self.recorder.output_dir())
            .with_progress_callback(self.progress_callback.as_ref());

        logger.info(&format!(
            "Starting run {} (topic: {}, upload: {}, notify: {})",
            run.id,
            topic.unwrap_or("auto"),
            do_publish,
            do_notify
        ));

        if let Err(e) = fs::create_dir_all(ctx.output_dir()) {
            let message = format!(
                "Cannot create output directory {}: {}",
                ctx.output_dir().display(),
                e
            );
            logger.error(&message);
            run.fail(message.clone());
            self.report_failure(&ctx, &run);
            self.persist(&logger, &run);
            return Err(PipelineError::setup_failed(message, run));
        }

        let mut state = RunState::default();
        let total = self.steps.len();

        for (i, step) in self.steps.iter().enumerate() {
            let stage = step.stage();
            if !step.is_active(&ctx, &state) {
                logger.debug(&format!("{} not applicable, not recorded", stage));
                continue;
            }

            logger.stage(&format!("STAGE {}: {}", stage.number(), step.description()));
            ctx.report_progress(stage.as_str(), stage_percent(i, total), step.description());

            match Self::run_step(step.as_ref(), &ctx, &mut state) {
                Ok(StepOutcome::Success { payload, warnings }) => {
                    for warning in &warnings {
                        logger.warn(warning);
                    }
                    logger.success(&format!("{} completed", stage));
                    run.record_stage(stage, StageResult::success(payload, warnings));
                }
                Ok(StepOutcome::Skipped(reason)) => {
                    logger.info(&format!("{} skipped: {}", stage, reason));
                    run.record_stage(stage, StageResult::skipped());
                }
                Ok(StepOutcome::SoftFailure(message)) => {
                    logger.error(&format!("{} failed: {}", stage, message));
                    run.record_stage(stage, StageResult::error(message));
                }
                Err(e) => {
                    logger.error(&format!("{} failed: {}", stage, e));

                    let message = e.message();
                    run.record_stage(stage, StageResult::error(message.clone()));
                    run.fail(message);
                    self.report_failure(&ctx, &run);
                    self.persist(&logger, &run);
                    return Err(PipelineError::stage_failed(stage, e, run));
                }
            }
        }

        match run.first_stage_error().map(|e| e.to_string()) {
            Some(message) => {
                logger.warn(&format!("Run finished with errors at {}", run.failed_stage()));
                run.fail(message);
            }
            None => {
                logger.success("Pipeline completed successfully");
                run.finish();
            }
        }

        ctx.report_progress("complete", 100, "Pipeline finished");
        self.persist(&logger, &run);
        Ok(run)
    }

    fn run_step(step: &dyn PipelineStep, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        ctx.logger.debug(&format!("Validating input for '{}'", step.stage()));
        step.validate_input(ctx, state)?;

        ctx.logger.debug(&format!("Executing '{}'", step.stage()));
        let outcome = step.execute(ctx, state)?;

        if matches!(outcome, StepOutcome::Success { .. }) {
            ctx.logger.debug(&format!("Validating output for '{}'", step.stage()));
            step.validate_output(ctx, state)?;
        }
        Ok(outcome)
    }

    /// Best-effort error notification for an aborted run.
    fn report_failure(&self, ctx: &Context, run: &Run) {
        if !ctx.options.do_notify {
            return;
        }
        let message = run.error.as_deref().unwrap_or("unknown error");
        let notification = error_notification(message, run.failed_stage());

        match self.collaborators.notifier.get() {
            Ok(notifier) => {
                if notifier.notify_error(&notification) {
                    ctx.logger.info("Error notification sent");
                } else {
                    ctx.logger.warn("Error notification was not delivered");
                }
            }
            Err(e) => ctx.logger.warn(&format!("Error notification skipped: {}", e)),
        }
    }

    /// Write the run record. A failed write is logged, never raised.
    fn persist(&self, logger: &RunLogger, run: &Run) {
        match self.recorder.save(run) {
            Ok(path) => logger.info(&format!("Results saved to {}", path.display())),
            Err(e) => logger.warn(&format!("Could not save results: {}", e)),
        }
        logger.flush();
    }

    fn create_logger(&self, run_id: &str) -> RunLogger {
        let Some(dir) = &self.logs_dir else {
            return RunLogger::detached(run_id, self.log_config.clone());
        };
        RunLogger::new(run_id, dir, self.log_config.clone()).unwrap_or_else(|e| {
            tracing::warn!("Cannot open run log in {}: {}", dir.display(), e);
            RunLogger::detached(run_id, self.log_config.clone())
        })
    }
}
