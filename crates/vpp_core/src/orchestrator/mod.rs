//! Pipeline orchestration.
//!
//! [`Pipeline::execute`] runs the stages in order against a set of
//! [`Collaborators`](crate::collaborators::Collaborators), records each
//! attempted stage in a [`Run`] and persists the run with [`RunRecorder`].

mod errors;
mod pipeline;
mod recorder;
mod run;
mod step;
pub mod steps;
mod types;

pub use errors::{PipelineError, PipelineResult};
pub use pipeline::Pipeline;
pub use recorder::RunRecorder;
pub use run::{Run, RunStatus, StageName, StagePayload, StageResult, StageStatus, UNKNOWN_STAGE};
pub use step::PipelineStep;
pub use types::{Context, ProgressCallback, RunOptions, RunState, StepOutcome};
