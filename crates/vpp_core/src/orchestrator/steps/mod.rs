//! The seven pipeline stages.

mod audio;
mod metadata;
mod notify;
mod publish;
mod script;
mod thumbnail;
mod video;

pub use audio::AudioStep;
pub use metadata::MetadataStep;
pub use notify::NotifyStep;
pub use publish::PublishStep;
pub use script::ScriptStep;
pub use thumbnail::ThumbnailStep;
pub use video::VideoStep;

use super::step::PipelineStep;

/// All stages in execution order.
pub fn standard_steps() -> Vec<Box<dyn PipelineStep>> {
    vec![
        Box::new(ScriptStep),
        Box::new(MetadataStep),
        Box::new(ThumbnailStep),
        Box::new(AudioStep),
        Box::new(VideoStep),
        Box::new(PublishStep),
        Box::new(NotifyStep),
    ]
}
