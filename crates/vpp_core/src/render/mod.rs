//! Media rendering collaborators backed by external tools.
//!
//! Every renderer builds an argument list, runs the tool through
//! [`command::run_tool`] and checks what came out. Tool failures become
//! `StageError::Render` with the tail of the tool's stderr.

pub mod command;
mod audio;
mod thumbnail;
mod video;

pub use audio::{CommandAudioRenderer, MusicSource};
pub use command::CommandError;
pub use thumbnail::{wrap_text, ColorScheme, FfmpegThumbnailRenderer, COLOR_SCHEMES};
pub use video::{section_overlays, FfmpegVideoRenderer, TitleOverlay};
