//! Publishing finished videos.

mod youtube;

pub use youtube::{video_resource, watch_url, UploadError, YouTubePublisher};
