//! Upload to YouTube with the Data API v3 resumable protocol.
//!
//! Token issuance and refresh are handled outside this crate; the publisher
//! reads a ready access token from the configured environment variable.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Body, Client};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use serde_json::{json, Value};
use thiserror::Error;

use crate::collaborators::Publisher;
use crate::config::YouTubeSettings;
use crate::models::{ArtifactRef, MetadataPayload, PublishOutcome, PublishResult};

/// Upload timeout; large videos over slow links take a while.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60 * 60);

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("YouTube access token not found: set the {0} environment variable")]
    MissingToken(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("YouTube API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Upload session response had no Location header")]
    MissingSession,

    #[error("Upload response had no video id")]
    MissingVideoId,

    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub struct YouTubePublisher {
    client: Client,
    access_token: String,
    settings: YouTubeSettings,
}

impl YouTubePublisher {
    pub fn from_settings(settings: &YouTubeSettings) -> Result<Self, UploadError> {
        let access_token = std::env::var(&settings.access_token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| UploadError::MissingToken(settings.access_token_env.clone()))?;

        let client = Client::builder().timeout(UPLOAD_TIMEOUT).build()?;

        Ok(Self {
            client,
            access_token,
            settings: settings.clone(),
        })
    }

    /// Upload the video and return its id.
    fn upload_video(&self, video: &Path, metadata: &MetadataPayload) -> Result<String, UploadError> {
        let file = open(video)?;
        let size = file
            .metadata()
            .map_err(|e| io_error(video, e))?
            .len();

        let session = self
            .client
            .post(&self.settings.upload_url)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .bearer_auth(&self.access_token)
            .header("X-Upload-Content-Type", "video/mp4")
            .header("X-Upload-Content-Length", size.to_string())
            .json(&video_resource(metadata, &self.settings))
            .send()?;
        let session = check_status(session)?;

        let upload_url = session
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or(UploadError::MissingSession)?;

        tracing::info!("Uploading {} ({} bytes)", video.display(), size);
        let response = self
            .client
            .put(&upload_url)
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, "video/mp4")
            .header(CONTENT_LENGTH, size)
            .body(Body::from(file))
            .send()?;
        let response = check_status(response)?;

        let json: Value = response.json()?;
        json["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or(UploadError::MissingVideoId)
    }

    fn upload_thumbnail(&self, video_id: &str, thumbnail: &Path) -> Result<(), UploadError> {
        let file = open(thumbnail)?;
        let response = self
            .client
            .post(&self.settings.thumbnail_url)
            .query(&[("videoId", video_id)])
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, "image/png")
            .body(Body::from(file))
            .send()?;
        check_status(response)?;
        Ok(())
    }
}

impl Publisher for YouTubePublisher {
    fn publish(
        &self,
        video: &ArtifactRef,
        metadata: &MetadataPayload,
        thumbnail: Option<&ArtifactRef>,
    ) -> PublishOutcome {
        tracing::info!("Publishing \"{}\"", metadata.title);

        let video_id = match self.upload_video(video.path(), metadata) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!("Upload failed: {}", e);
                return PublishOutcome::failed(e.to_string());
            }
        };

        // A rejected thumbnail (unverified channel etc.) does not undo the upload.
        if let Some(thumbnail) = thumbnail.filter(|t| t.path().exists()) {
            if let Err(e) = self.upload_thumbnail(&video_id, thumbnail.path()) {
                tracing::warn!("Thumbnail upload failed: {}", e);
            }
        }

        PublishOutcome::Published(PublishResult {
            video_url: watch_url(&video_id),
            video_id,
            title: metadata.title.clone(),
        })
    }
}

/// Request body for `videos.insert`.
pub fn video_resource(metadata: &MetadataPayload, settings: &YouTubeSettings) -> Value {
    let title = if metadata.title.trim().is_empty() {
        "Untitled Video"
    } else {
        metadata.title.as_str()
    };
    json!({
        "snippet": {
            "title": title,
            "description": metadata.description,
            "tags": metadata.tags,
            "categoryId": settings.category_id,
        },
        "status": {
            "privacyStatus": settings.privacy,
            "selfDeclaredMadeForKids": false,
        }
    })
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

fn open(path: &Path) -> Result<File, UploadError> {
    File::open(path).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> UploadError {
    UploadError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, UploadError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(UploadError::Api {
        status: status.as_u16(),
        body: response.text().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_carries_metadata_and_settings() {
        let metadata = MetadataPayload {
            title: "Rust Explained".to_string(),
            description: "All about Rust".to_string(),
            tags: vec!["rust".to_string()],
            ..Default::default()
        };
        let resource = video_resource(&metadata, &YouTubeSettings::default());

        assert_eq!(resource["snippet"]["title"], "Rust Explained");
        assert_eq!(resource["snippet"]["categoryId"], "28");
        assert_eq!(resource["snippet"]["tags"][0], "rust");
        assert_eq!(resource["status"]["privacyStatus"], "public");
        assert_eq!(resource["status"]["selfDeclaredMadeForKids"], false);
    }

    #[test]
    fn empty_title_gets_placeholder() {
        let resource = video_resource(&MetadataPayload::default(), &YouTubeSettings::default());
        assert_eq!(resource["snippet"]["title"], "Untitled Video");
    }

    #[test]
    fn watch_url_format() {
        assert_eq!(watch_url("abc123"), "https://www.youtube.com/watch?v=abc123");
    }

    #[test]
    fn missing_token_is_reported() {
        let settings = YouTubeSettings {
            access_token_env: "VPP_TEST_UNSET_YT_TOKEN".to_string(),
            ..Default::default()
        };
        let err = YouTubePublisher::from_settings(&settings).err().unwrap();
        assert!(matches!(err, UploadError::MissingToken(ref v) if v == "VPP_TEST_UNSET_YT_TOKEN"));
    }

    #[test]
    fn unreadable_video_is_failed_outcome() {
        let publisher = YouTubePublisher {
            client: Client::new(),
            access_token: "token".to_string(),
            settings: YouTubeSettings::default(),
        };
        let outcome = publisher.publish(
            &ArtifactRef::new("/nonexistent/video.mp4"),
            &MetadataPayload::default(),
            None,
        );
        assert!(matches!(outcome, PublishOutcome::Failed(ref f) if f.message.contains("video.mp4")));
    }
}
