//! Artifacts produced by rendering stages and the publish outcome.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Durable output of a rendering stage (a file on disk).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub path: PathBuf,
}

impl ArtifactRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Narration audio with its duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioArtifact {
    pub audio: ArtifactRef,
    pub duration_seconds: f64,
}

impl AudioArtifact {
    pub fn new(path: impl Into<PathBuf>, duration_seconds: f64) -> Self {
        Self {
            audio: ArtifactRef::new(path),
            duration_seconds,
        }
    }
}

/// A successfully published video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    pub video_id: String,
    pub video_url: String,
    pub title: String,
}

/// A rejected or interrupted upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishFailure {
    pub message: String,
}

impl PublishFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Tagged publish result. Upload problems are data, never a raised error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum PublishOutcome {
    #[serde(rename = "success")]
    Published(PublishResult),
    #[serde(rename = "error")]
    Failed(PublishFailure),
}

impl PublishOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(PublishFailure::new(message))
    }

    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_outcome_is_status_tagged() {
        let published = PublishOutcome::Published(PublishResult {
            video_id: "abc".to_string(),
            video_url: "https://www.youtube.com/watch?v=abc".to_string(),
            title: "Title".to_string(),
        });
        let json = serde_json::to_value(&published).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["video_id"], "abc");

        let failed = PublishOutcome::failed("quota exceeded");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "quota exceeded");
        assert!(!failed.is_published());
    }
}
