//! VPP Core - backend for the video publishing pipeline
//!
//! Turns a topic into a published video in seven stages: script, SEO
//! metadata, thumbnail, audio, video, upload and notification. Every run
//! is recorded as a [`orchestrator::Run`] and written to the output folder.
//!
//! The crate has no terminal or UI code; the `vpp` binary drives it.

pub mod collaborators;
pub mod config;
pub mod content;
pub mod logging;
pub mod models;
pub mod notification;
pub mod orchestrator;
pub mod publish;
pub mod render;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
