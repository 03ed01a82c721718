//! Configuration management for the video publishing pipeline.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Validation on load with automatic defaults
//!
//! # Example
//!
//! ```no_run
//! use vpp_core::config::ConfigManager;
//!
//! let mut config = ConfigManager::new("vpp.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Output folder: {}", config.settings().paths.output_folder);
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    AudioSettings, ConfigSection, ContentSettings, EmailSettings, LoggingSettings, PathSettings,
    Settings, ThumbnailSettings, VideoSettings, YouTubeSettings,
};
