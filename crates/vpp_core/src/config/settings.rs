//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Secrets never live in the file: sections name the environment variables
//! that hold them, and collaborators resolve those at construction time.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Output, log and asset directories.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Script and metadata generation.
    #[serde(default)]
    pub content: ContentSettings,

    /// Narration and background music.
    #[serde(default)]
    pub audio: AudioSettings,

    /// Final video assembly.
    #[serde(default)]
    pub video: VideoSettings,

    /// Thumbnail rendering.
    #[serde(default)]
    pub thumbnail: ThumbnailSettings,

    /// YouTube upload.
    #[serde(default)]
    pub youtube: YouTubeSettings,

    /// Email notifications.
    #[serde(default)]
    pub email: EmailSettings,
}

impl Settings {
    pub fn output_folder(&self) -> PathBuf {
        PathBuf::from(&self.paths.output_folder)
    }

    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.paths.logs_folder)
    }

    pub fn assets_folder(&self) -> PathBuf {
        PathBuf::from(&self.paths.assets_folder)
    }
}

/// Path configuration for output, logs and assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder for scripts, metadata, media artifacts and run records.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Folder for per-run log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Folder holding optional assets (background music).
    #[serde(default = "default_assets_folder")]
    pub assets_folder: String,
}

fn default_output_folder() -> String {
    "output".to_string()
}

fn default_logs_folder() -> String {
    "logs".to_string()
}

fn default_assets_folder() -> String {
    "assets".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            logs_folder: default_logs_folder(),
            assets_folder: default_assets_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level written to the run log.
    #[serde(default)]
    pub level: LogLevel,

    /// Prefix run log lines with a timestamp.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            show_timestamps: true,
        }
    }
}

/// Chat-completions service used for scripts and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSettings {
    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model name sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Channel name used in notification emails.
    #[serde(default = "default_channel_name")]
    pub channel_name: String,

    /// Content language.
    #[serde(default = "default_language")]
    pub language: String,

    /// Evergreen topics picked from when no topic is supplied.
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_channel_name() -> String {
    "Tech Master".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_topics() -> Vec<String> {
    [
        "artificial intelligence basics",
        "cybersecurity tips",
        "programming fundamentals",
        "cloud computing explained",
        "blockchain technology",
        "machine learning concepts",
        "web development best practices",
        "mobile app development",
        "data science fundamentals",
        "internet of things (IoT)",
        "quantum computing basics",
        "5G technology explained",
        "virtual reality and augmented reality",
        "software engineering principles",
        "database management systems",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            channel_name: default_channel_name(),
            language: default_language(),
            topics: default_topics(),
        }
    }
}

/// Narration and music settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Text-to-speech executable.
    #[serde(default = "default_tts_command")]
    pub tts_command: String,

    /// TTS arguments. `{input}` and `{output}` are replaced with the
    /// narration text file and the target WAV file.
    #[serde(default = "default_tts_args")]
    pub tts_args: Vec<String>,

    /// Background music file. Relative paths resolve against the assets folder.
    #[serde(default)]
    pub background_music: Option<String>,

    /// Music volume relative to the narration (0.0 - 1.0).
    #[serde(default = "default_music_volume")]
    pub music_volume: f64,

    /// ffmpeg executable.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    /// ffprobe executable.
    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,
}

fn default_tts_command() -> String {
    "espeak-ng".to_string()
}

fn default_tts_args() -> Vec<String> {
    vec![
        "-w".to_string(),
        "{output}".to_string(),
        "-f".to_string(),
        "{input}".to_string(),
    ]
}

fn default_music_volume() -> f64 {
    0.1
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            tts_command: default_tts_command(),
            tts_args: default_tts_args(),
            background_music: None,
            music_volume: default_music_volume(),
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
        }
    }
}

/// Video output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSettings {
    #[serde(default = "default_video_width")]
    pub width: u32,

    #[serde(default = "default_video_height")]
    pub height: u32,

    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_video_width() -> u32 {
    1920
}

fn default_video_height() -> u32 {
    1080
}

fn default_fps() -> u32 {
    30
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: default_video_width(),
            height: default_video_height(),
            fps: default_fps(),
        }
    }
}

/// Thumbnail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailSettings {
    #[serde(default = "default_thumbnail_width")]
    pub width: u32,

    #[serde(default = "default_thumbnail_height")]
    pub height: u32,

    /// Font used for the caption. ffmpeg's default font when unset.
    #[serde(default)]
    pub font_file: Option<String>,
}

fn default_thumbnail_width() -> u32 {
    1280
}

fn default_thumbnail_height() -> u32 {
    720
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            width: default_thumbnail_width(),
            height: default_thumbnail_height(),
            font_file: None,
        }
    }
}

/// YouTube upload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeSettings {
    /// Video category (28 = Science & Technology).
    #[serde(default = "default_category_id")]
    pub category_id: String,

    /// public, private or unlisted.
    #[serde(default = "default_privacy")]
    pub privacy: String,

    /// Environment variable holding an OAuth access token.
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,

    /// Resumable upload endpoint.
    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Thumbnail upload endpoint.
    #[serde(default = "default_thumbnail_url")]
    pub thumbnail_url: String,
}

fn default_category_id() -> String {
    "28".to_string()
}

fn default_privacy() -> String {
    "public".to_string()
}

fn default_access_token_env() -> String {
    "YOUTUBE_ACCESS_TOKEN".to_string()
}

fn default_upload_url() -> String {
    "https://www.googleapis.com/upload/youtube/v3/videos".to_string()
}

fn default_thumbnail_url() -> String {
    "https://www.googleapis.com/upload/youtube/v3/thumbnails/set".to_string()
}

impl Default for YouTubeSettings {
    fn default() -> Self {
        Self {
            category_id: default_category_id(),
            privacy: default_privacy(),
            access_token_env: default_access_token_env(),
            upload_url: default_upload_url(),
            thumbnail_url: default_thumbnail_url(),
        }
    }
}

/// SMTP notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSettings {
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Environment variable holding the sender address (also the SMTP user).
    #[serde(default = "default_sender_env")]
    pub sender_env: String,

    /// Environment variable holding the SMTP password.
    #[serde(default = "default_password_env")]
    pub password_env: String,

    /// Environment variable holding the recipient. Falls back to the sender.
    #[serde(default = "default_recipient_env")]
    pub recipient_env: String,
}

fn default_smtp_server() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_sender_env() -> String {
    "SMTP_EMAIL".to_string()
}

fn default_password_env() -> String {
    "SMTP_PASSWORD".to_string()
}

fn default_recipient_env() -> String {
    "NOTIFICATION_EMAIL".to_string()
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_server: default_smtp_server(),
            smtp_port: default_smtp_port(),
            sender_env: default_sender_env(),
            password_env: default_password_env(),
            recipient_env: default_recipient_env(),
        }
    }
}

/// Names of config sections, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Logging,
    Content,
    Audio,
    Video,
    Thumbnail,
    YouTube,
    Email,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 8] = [
        ConfigSection::Paths,
        ConfigSection::Logging,
        ConfigSection::Content,
        ConfigSection::Audio,
        ConfigSection::Video,
        ConfigSection::Thumbnail,
        ConfigSection::YouTube,
        ConfigSection::Email,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Logging => "logging",
            ConfigSection::Content => "content",
            ConfigSection::Audio => "audio",
            ConfigSection::Video => "video",
            ConfigSection::Thumbnail => "thumbnail",
            ConfigSection::YouTube => "youtube",
            ConfigSection::Email => "email",
        }
    }

    /// Comment written above the section in generated files.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Output, log and asset directories",
            ConfigSection::Logging => "Run log configuration",
            ConfigSection::Content => "Script and SEO metadata generation (OpenAI-compatible API)",
            ConfigSection::Audio => "Narration (TTS command) and background music",
            ConfigSection::Video => "Final video assembly",
            ConfigSection::Thumbnail => "Thumbnail rendering",
            ConfigSection::YouTube => "YouTube upload",
            ConfigSection::Email => "Email notifications",
        }
    }

    pub fn is_known(name: &str) -> bool {
        Self::ALL.iter().any(|s| s.table_name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[youtube]"));
        assert!(toml.contains("output_folder"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[paths]\noutput_folder = \"custom_output\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.paths.output_folder, "custom_output");
        assert_eq!(parsed.paths.logs_folder, "logs");
        assert_eq!(parsed.content.model, "gpt-4o-mini");
        assert_eq!(parsed.content.topics.len(), 15);
        assert_eq!(parsed.email.smtp_port, 587);
    }

    #[test]
    fn section_names_are_known() {
        assert!(ConfigSection::is_known("youtube"));
        assert!(ConfigSection::is_known("paths"));
        assert!(!ConfigSection::is_known("analysis"));
    }
}
