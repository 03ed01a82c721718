//! Thumbnail rendering with ffmpeg's lavfi sources.

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use rand::seq::SliceRandom;

use super::command::{escape_drawtext, escape_filter_path, run_tool};
use crate::collaborators::{Generated, StageError, StepResult, ThumbnailRenderer};
use crate::config::ThumbnailSettings;
use crate::models::ArtifactRef;

/// Maximum caption line length before wrapping.
const CAPTION_WRAP: usize = 20;

/// Background and accent colors for the thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub background: &'static str,
    pub accent: &'static str,
}

pub const COLOR_SCHEMES: [ColorScheme; 5] = [
    ColorScheme { background: "0x1E1E2E", accent: "0x89B4FA" },
    ColorScheme { background: "0x111827", accent: "0x22D3EE" },
    ColorScheme { background: "0x581C87", accent: "0xFACC15" },
    ColorScheme { background: "0x0F172A", accent: "0x38BDF8" },
    ColorScheme { background: "0x14532D", accent: "0x86EFAC" },
];

/// Renders a PNG with the caption centered and an optional subtitle below.
pub struct FfmpegThumbnailRenderer {
    settings: ThumbnailSettings,
    ffmpeg: String,
    output_dir: PathBuf,
}

impl FfmpegThumbnailRenderer {
    pub fn new(settings: ThumbnailSettings, ffmpeg: String, output_dir: PathBuf) -> Self {
        Self {
            settings,
            ffmpeg,
            output_dir,
        }
    }

    /// Build the ffmpeg arguments for one thumbnail.
    pub fn build_args(
        &self,
        caption: &str,
        subtitle: Option<&str>,
        scheme: ColorScheme,
        output: &std::path::Path,
    ) -> Vec<String> {
        let width = self.settings.width;
        let height = self.settings.height;
        let font = self
            .settings
            .font_file
            .as_deref()
            .map(|f| format!("fontfile='{}':", escape_filter_path(std::path::Path::new(f))))
            .unwrap_or_default();

        let border = (height / 48).max(4);
        let mut filters = vec![format!(
            "drawbox=x=0:y=0:w=iw:h=ih:color={}:t={}",
            scheme.accent, border
        )];

        let caption = wrap_text(caption, CAPTION_WRAP);
        filters.push(format!(
            "drawtext={}text='{}':fontcolor=white:fontsize={}:line_spacing=10:\
             shadowcolor=black:shadowx=4:shadowy=4:x=(w-text_w)/2:y=(h-text_h)/2-{}",
            font,
            escape_drawtext(&caption),
            height / 6,
            if subtitle.is_some() { height / 12 } else { 0 }
        ));

        if let Some(subtitle) = subtitle {
            filters.push(format!(
                "drawtext={}text='{}':fontcolor={}:fontsize={}:x=(w-text_w)/2:y=h-h/4",
                font,
                escape_drawtext(subtitle),
                scheme.accent,
                height / 14
            ));
        }

        vec![
            "-y".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-f".to_string(),
            "lavfi".to_string(),
            "-i".to_string(),
            format!("color=c={}:s={}x{}", scheme.background, width, height),
            "-vf".to_string(),
            filters.join(","),
            "-frames:v".to_string(),
            "1".to_string(),
            output.display().to_string(),
        ]
    }
}

impl ThumbnailRenderer for FfmpegThumbnailRenderer {
    fn render(&self, caption: &str, subtitle: Option<&str>) -> StepResult<Generated<ArtifactRef>> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| StageError::storage("creating thumbnail directory", e))?;

        let output = self.output_dir.join(format!(
            "thumbnail_{}.png",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        let scheme = COLOR_SCHEMES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(COLOR_SCHEMES[0]);

        tracing::info!("Creating thumbnail with text: {}", caption);
        let args = self.build_args(caption, subtitle, scheme, &output);
        run_tool(&self.ffmpeg, &args)?;

        if !output.exists() {
            return Err(StageError::render(format!(
                "ffmpeg reported success but {} is missing",
                output.display()
            )));
        }

        Ok(Generated::new(ArtifactRef::new(output)))
    }
}

/// Greedy word wrap at `width` characters.
pub fn wrap_text(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn renderer() -> FfmpegThumbnailRenderer {
        FfmpegThumbnailRenderer::new(
            ThumbnailSettings::default(),
            "ffmpeg".to_string(),
            PathBuf::from("out"),
        )
    }

    #[test]
    fn wraps_long_captions() {
        assert_eq!(wrap_text("MACHINE LEARNING EXPLAINED", 20), "MACHINE LEARNING\nEXPLAINED");
        assert_eq!(wrap_text("AI", 20), "AI");
        assert_eq!(wrap_text("", 20), "");
    }

    #[test]
    fn args_use_configured_size() {
        let args = renderer().build_args("AI", None, COLOR_SCHEMES[0], Path::new("out/t.png"));
        assert!(args.contains(&"color=c=0x1E1E2E:s=1280x720".to_string()));
        assert_eq!(args.last().unwrap(), "out/t.png");
    }

    #[test]
    fn subtitle_adds_second_drawtext() {
        let without = renderer().build_args("AI", None, COLOR_SCHEMES[1], Path::new("t.png"));
        let with = renderer().build_args("AI", Some("C D E"), COLOR_SCHEMES[1], Path::new("t.png"));

        let filter = |args: &[String]| {
            let idx = args.iter().position(|a| a == "-vf").unwrap();
            args[idx + 1].clone()
        };
        assert_eq!(filter(&without).matches("drawtext=").count(), 1);
        assert_eq!(filter(&with).matches("drawtext=").count(), 2);
        assert!(filter(&with).contains("text='C D E'"));
    }
}
