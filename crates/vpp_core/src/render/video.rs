//! Final video: the thumbnail as a still background, section titles as
//! timed overlays, and the narration as the soundtrack.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use super::command::{escape_drawtext, escape_filter_path, run_tool};
use crate::collaborators::{Generated, StageError, StepResult, VideoRenderer};
use crate::config::VideoSettings;
use crate::models::{ArtifactRef, AudioArtifact, ScriptPayload};

/// A section title shown between `start` and `end` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleOverlay {
    pub title: String,
    pub start: f64,
    pub end: f64,
}

pub struct FfmpegVideoRenderer {
    settings: VideoSettings,
    ffmpeg: String,
    font_file: Option<String>,
    output_dir: PathBuf,
}

impl FfmpegVideoRenderer {
    pub fn new(
        settings: VideoSettings,
        ffmpeg: String,
        font_file: Option<String>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            settings,
            ffmpeg,
            font_file,
            output_dir,
        }
    }

    fn filter_chain(&self, overlays: &[TitleOverlay], duration: f64) -> String {
        let (w, h) = (self.settings.width, self.settings.height);
        let mut filters = vec![
            format!("scale={}:{}:force_original_aspect_ratio=decrease", w, h),
            format!("pad={}:{}:(ow-iw)/2:(oh-ih)/2", w, h),
        ];

        let font = self
            .font_file
            .as_deref()
            .map(|f| format!("fontfile='{}':", escape_filter_path(Path::new(f))))
            .unwrap_or_default();

        for overlay in overlays {
            filters.push(format!(
                "drawtext={}text='{}':fontcolor=white:fontsize=60:borderw=2:bordercolor=black:\
                 x=(w-text_w)/2:y=100:enable='between(t\\,{:.2}\\,{:.2})'",
                font,
                escape_drawtext(&overlay.title),
                overlay.start,
                overlay.end
            ));
        }

        if duration > 2.0 {
            filters.push("fade=t=in:st=0:d=1".to_string());
            filters.push(format!("fade=t=out:st={:.2}:d=1", duration - 1.0));
        }
        filters.push("format=yuv420p".to_string());
        filters.join(",")
    }

    pub fn build_args(
        &self,
        audio: &AudioArtifact,
        thumbnail: &ArtifactRef,
        script: &ScriptPayload,
        output: &Path,
    ) -> Vec<String> {
        let overlays = section_overlays(script, audio.duration_seconds);
        vec![
            "-y".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-loop".to_string(),
            "1".to_string(),
            "-i".to_string(),
            thumbnail.path().display().to_string(),
            "-i".to_string(),
            audio.audio.path().display().to_string(),
            "-vf".to_string(),
            self.filter_chain(&overlays, audio.duration_seconds),
            "-r".to_string(),
            self.settings.fps.to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "medium".to_string(),
            "-tune".to_string(),
            "stillimage".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-shortest".to_string(),
            output.display().to_string(),
        ]
    }
}

impl VideoRenderer for FfmpegVideoRenderer {
    fn render(
        &self,
        audio: &AudioArtifact,
        thumbnail: &ArtifactRef,
        script: &ScriptPayload,
    ) -> StepResult<Generated<ArtifactRef>> {
        if !thumbnail.path().exists() {
            return Err(StageError::render(format!(
                "thumbnail {} not found",
                thumbnail.path().display()
            )));
        }
        if !audio.audio.path().exists() {
            return Err(StageError::render(format!(
                "audio {} not found",
                audio.audio.path().display()
            )));
        }

        fs::create_dir_all(&self.output_dir)
            .map_err(|e| StageError::storage("creating video directory", e))?;
        let output = self.output_dir.join(format!(
            "video_{}.mp4",
            Local::now().format("%Y%m%d_%H%M%S")
        ));

        tracing::info!(
            "Exporting video to {} ({:.1}s of audio)",
            output.display(),
            audio.duration_seconds
        );
        run_tool(&self.ffmpeg, &self.build_args(audio, thumbnail, script, &output))?;

        let mut generated = Generated::new(ArtifactRef::new(output));
        if section_titles(script).is_empty() {
            generated = generated.with_warning("Script has no sections, video has no title overlays");
        }
        Ok(generated)
    }
}

/// Overlay titles in order: "Introduction" for the hook, each section's
/// title, then "Conclusion".
fn section_titles(script: &ScriptPayload) -> Vec<String> {
    let mut titles = Vec::new();
    if !script.hook.trim().is_empty() {
        titles.push("Introduction".to_string());
    }
    titles.extend(script.main_content.iter().map(|s| s.section_title.clone()));
    if !script.conclusion.trim().is_empty() {
        titles.push("Conclusion".to_string());
    }
    titles
}

/// Split the duration evenly across sections. Sections without a title
/// keep their slot but get no overlay.
pub fn section_overlays(script: &ScriptPayload, duration: f64) -> Vec<TitleOverlay> {
    let titles = section_titles(script);
    if titles.is_empty() || duration <= 0.0 {
        return Vec::new();
    }

    let slot = duration / titles.len() as f64;
    titles
        .into_iter()
        .enumerate()
        .filter(|(_, title)| !title.trim().is_empty())
        .map(|(i, title)| TitleOverlay {
            title,
            start: i as f64 * slot,
            end: ((i + 1) as f64 * slot).min(duration),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScriptSection;

    fn script() -> ScriptPayload {
        ScriptPayload {
            hook: "Hi".to_string(),
            main_content: vec![
                ScriptSection::new("What is AI?", "..."),
                ScriptSection::new("", "..."),
            ],
            conclusion: "Bye".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn overlays_split_duration_evenly() {
        let overlays = section_overlays(&script(), 40.0);

        let titles: Vec<&str> = overlays.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["Introduction", "What is AI?", "Conclusion"]);
        assert_eq!(overlays[1].start, 10.0);
        assert_eq!(overlays[1].end, 20.0);
        assert_eq!(overlays[2].start, 30.0);
        assert_eq!(overlays[2].end, 40.0);
    }

    #[test]
    fn no_sections_means_no_overlays() {
        assert!(section_overlays(&ScriptPayload::default(), 30.0).is_empty());
        assert!(section_overlays(&script(), 0.0).is_empty());
    }

    #[test]
    fn args_loop_still_image_and_stop_with_audio() {
        let renderer = FfmpegVideoRenderer::new(
            VideoSettings::default(),
            "ffmpeg".to_string(),
            None,
            PathBuf::from("out"),
        );
        let args = renderer.build_args(
            &AudioArtifact::new("a.m4a", 30.0),
            &ArtifactRef::new("t.png"),
            &script(),
            Path::new("v.mp4"),
        );

        assert!(args.windows(2).any(|w| w[0] == "-loop" && w[1] == "1"));
        assert!(args.contains(&"-shortest".to_string()));
        let vf = &args[args.iter().position(|a| a == "-vf").unwrap() + 1];
        assert!(vf.starts_with("scale=1920:1080"));
        assert!(vf.contains("fade=t=out:st=29.00"));
    }
}
