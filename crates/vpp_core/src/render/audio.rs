//! Narration audio: a TTS command, an ffmpeg music mix and an ffprobe
//! duration check.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

use super::command::{probe_duration, run_tool};
use crate::collaborators::{AudioRenderer, Generated, StageError, StepResult};
use crate::config::AudioSettings;
use crate::models::AudioArtifact;

/// Frequencies of the generated ambient bed (an A major chord).
const AMBIENT_CHORD: [u32; 4] = [220, 330, 440, 550];

/// Where the background music comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum MusicSource {
    File(PathBuf),
    Ambient,
}

/// Intermediate files deleted when the render returns, on every path.
struct ScratchFiles(Vec<PathBuf>);

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in &self.0 {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => tracing::debug!("Could not remove {}: {}", path.display(), e),
            }
        }
    }
}

pub struct CommandAudioRenderer {
    settings: AudioSettings,
    assets_dir: PathBuf,
    output_dir: PathBuf,
}

impl CommandAudioRenderer {
    pub fn new(settings: AudioSettings, assets_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            settings,
            assets_dir,
            output_dir,
        }
    }

    /// TTS arguments with `{input}` and `{output}` substituted.
    pub fn tts_args(&self, input: &Path, output: &Path) -> Vec<String> {
        self.settings
            .tts_args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input.display().to_string())
                    .replace("{output}", &output.display().to_string())
            })
            .collect()
    }

    /// Pick the music source. A configured file that does not exist falls
    /// back to the ambient bed with a warning.
    pub fn resolve_music(&self) -> (MusicSource, Option<String>) {
        match self.settings.background_music.as_deref() {
            Some(configured) => {
                let path = Path::new(configured);
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    self.assets_dir.join(path)
                };
                if path.exists() {
                    (MusicSource::File(path), None)
                } else {
                    (
                        MusicSource::Ambient,
                        Some(format!(
                            "Background music {} not found, generated ambient track",
                            path.display()
                        )),
                    )
                }
            }
            None => (
                MusicSource::Ambient,
                Some("No background music configured, generated ambient track".to_string()),
            ),
        }
    }

    /// ffmpeg arguments mixing the voiceover with the music bed.
    pub fn mix_args(&self, voiceover: &Path, music: &MusicSource, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-y".into(),
            "-v".into(),
            "error".into(),
            "-i".into(),
            voiceover.display().to_string(),
        ];

        match music {
            MusicSource::File(path) => {
                args.extend([
                    "-stream_loop".into(),
                    "-1".into(),
                    "-i".into(),
                    path.display().to_string(),
                ]);
            }
            MusicSource::Ambient => {
                let expr = AMBIENT_CHORD
                    .iter()
                    .map(|f| format!("0.25*sin(2*PI*{}*t)", f))
                    .collect::<Vec<_>>()
                    .join("+");
                args.extend([
                    "-f".into(),
                    "lavfi".into(),
                    "-i".into(),
                    format!("aevalsrc={}:s=44100", expr),
                ]);
            }
        }

        args.extend([
            "-filter_complex".into(),
            format!(
                "[1:a]volume={:.3},afade=t=in:d=2[m];[0:a][m]amix=inputs=2:duration=first:dropout_transition=0[a]",
                self.settings.music_volume
            ),
            "-map".into(),
            "[a]".into(),
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            "192k".into(),
            output.display().to_string(),
        ]);
        args
    }
}

impl AudioRenderer for CommandAudioRenderer {
    fn render(&self, narration: &str) -> StepResult<Generated<AudioArtifact>> {
        if narration.trim().is_empty() {
            return Err(StageError::render("narration text is empty"));
        }

        fs::create_dir_all(&self.output_dir)
            .map_err(|e| StageError::storage("creating audio directory", e))?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let text_path = self.output_dir.join(format!("narration_{}.txt", stamp));
        let voice_path = self.output_dir.join(format!("voiceover_{}.wav", stamp));
        let final_path = self.output_dir.join(format!("audio_{}.m4a", stamp));
        let _scratch = ScratchFiles(vec![text_path.clone(), voice_path.clone()]);

        fs::write(&text_path, narration)
            .map_err(|e| StageError::storage("writing narration text", e))?;

        tracing::info!("Generating voiceover with {}", self.settings.tts_command);
        run_tool(&self.settings.tts_command, &self.tts_args(&text_path, &voice_path))?;

        let (music, warning) = self.resolve_music();
        if let Some(warning) = &warning {
            tracing::warn!("{}", warning);
        }
        run_tool(&self.settings.ffmpeg, &self.mix_args(&voice_path, &music, &final_path))?;

        let duration_seconds = probe_duration(&self.settings.ffprobe, &final_path)?;
        tracing::info!(
            "Audio production complete: {:.1} seconds ({:.1} minutes)",
            duration_seconds,
            duration_seconds / 60.0
        );

        let mut generated = Generated::new(AudioArtifact::new(final_path, duration_seconds));
        if let Some(warning) = warning {
            generated = generated.with_warning(warning);
        }
        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn renderer(assets: &Path, music: Option<&str>) -> CommandAudioRenderer {
        let settings = AudioSettings {
            background_music: music.map(|m| m.to_string()),
            ..Default::default()
        };
        CommandAudioRenderer::new(settings, assets.to_path_buf(), PathBuf::from("out"))
    }

    #[test]
    fn tts_placeholders_are_substituted() {
        let dir = tempdir().unwrap();
        let args = renderer(dir.path(), None).tts_args(Path::new("in.txt"), Path::new("out.wav"));
        assert_eq!(args, vec!["-w", "out.wav", "-f", "in.txt"]);
    }

    #[test]
    fn missing_music_falls_back_with_warning() {
        let dir = tempdir().unwrap();
        let (source, warning) = renderer(dir.path(), Some("music.mp3")).resolve_music();
        assert_eq!(source, MusicSource::Ambient);
        assert!(warning.unwrap().contains("music.mp3"));
    }

    #[test]
    fn existing_music_resolves_against_assets() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bed.mp3"), b"fake").unwrap();

        let (source, warning) = renderer(dir.path(), Some("bed.mp3")).resolve_music();
        assert_eq!(source, MusicSource::File(dir.path().join("bed.mp3")));
        assert!(warning.is_none());
    }

    #[test]
    fn mix_args_loop_music_file() {
        let dir = tempdir().unwrap();
        let r = renderer(dir.path(), None);
        let args = r.mix_args(
            Path::new("voice.wav"),
            &MusicSource::File(PathBuf::from("bed.mp3")),
            Path::new("final.m4a"),
        );
        assert!(args.windows(2).any(|w| w[0] == "-stream_loop" && w[1] == "-1"));
        assert!(args.iter().any(|a| a.contains("volume=0.100")));
        assert_eq!(args.last().unwrap(), "final.m4a");
    }

    #[test]
    fn failed_tts_leaves_no_scratch_files() {
        let assets = tempdir().unwrap();
        let out = tempdir().unwrap();
        let settings = AudioSettings {
            tts_command: "vpp-no-such-tts-binary".to_string(),
            ..Default::default()
        };
        let r = CommandAudioRenderer::new(settings, assets.path().to_path_buf(), out.path().to_path_buf());

        let err = r.render("Hello there.").unwrap_err();
        assert!(matches!(err, StageError::Render(ref m) if m.contains("vpp-no-such-tts-binary")));

        let leftovers: Vec<_> = fs::read_dir(out.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        assert!(leftovers.is_empty(), "left behind: {:?}", leftovers);
    }

    #[test]
    fn empty_narration_is_render_error() {
        let dir = tempdir().unwrap();
        let err = renderer(dir.path(), None).render("  ").unwrap_err();
        assert!(matches!(err, StageError::Render(_)));
    }
}
