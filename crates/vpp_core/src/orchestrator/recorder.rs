//! Persisting run records.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

use super::run::Run;

/// Writes each terminal run to `pipeline_results_<YYYYmmdd_HHMMSS>.json`.
///
/// File names have second resolution: two runs ending in the same second
/// write the same file and the later one wins.
#[derive(Debug, Clone)]
pub struct RunRecorder {
    output_dir: PathBuf,
}

impl RunRecorder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the run will be written to, stamped with its end time.
    pub fn path_for(&self, run: &Run) -> PathBuf {
        let stamp = run.end_time.unwrap_or_else(Local::now);
        self.output_dir.join(format!(
            "pipeline_results_{}.json",
            stamp.format("%Y%m%d_%H%M%S")
        ))
    }

    pub fn save(&self, run: &Run) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let json = serde_json::to_string_pretty(run)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        // Write atomically via temp file
        let path = self.path_for(run);
        let temp_file = path.with_extension("json.tmp");
        fs::write(&temp_file, &json)?;
        fs::rename(&temp_file, &path)?;

        tracing::debug!("Saved run {} to {}", run.id, path.display());
        Ok(path)
    }

    pub fn load(path: &Path) -> io::Result<Run> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::run::{RunStatus, StageName, StageResult};
    use tempfile::tempdir;

    #[test]
    fn saves_terminal_run() {
        let dir = tempdir().unwrap();
        let recorder = RunRecorder::new(dir.path().join("output"));

        let mut run = Run::new(Some("AI"));
        run.record_stage(StageName::ContentGeneration, StageResult::error("quota"));
        run.fail("quota");

        let path = recorder.save(&run).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("pipeline_results_"));
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = RunRecorder::load(&path).unwrap();
        assert_eq!(loaded.status, RunStatus::Error);
        assert_eq!(loaded.failed_stage(), "content_generation");
        assert_eq!(loaded.error.as_deref(), Some("quota"));
    }

    #[test]
    fn unwritable_directory_is_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let recorder = RunRecorder::new(blocker.join("output"));
        let mut run = Run::new(None);
        run.finish();
        assert!(recorder.save(&run).is_err());
    }
}
