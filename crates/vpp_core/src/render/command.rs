//! Running external media tools.

use std::io;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use thiserror::Error;

use crate::collaborators::StageError;

/// Number of stderr lines kept in a command failure.
const STDERR_TAIL_LINES: usize = 10;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed with exit code {exit_code}: {message}")]
    Failed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    #[error("Failed to parse {tool} output: {message}")]
    Parse { tool: String, message: String },
}

impl From<CommandError> for StageError {
    fn from(err: CommandError) -> Self {
        StageError::Render(err.to_string())
    }
}

/// Run a tool to completion and return its stdout.
///
/// On a non-zero exit the last lines of stderr become the error message.
pub fn run_tool(program: &str, args: &[String]) -> Result<String, CommandError> {
    tracing::debug!("Running: {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| CommandError::Spawn {
            tool: program.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CommandError::Failed {
            tool: program.to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            message: stderr_tail(&stderr, STDERR_TAIL_LINES),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Duration of a media file in seconds, read with ffprobe.
pub fn probe_duration(ffprobe: &str, path: &Path) -> Result<f64, CommandError> {
    let args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "json".to_string(),
        path.display().to_string(),
    ];
    let stdout = run_tool(ffprobe, &args)?;
    parse_duration_json(&stdout).ok_or_else(|| CommandError::Parse {
        tool: ffprobe.to_string(),
        message: format!("no duration for {}", path.display()),
    })
}

/// Extract `format.duration` from ffprobe JSON output.
fn parse_duration_json(stdout: &str) -> Option<f64> {
    let json: Value = serde_json::from_str(stdout).ok()?;
    let duration = json.get("format")?.get("duration")?;
    match duration {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn stderr_tail(stderr: &str, lines: usize) -> String {
    let all: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

/// Escape text for use inside an ffmpeg `drawtext` option value.
pub fn escape_drawtext(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\\\\\"),
            ':' => escaped.push_str("\\:"),
            '\'' => escaped.push('\u{2019}'),
            '%' => escaped.push_str("\\%"),
            ',' => escaped.push_str("\\,"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape a file path used as a filter option value.
pub fn escape_filter_path(path: &Path) -> String {
    path.display()
        .to_string()
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}
