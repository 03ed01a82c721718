//! Errors raised by collaborators at the stage boundary.

use std::io;

use thiserror::Error;

/// Failure of a collaborator call inside a fail-fast stage.
#[derive(Error, Debug)]
pub enum StageError {
    /// The content or metadata service was unreachable or replied with
    /// something unusable.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Thumbnail, audio or video production failed.
    #[error("Render failed: {0}")]
    Render(String),

    /// A local write failed.
    #[error("Storage error in {operation}: {source}")]
    Storage {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// A stage was started without the data it depends on.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// A collaborator returned something the pipeline cannot accept.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// The collaborator could not be constructed (missing credential etc.).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StageError {
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Create a storage error with context.
    pub fn storage(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Storage {
            operation: operation.into(),
            source,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Short kind label used in logs and summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            StageError::Generation(_) => "generation",
            StageError::Render(_) => "render",
            StageError::Storage { .. } => "storage",
            StageError::InvalidInput(_) => "invalid_input",
            StageError::InvalidOutput(_) => "invalid_output",
            StageError::Configuration(_) => "configuration",
        }
    }

    /// The collaborator's own failure message, without the kind prefix.
    ///
    /// This is what lands in the run record; `Display` is for logs.
    pub fn message(&self) -> String {
        match self {
            StageError::Generation(msg)
            | StageError::Render(msg)
            | StageError::InvalidInput(msg)
            | StageError::InvalidOutput(msg)
            | StageError::Configuration(msg) => msg.clone(),
            StageError::Storage { operation, source } => format!("{}: {}", operation, source),
        }
    }
}

/// Result type for collaborator calls.
pub type StepResult<T> = Result<T, StageError>;
