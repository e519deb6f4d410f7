//! Error types for commitit using thiserror.
//!
//! Each component returns its own error enum; [`AppError`] is the union the
//! command dispatcher turns into an `Error: <message>` line and exit code 1.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the settings store.
///
/// Messages never include the stored API key.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("OpenAI API key not set. Run: commitit set-key")]
    MissingApiKey,

    #[error("failed to read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("failed to write settings file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("failed to run git {operation}: {source}")]
    Spawn {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    Failed {
        operation: &'static str,
        stderr: String,
    },
}

/// Errors from the completion request.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("response contained no completion")]
    EmptyResponse,
}

/// Top-level error for a single command invocation.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}
