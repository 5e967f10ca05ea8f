//! Error types for each component.
//!
//! Only the UI layer turns these into display text.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while building the startup configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config file {path}: {key} must be at least 1 second")]
    ZeroTimeout { path: PathBuf, key: &'static str },
}

/// Errors from running an external tool
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors from the external visualization step
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("snapshot not found: {0}")]
    SnapshotMissing(PathBuf),

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("visualization library failed ({status}): {stderr}")]
    Library { status: String, stderr: String },

    #[error("plot generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to remove previous plot {path}: {source}")]
    ClearOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no plot was written to {0}")]
    OutputMissing(PathBuf),

    #[error("failed to read plot {path}: {source}")]
    ReadOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("plot {path} is not a readable image: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("plot task failed: {0}")]
    Join(String),
}

impl From<ProcessError> for PlotError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Spawn { program, source } => PlotError::Spawn { program, source },
            ProcessError::Timeout(timeout) => PlotError::Timeout(timeout),
        }
    }
}

/// Errors while preparing pre-rendered media for playback
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} could not be decoded: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{0} has no frames")]
    NoFrames(PathBuf),

    #[error("failed to transcode {path}: {source}")]
    Transcoder {
        path: PathBuf,
        #[source]
        source: ProcessError,
    },

    #[error("transcoder failed on {path} ({status}): {stderr}")]
    TranscodeFailed {
        path: PathBuf,
        status: String,
        stderr: String,
    },
}

/// Errors from the chat-completion API
#[derive(Debug, Error)]
pub enum TutorError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("response contained no choices")]
    EmptyResponse,
}

/// Errors while saving a reflection
#[derive(Debug, Error)]
pub enum ReflectionError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
