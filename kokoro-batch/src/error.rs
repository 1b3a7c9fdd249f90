use std::path::PathBuf;
use thiserror::Error;

/// Problems that stop a batch before any file is touched
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No files selected for processing")]
    EmptyQueue,

    #[error(
        "Kokoro TTS launcher not found at: {}\nRun 'kokoro-batch config set tool_path <path>' to configure",
        .path.display()
    )]
    ToolNotFound { path: PathBuf },

    #[error("Could not resolve launcher path {}: {source}", .path.display())]
    ToolPath {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Invalid processing options
#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("Unknown voice: {0}. Use --list-voices to see the available voices")]
    UnknownVoice(String),

    #[error("Unknown language: {0}. Use --list-languages to see the available languages")]
    UnknownLanguage(String),

    #[error("Speed must be between 0.5 and 2.0, got: {0}")]
    SpeedOutOfRange(f64),
}

/// Per-file failures while preparing the text for synthesis
#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("Could not read file: {}\nError: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not decode file: {}\nError: no supported encoding matched", .path.display())]
    Decode { path: PathBuf },

    #[error("Could not save sanitized file: {}\nError: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
