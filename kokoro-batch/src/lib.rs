//! Batch front-end for the Kokoro TTS launcher.
//!
//! Queue text files, sanitize their encoding, and synthesize each one
//! with the external launcher, keeping a log per file.

pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod params;
pub mod processor;
pub mod progress;
pub mod queue;
pub mod repair;
pub mod sanitize;

pub use error::{ParamsError, SanitizeError, SessionError};
pub use params::{OutputFormat, ProcessingParams};
pub use processor::{BatchReport, FileResult, FileStatus, Session, SkippedFile};
pub use progress::{ConsoleProgress, Progress};
pub use queue::FileQueue;
