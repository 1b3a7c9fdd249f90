// Processing options captured once per batch

use crate::catalog;
use crate::error::ParamsError;
use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const MIN_SPEED: f64 = 0.5;
pub const MAX_SPEED: f64 = 2.0;

/// Audio container written by the launcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Wav,
    Mp3,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Immutable snapshot of the options chosen for a batch
#[derive(Debug, Clone)]
pub struct ProcessingParams {
    pub voice: String,
    pub language: String,
    pub speed: f64,
    pub format: OutputFormat,
    pub split_dir: Option<PathBuf>,
    pub timestamp: DateTime<Local>,
}

impl ProcessingParams {
    /// Validate the options and stamp them with the current time.
    ///
    /// `language` may be a code (`en-us`) or a display name
    /// (`English (American)`).
    pub fn new(
        voice: &str,
        language: &str,
        speed: f64,
        format: OutputFormat,
        split_dir: Option<PathBuf>,
    ) -> Result<Self, ParamsError> {
        if !catalog::is_known_voice(voice) {
            return Err(ParamsError::UnknownVoice(voice.to_string()));
        }

        let language = catalog::resolve_language(language)
            .ok_or_else(|| ParamsError::UnknownLanguage(language.to_string()))?;

        if !(MIN_SPEED..=MAX_SPEED).contains(&speed) {
            return Err(ParamsError::SpeedOutOfRange(speed));
        }

        let split_dir = split_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| std::path::absolute(&dir).unwrap_or(dir));

        Ok(Self {
            voice: voice.to_string(),
            language: language.code.to_string(),
            speed,
            format,
            split_dir,
            timestamp: Local::now(),
        })
    }

    /// Speed as passed on the command line: always has a fractional part
    pub fn speed_arg(&self) -> String {
        format_speed(self.speed)
    }

    pub fn timestamp_str(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn format_speed(speed: f64) -> String {
    let text = speed.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}
