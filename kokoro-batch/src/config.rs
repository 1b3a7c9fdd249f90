use crate::catalog;
use crate::params::OutputFormat;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(windows)]
const DEFAULT_TOOL_PATH: &str = "kokoro.bat";
#[cfg(not(windows))]
const DEFAULT_TOOL_PATH: &str = "kokoro";

/// Keys accepted by `config set`
pub const KEYS: &[&str] = &["tool_path", "voice", "language", "speed", "format", "split_dir"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the Kokoro TTS launcher
    #[serde(default = "default_tool_path")]
    pub tool_path: String,

    /// Default voice
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Default language, as a code or display name
    #[serde(default = "default_language")]
    pub language: String,

    /// Default speaking speed (0.5 - 2.0)
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Default split output directory
    #[serde(default)]
    pub split_dir: Option<String>,
}

fn default_tool_path() -> String {
    DEFAULT_TOOL_PATH.to_string()
}

fn default_voice() -> String {
    catalog::DEFAULT_VOICE.to_string()
}

fn default_language() -> String {
    catalog::DEFAULT_LANGUAGE.to_string()
}

fn default_speed() -> f64 {
    catalog::DEFAULT_SPEED
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool_path: default_tool_path(),
            voice: default_voice(),
            language: default_language(),
            speed: default_speed(),
            format: OutputFormat::default(),
            split_dir: None,
        }
    }
}

impl Config {
    /// Get the config file path: ~/.config/cli-programs/kokoro-batch.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("kokoro-batch.toml"))
    }

    /// Load config from the default location, writing the defaults there first if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Update one key from its string form, validating the value
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "tool_path" => self.tool_path = value.to_string(),
            "voice" => {
                if !catalog::is_known_voice(value) {
                    bail!("Unknown voice: {}. Use --list-voices to see the available voices", value);
                }
                self.voice = value.to_string();
            }
            "language" => {
                let language = catalog::resolve_language(value).with_context(|| {
                    format!(
                        "Unknown language: {}. Use --list-languages to see the available languages",
                        value
                    )
                })?;
                self.language = language.code.to_string();
            }
            "speed" => {
                let speed: f64 = value
                    .parse()
                    .with_context(|| format!("Invalid speed: {}", value))?;
                if !(crate::params::MIN_SPEED..=crate::params::MAX_SPEED).contains(&speed) {
                    bail!("Speed must be between 0.5 and 2.0, got: {}", speed);
                }
                self.speed = speed;
            }
            "format" => {
                self.format = match value.to_ascii_lowercase().as_str() {
                    "wav" => OutputFormat::Wav,
                    "mp3" => OutputFormat::Mp3,
                    _ => bail!("Invalid format. Use 'wav' or 'mp3'"),
                }
            }
            "split_dir" => {
                self.split_dir = if value.is_empty() || value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            _ => bail!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                KEYS.join(", ")
            ),
        }
        Ok(())
    }
}
