// Launcher command line for one sanitized input

use crate::params::{OutputFormat, ProcessingParams};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// `a_sanitized.txt` -> `a_sanitized.wav`
pub fn output_path(input: &Path, format: OutputFormat) -> PathBuf {
    input.with_extension(format.extension())
}

/// `a_sanitized.wav` -> `a_sanitized.wav.log`
pub fn log_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_owned();
    name.push(".log");
    PathBuf::from(name)
}

/// Everything needed to run the launcher on one file
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub output: PathBuf,
    pub log: PathBuf,
}

impl Invocation {
    pub fn build(tool: &Path, input: &Path, params: &ProcessingParams) -> Self {
        let output = output_path(input, params.format);
        let log = log_path(&output);

        let mut args: Vec<OsString> = vec![
            input.as_os_str().to_owned(),
            output.as_os_str().to_owned(),
            "--voice".into(),
            params.voice.clone().into(),
            "--lang".into(),
            params.language.clone().into(),
            "--speed".into(),
            params.speed_arg().into(),
            "--format".into(),
            params.format.extension().into(),
        ];
        if let Some(dir) = &params.split_dir {
            args.push("--split-output".into());
            args.push(dir.as_os_str().to_owned());
        }

        Self {
            program: tool.to_path_buf(),
            args,
            output,
            log,
        }
    }

    /// Directory the launcher runs in: its own
    pub fn working_dir(&self) -> Option<&Path> {
        self.program
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
    }

    /// A `Command` ready to spawn, without stdio configured
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        // the launcher is a Python program; keep its I/O in UTF-8
        cmd.env("PYTHONIOENCODING", "utf-8");
        if let Some(dir) = self.working_dir() {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Human-readable command line for logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(|a| a.as_os_str()))
            .map(|part| part.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
