//! Sequential batch processing.
//!
//! Each queued file is sanitized, handed to the launcher, and its output
//! streamed line by line to the progress sink and a per-file log. A file
//! that fails at any step is reported and the batch moves on; nothing is
//! retried and earlier outputs are kept.

use crate::command::Invocation;
use crate::error::{SanitizeError, SessionError};
use crate::params::ProcessingParams;
use crate::progress::{Progress, SpinnerGuard};
use crate::queue::FileQueue;
use crate::sanitize::sanitize_file;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const LOG_TITLE: &str = "Kokoro TTS Processing Log";

/// How one file's launcher run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Succeeded,
    /// Non-zero exit; `None` when the launcher was killed by a signal
    Failed { code: Option<i32> },
    /// The launcher could not be run or its output could not be read
    Errored { message: String },
}

impl FileStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, FileStatus::Succeeded)
    }

    pub fn code_str(code: Option<i32>) -> String {
        code.map(|c| c.to_string())
            .unwrap_or_else(|| "none".to_string())
    }
}

/// Outcome for a file that reached the launcher stage
#[derive(Debug, Clone)]
pub struct FileResult {
    pub original: PathBuf,
    pub sanitized: PathBuf,
    pub output: PathBuf,
    pub log: PathBuf,
    pub status: FileStatus,
    /// Combined stdout/stderr of the launcher, one entry per line
    pub transcript: Vec<String>,
}

/// A queued file that never reached the launcher
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub error: SanitizeError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<FileResult>,
    pub skipped: Vec<SkippedFile>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.skipped.is_empty() && self.failed() == 0
    }
}

/// One submission: the queue, the options snapshot and the launcher
#[derive(Debug)]
pub struct Session {
    pub queue: FileQueue,
    pub params: ProcessingParams,
    pub tool: PathBuf,
}

impl Session {
    pub fn new(queue: FileQueue, params: ProcessingParams, tool: impl Into<PathBuf>) -> Self {
        Self {
            queue,
            params,
            tool: tool.into(),
        }
    }

    /// Check the queue and launcher, returning the launcher's absolute path
    pub fn validate(&self) -> Result<PathBuf, SessionError> {
        if self.queue.is_empty() {
            return Err(SessionError::EmptyQueue);
        }
        if !self.tool.exists() {
            return Err(SessionError::ToolNotFound {
                path: self.tool.clone(),
            });
        }
        std::path::absolute(&self.tool).map_err(|source| SessionError::ToolPath {
            path: self.tool.clone(),
            source,
        })
    }

    /// Process every queued file in order.
    ///
    /// Fails only when the session itself is unusable; per-file problems
    /// are recorded in the returned report.
    pub fn run(&self, progress: &dyn Progress) -> Result<BatchReport, SessionError> {
        let tool = self.validate()?;
        let mut report = BatchReport::default();

        for original in self.queue.iter() {
            let sanitized = match sanitize_file(original) {
                Ok(sanitized) => sanitized,
                Err(error) => {
                    log::debug!("Sanitizing {} failed: {}", original.display(), error);
                    let skipped = SkippedFile {
                        path: original.clone(),
                        error,
                    };
                    progress.file_skipped(&skipped);
                    report.skipped.push(skipped);
                    continue;
                }
            };

            let result = process_file(&tool, original, &sanitized.path, &self.params, progress);
            progress.file_finished(&result);
            report.results.push(result);
        }

        progress.batch_finished(&report);
        Ok(report)
    }
}

/// Run the launcher on one sanitized file and write its log
pub fn process_file(
    tool: &Path,
    original: &Path,
    sanitized: &Path,
    params: &ProcessingParams,
    progress: &dyn Progress,
) -> FileResult {
    let invocation = Invocation::build(tool, sanitized, params);
    log::debug!("Running: {}", invocation.display());

    let mut result = FileResult {
        original: original.to_path_buf(),
        sanitized: sanitized.to_path_buf(),
        output: invocation.output.clone(),
        log: invocation.log.clone(),
        status: FileStatus::Succeeded,
        transcript: Vec::new(),
    };

    let mut log = match TranscriptLog::create(&invocation.log) {
        Ok(log) => log,
        Err(e) => {
            result.status = FileStatus::Errored {
                message: format!("Could not create log file {}: {}", invocation.log.display(), e),
            };
            return result;
        }
    };
    log.write_header(&result, params);

    let spinner = SpinnerGuard::start(progress, "Processing...");
    let outcome = run_streaming(&invocation, |line| {
        progress.output_line(line.trim_end());
        log.write_raw(line);
        result.transcript.push(line.trim_end_matches(['\r', '\n']).to_string());
    });
    spinner.stop();

    result.status = match outcome {
        Ok(Some(0)) => {
            log.write_raw("\nSUCCESSFUL PROCESSING\n");
            FileStatus::Succeeded
        }
        Ok(code) => {
            log.write_raw(&format!(
                "\nPROCESSING FAILED (Code: {})\n",
                FileStatus::code_str(code)
            ));
            FileStatus::Failed { code }
        }
        Err(e) => {
            log.write_raw(&format!("\nUNEXPECTED ERROR: {}\n", e));
            FileStatus::Errored {
                message: e.to_string(),
            }
        }
    };
    log.finish();

    result
}

/// Spawn the launcher with stderr merged into stdout and feed each line
/// (newline included) to `on_line` as it arrives. Returns the exit code.
fn run_streaming(invocation: &Invocation, mut on_line: impl FnMut(&str)) -> io::Result<Option<i32>> {
    let (reader, writer) = io::pipe()?;

    let mut cmd = invocation.to_command();
    cmd.stdin(std::process::Stdio::null())
        .stdout(writer.try_clone()?)
        .stderr(writer);
    let mut child = cmd.spawn()?;
    // the Command still holds the write ends; EOF needs them closed
    drop(cmd);

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let read_result = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break Ok(()),
            Ok(_) => on_line(String::from_utf8_lossy(&buf).as_ref()),
            Err(e) => break Err(e),
        }
    };

    // reap the child even when reading failed
    let status = child.wait()?;
    read_result?;
    Ok(status.code())
}

/// Best-effort writer for the per-file log: write failures are logged, not raised
struct TranscriptLog {
    path: PathBuf,
    writer: BufWriter<File>,
    failed: bool,
}

impl TranscriptLog {
    fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(File::create(path)?),
            failed: false,
        })
    }

    fn write_header(&mut self, result: &FileResult, params: &ProcessingParams) {
        let split_dir = params
            .split_dir
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|| "None".to_string());

        let header = format!(
            "{title}\n{rule}\n\
             Timestamp: {timestamp}\n\
             Input File (Original): {original}\n\
             Input File (Sanitized): {sanitized}\n\
             Output File: {output}\n\
             Voice: {voice}\n\
             Language: {language}\n\
             Speed: {speed}\n\
             Format: {format}\n\
             Split Directory: {split_dir}\n\
             \nProcessing Details:\n",
            title = LOG_TITLE,
            rule = "=".repeat(30),
            timestamp = params.timestamp_str(),
            original = result.original.display(),
            sanitized = result.sanitized.display(),
            output = result.output.display(),
            voice = params.voice,
            language = params.language,
            speed = params.speed_arg(),
            format = params.format,
            split_dir = split_dir,
        );
        self.write_raw(&header);
    }

    fn write_raw(&mut self, text: &str) {
        if self.failed {
            return;
        }
        if let Err(e) = self.writer.write_all(text.as_bytes()) {
            log::warn!("Failed to write log file {}: {}", self.path.display(), e);
            self.failed = true;
        }
    }

    fn finish(mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("Failed to flush log file {}: {}", self.path.display(), e);
        }
    }
}
