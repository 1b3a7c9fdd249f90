//! Progress reporting for a batch.
//!
//! The processor reports through the [`Progress`] trait so the pipeline
//! does not care whether it is drawn on a terminal, collected by a test
//! or forwarded somewhere else.

use crate::processor::{BatchReport, FileResult, SkippedFile};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Sink for everything a running batch reports
pub trait Progress {
    /// Start the activity indicator for a running launcher
    fn spinner_start(&self, message: &str);

    /// Stop the activity indicator. Returns only once it has stopped.
    fn spinner_stop(&self);

    /// One line of launcher output
    fn output_line(&self, line: &str);

    /// A file could not be sanitized and will not be synthesized
    fn file_skipped(&self, skipped: &SkippedFile);

    /// A file finished, successfully or not
    fn file_finished(&self, result: &FileResult);

    /// The whole batch is done
    fn batch_finished(&self, report: &BatchReport);
}

/// Stops the spinner when dropped, whichever way processing exits
pub struct SpinnerGuard<'a> {
    progress: &'a dyn Progress,
    stopped: bool,
}

impl<'a> SpinnerGuard<'a> {
    pub fn start(progress: &'a dyn Progress, message: &str) -> Self {
        progress.spinner_start(message);
        Self {
            progress,
            stopped: false,
        }
    }

    pub fn stop(mut self) {
        self.stop_once();
    }

    fn stop_once(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.progress.spinner_stop();
        }
    }
}

impl Drop for SpinnerGuard<'_> {
    fn drop(&mut self) {
        self.stop_once();
    }
}

/// Terminal output with an indicatif spinner on stderr
pub struct ConsoleProgress {
    spinner: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_strings(&["-", "\\", "|", "/", "-"])
                .template("{msg} {spinner}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { spinner }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for ConsoleProgress {
    fn spinner_start(&self, message: &str) {
        self.spinner.reset();
        self.spinner.set_message(message.to_string());
        self.spinner.enable_steady_tick(SPINNER_TICK);
    }

    fn spinner_stop(&self) {
        // joins the ticker thread
        self.spinner.disable_steady_tick();
        self.spinner.finish_with_message("Done!");
    }

    fn output_line(&self, line: &str) {
        self.spinner.suspend(|| println!("{}", line));
    }

    fn file_skipped(&self, skipped: &SkippedFile) {
        self.spinner.suspend(|| eprintln!("Skipping {}", skipped.error));
    }

    fn file_finished(&self, result: &FileResult) {
        use crate::processor::FileStatus;

        match &result.status {
            FileStatus::Succeeded => {
                println!();
                println!("Successfully created: {}", result.output.display());
                println!("Log file created: {}", result.log.display());
            }
            FileStatus::Failed { code } => {
                eprintln!();
                eprintln!(
                    "Error processing {} (Code: {})",
                    result.original.display(),
                    FileStatus::code_str(*code)
                );
            }
            FileStatus::Errored { message } => {
                eprintln!();
                eprintln!("Unexpected error: {}", message);
            }
        }
    }

    fn batch_finished(&self, report: &BatchReport) {
        eprintln!();
        eprintln!(
            "Processed {} file(s): {} succeeded, {} failed, {} skipped",
            report.results.len() + report.skipped.len(),
            report.succeeded(),
            report.failed(),
            report.skipped.len()
        );
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Event, RecordingProgress};
    use super::*;

    #[test]
    fn test_guard_stops_on_drop() {
        let progress = RecordingProgress::default();
        {
            let _guard = SpinnerGuard::start(&progress, "Processing...");
        }
        assert_eq!(progress.events(), vec![Event::SpinnerStart, Event::SpinnerStop]);
    }

    #[test]
    fn test_guard_stops_once() {
        let progress = RecordingProgress::default();
        let guard = SpinnerGuard::start(&progress, "Processing...");
        guard.stop();
        assert_eq!(progress.events(), vec![Event::SpinnerStart, Event::SpinnerStop]);
        assert!(progress.spinner_balanced());
    }

    #[test]
    fn test_console_spinner_stops() {
        let progress = ConsoleProgress::new();
        progress.spinner_start("Processing...");
        progress.spinner_stop();
        assert!(progress.spinner.is_finished());
    }
}
