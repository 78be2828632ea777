//! Run reporting.
//!
//! Results flow through a [`ReportSink`]: the terminal reporter used by the CLI,
//! or a [`ReportBuffer`] that keeps plain lines for tests and programmatic use.

use std::io::Write;
use std::path::PathBuf;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::errors::render_error;
use crate::harness::runner::{FixtureResult, Outcome};

/// Counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub filtered: usize,
    pub invalid: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed { .. } => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Filtered => self.filtered += 1,
            Outcome::Invalid(_) => self.invalid += 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.invalid == 0
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{} passed; {} failed; {} invalid; {} skipped; {} filtered out",
            self.passed, self.failed, self.invalid, self.skipped, self.filtered
        )
    }
}

pub trait ReportSink {
    fn fixture(&mut self, result: &FixtureResult);
    fn finish(&mut self, summary: &RunSummary);
}

/// Collects report lines in memory.
#[derive(Debug, Default)]
pub struct ReportBuffer {
    pub lines: Vec<String>,
}

impl ReportSink for ReportBuffer {
    fn fixture(&mut self, result: &FixtureResult) {
        self.lines
            .push(format!("{} ... {}", result.path.display(), status_word(&result.outcome)));
    }

    fn finish(&mut self, summary: &RunSummary) {
        self.lines.push(format!(
            "test result: {}. {}",
            if summary.is_success() { "ok" } else { "FAILED" },
            summary.summary_line()
        ));
    }
}

/// Colored report on stderr. Failure details are printed after the per-fixture
/// lines so they are not interleaved.
pub struct TerminalReport {
    stream: StandardStream,
    failures: Vec<(PathBuf, String)>,
    show_filtered: bool,
}

impl TerminalReport {
    pub fn new(use_colors: bool) -> Self {
        let choice = if use_colors {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            stream: StandardStream::stderr(choice),
            failures: Vec::new(),
            show_filtered: false,
        }
    }

    pub fn show_filtered(mut self, show: bool) -> Self {
        self.show_filtered = show;
        self
    }

    fn colored(&mut self, text: &str, color: Color, bold: bool) {
        let _ = self
            .stream
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold));
        let _ = write!(self.stream, "{}", text);
        let _ = self.stream.reset();
    }
}

impl ReportSink for TerminalReport {
    fn fixture(&mut self, result: &FixtureResult) {
        if matches!(result.outcome, Outcome::Filtered) && !self.show_filtered {
            return;
        }
        let _ = write!(self.stream, "{} ... ", result.path.display());
        let word = status_word(&result.outcome);
        match &result.outcome {
            Outcome::Passed => self.colored(word, Color::Green, false),
            Outcome::Failed { status, stderr } => {
                self.colored(word, Color::Red, true);
                self.failures
                    .push((result.path.clone(), format!("{status}\n{stderr}")));
            }
            Outcome::Skipped | Outcome::Filtered => self.colored(word, Color::Yellow, false),
            Outcome::Invalid(error) => {
                self.colored(word, Color::Red, false);
                self.failures
                    .push((result.path.clone(), render_error(error)));
            }
        }
        let _ = writeln!(self.stream);
    }

    fn finish(&mut self, summary: &RunSummary) {
        for (path, details) in std::mem::take(&mut self.failures) {
            let _ = writeln!(self.stream);
            self.colored(&path.display().to_string(), Color::White, true);
            let _ = writeln!(self.stream);
            let _ = writeln!(self.stream, "{}", details.trim_end());
        }
        let _ = writeln!(self.stream);
        let _ = write!(self.stream, "test result: ");
        if summary.is_success() {
            self.colored("ok", Color::Green, false);
        } else {
            self.colored("FAILED", Color::Red, true);
        }
        let _ = writeln!(self.stream, ". {}", summary.summary_line());
    }
}

fn status_word(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Passed => "ok",
        Outcome::Failed { .. } => "FAILED",
        Outcome::Skipped => "skipped",
        Outcome::Filtered => "filtered",
        Outcome::Invalid(_) => "invalid",
    }
}
