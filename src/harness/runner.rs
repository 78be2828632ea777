use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::config::HarnessConfig;
use crate::discovery::Discovered;
use crate::errors::RegrunError;
use crate::fixture::TestCase;
use crate::harness::report::{ReportSink, RunSummary};
use crate::harness::selection::{Decision, Selection};

#[derive(Debug)]
pub enum Outcome {
    Passed,
    Failed { status: String, stderr: String },
    Skipped,
    Filtered,
    /// The fixture could not be read or its directive line did not parse.
    Invalid(RegrunError),
}

#[derive(Debug)]
pub struct FixtureResult {
    pub path: PathBuf,
    pub outcome: Outcome,
}

/// Launches the analyzer once per selected fixture.
pub struct FixtureRunner<'a> {
    config: &'a HarnessConfig,
    selection: &'a Selection,
}

impl<'a> FixtureRunner<'a> {
    pub fn new(config: &'a HarnessConfig, selection: &'a Selection) -> Self {
        Self { config, selection }
    }

    /// The analyzer invocation for one fixture:
    /// `analyzer base_args.. directive_args.. fixture`.
    pub fn command_for(&self, case: &TestCase) -> Command {
        let mut command = Command::new(&self.config.analyzer);
        command
            .args(&self.config.base_args)
            .args(case.analyzer_args())
            .arg(&case.source_path);
        command
    }

    pub fn run_case(&self, case: &TestCase) -> Result<Outcome, RegrunError> {
        let mut command = self.command_for(case);
        debug!("running {:?}", command);
        let output = command.output().map_err(|source| RegrunError::AnalyzerLaunch {
            program: self.config.analyzer.clone(),
            source,
        })?;
        if output.status.success() {
            return Ok(Outcome::Passed);
        }
        Ok(Outcome::Failed {
            status: format!("analyzer exited with {}", output.status),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Runs every discovered fixture in path order. Invalid fixtures are
    /// reported alongside the others; only a launch failure stops the run.
    pub fn run(
        &self,
        discovered: Discovered,
        root: &Path,
        sink: &mut dyn ReportSink,
    ) -> Result<RunSummary, RegrunError> {
        let mut pending: Vec<(PathBuf, Result<TestCase, RegrunError>)> = discovered
            .cases
            .into_iter()
            .map(|case| (case.source_path.clone(), Ok(case)))
            .chain(
                discovered
                    .invalid
                    .into_iter()
                    .map(|invalid| (invalid.path, Err(invalid.error))),
            )
            .collect();
        pending.sort_by(|a, b| a.0.cmp(&b.0));

        let mut summary = RunSummary::default();
        for (path, loaded) in pending {
            let outcome = match loaded {
                Err(_) if !self.selection.matches_path(&path, root) => Outcome::Filtered,
                Err(error) => Outcome::Invalid(error),
                Ok(case) => match self.selection.decide(&case, root) {
                    Decision::Filtered => Outcome::Filtered,
                    Decision::Skipped => Outcome::Skipped,
                    Decision::Run => self.run_case(&case)?,
                },
            };
            summary.record(&outcome);
            sink.fixture(&FixtureResult { path, outcome });
        }

        info!("run finished: {}", summary.summary_line());
        sink.finish(&summary);
        Ok(summary)
    }
}
