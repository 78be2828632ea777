//! Fixture harness: selection, analyzer runs and reporting.

pub mod report;
pub mod runner;
pub mod selection;

pub use report::{ReportBuffer, ReportSink, RunSummary, TerminalReport};
pub use runner::{FixtureResult, FixtureRunner, Outcome};
pub use selection::{relative_name, Decision, Selection};
