//! Regrun error handling.
//!
//! Every failure the harness can hit is a variant of [`RegrunError`]. Variants that
//! point at fixture text carry the source and a span so `miette` can render the
//! offending directive token in context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, SourceSpan};
use thiserror::Error;

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// Shared, named source text used by span-bearing diagnostics.
pub type SourceArc = Arc<NamedSource<String>>;

/// Builds a named source for diagnostics from a display name and its text.
pub fn named_source(name: impl AsRef<str>, text: impl Into<String>) -> SourceArc {
    Arc::new(NamedSource::new(name, text.into()))
}

/// Converts a byte range into a miette span.
pub fn to_source_span(range: std::ops::Range<usize>) -> SourceSpan {
    SourceSpan::from(range)
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// Broad classification of errors, used by the runner and by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    Directive,
    Options,
    Io,
    Config,
    Launch,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorType::Directive => "Directive",
            ErrorType::Options => "Options",
            ErrorType::Io => "Io",
            ErrorType::Config => "Config",
            ErrorType::Launch => "Launch",
        };
        f.write_str(name)
    }
}

#[derive(Error, Diagnostic, Debug)]
pub enum RegrunError {
    #[error("Malformed directive: {reason}")]
    #[diagnostic(code(regrun::directive::malformed))]
    MalformedDirective {
        reason: String,
        #[source_code]
        src: SourceArc,
        #[label("here")]
        span: SourceSpan,
        #[help]
        help: Option<String>,
    },

    #[error("Option conflict at '{path}': {reason}")]
    #[diagnostic(code(regrun::options::conflict))]
    OptionConflict { path: String, reason: String },

    #[error("Failed to read '{}'", path.display())]
    #[diagnostic(code(regrun::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk '{}': {message}", root.display())]
    #[diagnostic(code(regrun::discovery))]
    Walk { root: PathBuf, message: String },

    #[error("Invalid configuration in '{}': {message}", path.display())]
    #[diagnostic(code(regrun::config))]
    Config { path: PathBuf, message: String },

    #[error("Failed to launch analyzer '{program}'")]
    #[diagnostic(
        code(regrun::launch),
        help("set `analyzer` in the config file or pass --analyzer")
    )]
    AnalyzerLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl RegrunError {
    /// Creates a `MalformedDirective` pointing at `span` within `src`.
    pub fn malformed(
        reason: impl Into<String>,
        src: &SourceArc,
        span: std::ops::Range<usize>,
    ) -> Self {
        Self::MalformedDirective {
            reason: reason.into(),
            src: src.clone(),
            span: to_source_span(span),
            help: None,
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn conflict(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OptionConflict {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Attaches a help message. Only span-bearing variants keep it.
    pub fn with_help(mut self, message: impl Into<String>) -> Self {
        if let Self::MalformedDirective { help, .. } = &mut self {
            *help = Some(message.into());
        }
        self
    }

    pub fn kind(&self) -> ErrorType {
        match self {
            Self::MalformedDirective { .. } => ErrorType::Directive,
            Self::OptionConflict { .. } => ErrorType::Options,
            Self::Io { .. } | Self::Walk { .. } => ErrorType::Io,
            Self::Config { .. } => ErrorType::Config,
            Self::AnalyzerLaunch { .. } => ErrorType::Launch,
        }
    }
}

// ============================================================================
// ERROR FORMATTING
// ============================================================================

/// Renders an error with its source snippet into a plain (uncolored) string.
pub fn render_error(error: &RegrunError) -> String {
    let mut out = String::new();
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    if handler.render_report(&mut out, error).is_err() {
        out = error.to_string();
    }
    out
}

/// Prints an error with full miette diagnostics to stderr.
pub fn print_error(error: RegrunError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}
