//! The Regrun command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the library functions.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde_json::json;

use crate::{
    config::HarnessConfig,
    discovery::FixtureDiscoverer,
    errors::{print_error, RegrunError},
    fixture::TestCase,
    harness::{relative_name, FixtureRunner, Selection, TerminalReport},
    options::OptionTree,
};

// ============================================================================
// CLI ARGUMENTS
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "regrun",
    version,
    about = "Directive-driven regression fixture harness for external static analyzers."
)]
pub struct RegrunArgs {
    /// YAML harness configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ArgsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ArgsCommand {
    /// Print the directives of a fixture's first line.
    Parse {
        #[arg(required = true)]
        file: PathBuf,
        /// Emit JSON instead of one directive per line.
        #[arg(long)]
        json: bool,
    },
    /// Print the analyzer arguments a fixture's directives expand to.
    Args {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Print the analyzer option tree after applying a fixture's directives.
    Options {
        #[arg(required = true)]
        file: PathBuf,
        /// JSON file with the base option tree.
        #[arg(long)]
        base: Option<PathBuf>,
    },
    /// List fixtures under a root directory, grouped by category.
    List {
        /// Fixture root (defaults to the configured root).
        root: Option<PathBuf>,
    },
    /// Run the analyzer on every selected fixture.
    Run {
        /// Only run fixtures whose path contains one of these; an exact name
        /// (`36-apron/89-mine14-mod`, `89-mine14-mod` or `36/89`) also runs SKIP fixtures.
        filters: Vec<String>,
        /// Fixture root (defaults to the configured root).
        #[arg(long)]
        root: Option<PathBuf>,
        /// Analyzer executable.
        #[arg(long)]
        analyzer: Option<String>,
        /// Run fixtures marked SKIP.
        #[arg(long)]
        run_skipped: bool,
        /// Also list fixtures excluded by the filters.
        #[arg(long)]
        show_filtered: bool,
    },
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

pub fn run() {
    let args = RegrunArgs::parse();
    match execute(args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            print_error(e);
            process::exit(1);
        }
    }
}

/// Runs a parsed command. `Ok(false)` means the command completed but the
/// result is a failure (failed or invalid fixtures).
pub fn execute(args: RegrunArgs) -> Result<bool, RegrunError> {
    let config = match &args.config {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };

    match args.command {
        ArgsCommand::Parse { file, json } => {
            let case = TestCase::load(&file)?;
            if json {
                print_json(&json!({
                    "path": case.source_path,
                    "id": case.id,
                    "skip": case.skip,
                    "directives": case.directives,
                    "annotations": case.annotations(),
                }));
            } else {
                print_directives(&case);
            }
        }

        ArgsCommand::Args { file } => {
            let case = TestCase::load(&file)?;
            for arg in case.analyzer_args() {
                println!("{}", arg);
            }
        }

        ArgsCommand::Options { file, base } => {
            let case = TestCase::load(&file)?;
            let mut tree = match base {
                Some(base) => OptionTree::load(&base)?,
                None => OptionTree::new(),
            };
            tree.apply_all(&case.directives)?;
            print_json(&tree.as_value());
        }

        ArgsCommand::List { root } => {
            let root = root.unwrap_or(config.root);
            return list_fixtures(&root);
        }

        ArgsCommand::Run {
            filters,
            root,
            analyzer,
            run_skipped,
            show_filtered,
        } => {
            let mut config = config;
            if let Some(root) = root {
                config.root = root;
            }
            if let Some(analyzer) = analyzer {
                config.analyzer = analyzer;
            }
            config.run_skipped |= run_skipped;

            let selection = Selection::new(filters, config.run_skipped);
            let discovered = FixtureDiscoverer::load_all(&config.root)?;
            let mut report = TerminalReport::new(config.use_colors).show_filtered(show_filtered);
            let summary =
                FixtureRunner::new(&config, &selection).run(discovered, &config.root, &mut report)?;
            return Ok(summary.is_success());
        }
    }
    Ok(true)
}

// ============================================================================
// OUTPUT FUNCTIONS
// ============================================================================

fn print_directives(case: &TestCase) {
    if case.skip {
        println!("SKIP");
    }
    if case.directives.is_empty() {
        println!("(no directives)");
        return;
    }
    for directive in &case.directives {
        println!("{}", directive);
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn list_fixtures(root: &Path) -> Result<bool, RegrunError> {
    let discovered = FixtureDiscoverer::load_all(root)?;
    for (category, cases) in discovered.by_category() {
        println!("{}", category);
        for case in cases {
            println!(
                "  {:<40} {:<6} {:>2} directive(s){}",
                relative_name(&case.source_path, root),
                case.id.as_ref().map(|id| id.short()).unwrap_or_else(|| "-".into()),
                case.directives.len(),
                if case.skip { "  SKIP" } else { "" }
            );
        }
    }
    for invalid in &discovered.invalid {
        println!(
            "  {:<40} invalid: {}",
            relative_name(&invalid.path, root),
            invalid.error
        );
    }
    Ok(discovered.invalid.is_empty())
}
