//! CLI command definitions using clap.
//!
//! - check: run validators against a workspace and print a report
//! - list: show the registered validators

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use devsetup::report::ReportFormat;
use devsetup::runner::RunOptions;

/// Devsetup - validate a Python development environment
#[derive(Parser, Debug)]
#[command(name = "devsetup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the development environment
    Check(CheckArgs),

    /// List registered validators
    List,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Workspace to validate (defaults to the current directory)
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop after the first failing validator
    #[arg(long)]
    pub fail_fast: bool,

    /// Run validators concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Ignore cached results
    #[arg(long)]
    pub no_cache: bool,

    /// Run only the named validators, in the given order
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,
}

impl CheckArgs {
    /// Translate flags into run overrides; absent flags keep config values
    pub fn to_options(&self, verbose: bool) -> RunOptions {
        RunOptions {
            workspace: self.workspace.clone(),
            only: self.only.clone(),
            fail_fast: self.fail_fast.then_some(true),
            parallel: self.parallel.then_some(true),
            no_cache: self.no_cache,
            format: self.format,
            output: self.output.clone(),
            verbose,
        }
    }
}
