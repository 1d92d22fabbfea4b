//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{CaseArg, EvalCommand, ExpandCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;

/// Step condition and macro expansion tool for CI/CD jobs
#[derive(Debug, Parser, Clone)]
#[command(name = "pipeline-conditions")]
#[command(version)]
#[command(about = "Evaluate step conditions and expand ${{name}} macros for CI/CD jobs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Variable name comparison
    #[arg(long, value_enum, global = true, default_value_t = CaseArg::Platform)]
    pub case: CaseArg,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a job, deciding each step from its condition
    Run(RunCommand),

    /// Validate a job configuration
    Validate(ValidateCommand),

    /// Evaluate a single condition
    Eval(EvalCommand),

    /// Expand ${{name}} macros in a string
    Expand(ExpandCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
