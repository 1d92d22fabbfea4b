//! CLI command definitions

use crate::core::{CaseSensitivity, JobStatus};
use clap::Args;

/// Run a job
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to job YAML file
    #[arg(short, long)]
    pub file: String,

    /// Variable overrides (key=value)
    #[arg(long, value_parser = parse_key_value)]
    pub variable: Vec<(String, String)>,

    /// Keep condition diagnostics out of the console
    #[arg(long)]
    pub host_only: bool,
}

/// Validate a job configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to job YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Evaluate a condition
#[derive(Debug, Args, Clone)]
pub struct EvalCommand {
    /// Condition text; empty means succeeded()
    #[arg(short, long, default_value = "")]
    pub condition: String,

    /// Job status to evaluate against
    #[arg(long, value_enum, default_value_t = StatusArg::Succeeded)]
    pub status: StatusArg,

    /// Variables (key=value)
    #[arg(long, value_parser = parse_key_value)]
    pub variable: Vec<(String, String)>,

    /// Keep diagnostics in the log only
    #[arg(long)]
    pub host_only: bool,
}

/// Expand macros in a string
#[derive(Debug, Args, Clone)]
pub struct ExpandCommand {
    /// Text containing ${{name}} macros
    #[arg(short, long)]
    pub text: String,

    /// Variables (key=value)
    #[arg(long, value_parser = parse_key_value)]
    pub variable: Vec<(String, String)>,
}

/// Job status argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StatusArg {
    Succeeded,
    #[clap(name = "succeeded-with-issues")]
    SucceededWithIssues,
    Failed,
    Canceled,
}

impl From<StatusArg> for JobStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Succeeded => JobStatus::Succeeded,
            StatusArg::SucceededWithIssues => JobStatus::SucceededWithIssues,
            StatusArg::Failed => JobStatus::Failed,
            StatusArg::Canceled => JobStatus::Canceled,
        }
    }
}

/// Variable name comparison argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CaseArg {
    /// Use the job's setting, else the platform default
    Platform,
    Sensitive,
    Insensitive,
}

impl CaseArg {
    /// Policy to use when the job itself asks for `configured`
    pub fn resolve(self, configured: CaseSensitivity) -> CaseSensitivity {
        match self {
            CaseArg::Platform => configured,
            CaseArg::Sensitive => CaseSensitivity::Sensitive,
            CaseArg::Insensitive => CaseSensitivity::Insensitive,
        }
    }
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("Empty variable name in: {}", s)),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("Invalid key=value pair: {}", s)),
    }
}
