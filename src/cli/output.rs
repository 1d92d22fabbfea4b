//! CLI output formatting

use crate::{
    condition::DiagnosticSink,
    core::{JobStatus, StepOutcome},
    execution::JobEvent,
};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");

/// Format a job status for display
pub fn format_status(status: JobStatus) -> String {
    match status {
        JobStatus::Succeeded => style("SUCCEEDED").green().to_string(),
        JobStatus::SucceededWithIssues => style("SUCCEEDED WITH ISSUES").yellow().to_string(),
        JobStatus::Failed => style("FAILED").red().to_string(),
        JobStatus::Canceled => style("CANCELED").yellow().to_string(),
    }
}

/// Format a step outcome for display
pub fn format_outcome(outcome: StepOutcome) -> String {
    match outcome {
        StepOutcome::Succeeded => style("SUCCEEDED").green().to_string(),
        StepOutcome::SucceededWithIssues => style("SUCCEEDED WITH ISSUES").yellow().to_string(),
        StepOutcome::Failed => style("FAILED").red().to_string(),
        StepOutcome::Canceled => style("CANCELED").yellow().to_string(),
        StepOutcome::Skipped => style("SKIPPED").dim().to_string(),
    }
}

/// Format a condition result the way diagnostics print booleans
pub fn format_condition_result(result: bool) -> String {
    if result {
        style("True").green().to_string()
    } else {
        style("False").red().to_string()
    }
}

/// Format a job event for display
pub fn format_job_event(event: &JobEvent) -> String {
    match event {
        JobEvent::JobStarted { job_name } => {
            format!("{} Starting job {}", ROCKET, style(job_name).bold())
        }
        JobEvent::ConditionEvaluated {
            step_id,
            condition,
            result,
        } => format!(
            "{} {} {} => {}",
            INFO,
            style(step_id).dim(),
            style(condition).cyan(),
            format_condition_result(*result)
        ),
        JobEvent::StepSkipped { step_id } => {
            format!("{} {} skipped", SKIP, style(step_id).dim())
        }
        JobEvent::StepStarted {
            step_id,
            display_name,
        } => {
            if display_name != step_id {
                format!(
                    "{} {} ({})",
                    SPINNER,
                    style(display_name).cyan(),
                    style(step_id).dim()
                )
            } else {
                format!("{} {}", SPINNER, style(step_id).cyan())
            }
        }
        JobEvent::StepFinished { step_id, outcome } => {
            let icon = match outcome {
                StepOutcome::Succeeded => CHECK,
                StepOutcome::SucceededWithIssues | StepOutcome::Canceled => WARN,
                StepOutcome::Failed => CROSS,
                StepOutcome::Skipped => SKIP,
            };
            format!("{} {} {}", icon, style(step_id).bold(), format_outcome(*outcome))
        }
        JobEvent::StepErrored { step_id, error } => {
            format!("{} {}: {}", CROSS, style(step_id).red(), style(error).dim())
        }
        JobEvent::JobFinished { job_name, status } => format!(
            "{} Job {} {}",
            INFO,
            style(job_name).bold(),
            format_status(*status)
        ),
    }
}

/// Prints condition diagnostics to stdout
///
/// Verbose lines only show with `--verbose`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    verbose: bool,
}

impl ConsoleSink {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl DiagnosticSink for ConsoleSink {
    fn info(&self, message: &str) {
        println!("  {}", message);
    }

    fn verbose(&self, message: &str) {
        if self.verbose {
            println!("    {}", style(message).dim());
        }
    }
}
