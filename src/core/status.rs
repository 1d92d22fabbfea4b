//! Job status and step outcome models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate outcome of the steps executed so far in a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// No step has failed (also the state before any step ran)
    #[default]
    Succeeded,
    /// Some step finished with warnings or failed with continue-on-error
    SucceededWithIssues,
    /// Some step failed
    Failed,
    /// The job was canceled
    Canceled,
}

impl JobStatus {
    fn severity(self) -> u8 {
        match self {
            JobStatus::Succeeded => 0,
            JobStatus::SucceededWithIssues => 1,
            JobStatus::Failed => 2,
            JobStatus::Canceled => 3,
        }
    }

    /// Fold a finished step's outcome into the job status
    pub fn merge(self, outcome: StepOutcome) -> JobStatus {
        let other = match outcome {
            StepOutcome::Succeeded => JobStatus::Succeeded,
            StepOutcome::SucceededWithIssues => JobStatus::SucceededWithIssues,
            StepOutcome::Failed => JobStatus::Failed,
            StepOutcome::Canceled => JobStatus::Canceled,
            StepOutcome::Skipped => return self,
        };

        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    /// Whether the job still counts as successful
    pub fn is_success(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::SucceededWithIssues)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Succeeded => "Succeeded",
            JobStatus::SucceededWithIssues => "SucceededWithIssues",
            JobStatus::Failed => "Failed",
            JobStatus::Canceled => "Canceled",
        };
        f.write_str(name)
    }
}

/// Result of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    #[default]
    Succeeded,
    SucceededWithIssues,
    Failed,
    Canceled,
    /// The step's condition evaluated to false
    Skipped,
}

impl StepOutcome {
    /// Outcome as seen by the job when failures are tolerated
    pub fn with_continue_on_error(self, continue_on_error: bool) -> StepOutcome {
        match self {
            StepOutcome::Failed if continue_on_error => StepOutcome::SucceededWithIssues,
            other => other,
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepOutcome::Succeeded => "Succeeded",
            StepOutcome::SucceededWithIssues => "SucceededWithIssues",
            StepOutcome::Failed => "Failed",
            StepOutcome::Canceled => "Canceled",
            StepOutcome::Skipped => "Skipped",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_succeeded() {
        assert_eq!(JobStatus::default(), JobStatus::Succeeded);
    }

    #[test]
    fn test_merge_takes_most_severe() {
        let status = JobStatus::Succeeded
            .merge(StepOutcome::SucceededWithIssues)
            .merge(StepOutcome::Succeeded);
        assert_eq!(status, JobStatus::SucceededWithIssues);

        let status = status.merge(StepOutcome::Failed).merge(StepOutcome::SucceededWithIssues);
        assert_eq!(status, JobStatus::Failed);

        assert_eq!(status.merge(StepOutcome::Canceled), JobStatus::Canceled);
        assert_eq!(JobStatus::Canceled.merge(StepOutcome::Failed), JobStatus::Canceled);
    }

    #[test]
    fn test_skipped_leaves_status_alone() {
        assert_eq!(JobStatus::Failed.merge(StepOutcome::Skipped), JobStatus::Failed);
        assert_eq!(JobStatus::Succeeded.merge(StepOutcome::Skipped), JobStatus::Succeeded);
    }

    #[test]
    fn test_continue_on_error() {
        assert_eq!(
            StepOutcome::Failed.with_continue_on_error(true),
            StepOutcome::SucceededWithIssues
        );
        assert_eq!(StepOutcome::Failed.with_continue_on_error(false), StepOutcome::Failed);
        assert_eq!(
            StepOutcome::Canceled.with_continue_on_error(true),
            StepOutcome::Canceled
        );
    }

    #[test]
    fn test_outcome_from_yaml() {
        let outcome: StepOutcome = serde_yaml::from_str("succeeded_with_issues").unwrap();
        assert_eq!(outcome, StepOutcome::SucceededWithIssues);
    }
}
