//! Built-in status functions

use crate::core::status::JobStatus;

/// Zero-argument predicates over the job status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFunction {
    Always,
    Canceled,
    Failed,
    Succeeded,
    SucceededOrFailed,
}

impl ConditionFunction {
    pub const ALL: [ConditionFunction; 5] = [
        ConditionFunction::Always,
        ConditionFunction::Canceled,
        ConditionFunction::Failed,
        ConditionFunction::Succeeded,
        ConditionFunction::SucceededOrFailed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConditionFunction::Always => "always",
            ConditionFunction::Canceled => "canceled",
            ConditionFunction::Failed => "failed",
            ConditionFunction::Succeeded => "succeeded",
            ConditionFunction::SucceededOrFailed => "succeededOrFailed",
        }
    }

    /// Only the job status is consulted
    pub fn evaluate(self, status: JobStatus) -> bool {
        match self {
            ConditionFunction::Always => true,
            ConditionFunction::Canceled => status == JobStatus::Canceled,
            ConditionFunction::Failed => status == JobStatus::Failed,
            ConditionFunction::Succeeded => {
                matches!(status, JobStatus::Succeeded | JobStatus::SucceededWithIssues)
            }
            ConditionFunction::SucceededOrFailed => matches!(
                status,
                JobStatus::Succeeded | JobStatus::SucceededWithIssues | JobStatus::Failed
            ),
        }
    }
}
