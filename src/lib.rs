//! pipeline-conditions - step conditions and macro expansion for CI/CD jobs

pub mod cli;
pub mod condition;
pub mod core;
pub mod execution;
pub mod expressions;

// Re-export commonly used types
pub use condition::{parse_condition, should_run, ConditionError, ConditionEvaluator, ConditionNode};
pub use crate::core::{CaseSensitivity, Job, JobStatus, MacroExpander, StepOutcome, VariableStore};
pub use execution::{DryRunHandler, JobEvent, JobReport, JobRunner, StepHandler};
pub use expressions::{EvaluationError, ParseError};
