//! Job execution

pub mod engine;
pub mod executor;

pub use engine::{CancelHandle, EventHandler, JobEvent, JobReport, JobRunner, StepRecord};
pub use executor::{DryRunHandler, ExecutionResult, StepError, StepExecutor, StepHandler};
