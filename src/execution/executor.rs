//! Step executor - hands resolved steps to a handler

use crate::core::{ExecutionContext, ResolvedStep, Step, StepOutcome, StepResult};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors a step handler can report instead of a result
#[derive(Debug, Clone, Error)]
pub enum StepError {
    #[error("Step failed: {0}")]
    Failed(String),

    #[error("Step handler not available: {0}")]
    Unavailable(String),
}

/// Runs the body of a step
///
/// Implementations receive the step with inputs and environment already
/// expanded.
pub trait StepHandler {
    fn run(&self, step: &ResolvedStep) -> Result<StepResult, StepError>;
}

impl<H: StepHandler + ?Sized> StepHandler for &H {
    fn run(&self, step: &ResolvedStep) -> Result<StepResult, StepError> {
        (**self).run(step)
    }
}

impl<H: StepHandler + ?Sized> StepHandler for Box<H> {
    fn run(&self, step: &ResolvedStep) -> Result<StepResult, StepError> {
        (**self).run(step)
    }
}

/// Handler that reports each step's declared result without running anything
#[derive(Debug, Clone, Default)]
pub struct DryRunHandler {
    declared: HashMap<String, StepResult>,
}

impl DryRunHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler reporting the results declared on `steps`
    pub fn from_steps<'a>(steps: impl IntoIterator<Item = &'a Step>) -> Self {
        Self {
            declared: steps
                .into_iter()
                .map(|step| (step.id.clone(), step.declared.clone()))
                .collect(),
        }
    }
}

impl StepHandler for DryRunHandler {
    fn run(&self, step: &ResolvedStep) -> Result<StepResult, StepError> {
        Ok(self.declared.get(&step.id).cloned().unwrap_or_default())
    }
}

/// Result of executing a step that passed its condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Outcome as merged into the job, after continue-on-error
    pub outcome: StepOutcome,

    /// Handler error, if the handler did not produce a result
    pub error: Option<String>,
}

/// Executes a single step against the job context
pub struct StepExecutor<H> {
    handler: H,
}

impl<H: StepHandler> StepExecutor<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    /// Resolve the step, run it and apply what it reports to `context`
    ///
    /// Outputs become variables and PATH prepends go into the job
    /// environment, so they are visible to every later step.
    pub fn execute(&self, step: &Step, context: &mut ExecutionContext) -> ExecutionResult {
        info!("Executing step: {}", step.id);

        let resolved = step.resolve(&context.variables, &context.environment);
        debug!("Resolved inputs for step {}: {:?}", step.id, resolved.inputs.keys());

        let result = match self.handler.run(&resolved) {
            Ok(result) => result,
            Err(e) => {
                error!("Handler error for step {}: {}", step.id, e);
                return ExecutionResult {
                    outcome: StepOutcome::Failed.with_continue_on_error(step.continue_on_error),
                    error: Some(e.to_string()),
                };
            }
        };

        // Sorted so outputs colliding under the store's policy resolve the same way every run
        let mut outputs: Vec<_> = result.outputs.iter().collect();
        outputs.sort();
        for (name, value) in outputs {
            if let Err(e) = context.variables.set(name, value.as_str()) {
                warn!("Step {} set an invalid variable: {}", step.id, e);
            }
        }
        for directory in &result.prepend_path {
            context.environment.prepend_path(directory.as_str());
        }

        ExecutionResult {
            outcome: result.outcome.with_continue_on_error(step.continue_on_error),
            error: None,
        }
    }
}
