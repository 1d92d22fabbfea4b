//! Execution context - job status, variables and environment

use crate::core::status::{JobStatus, StepOutcome};
use crate::core::variables::{CaseSensitivity, VariableStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Separator between PATH entries on the target platform
pub const PATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

/// Environment handed to steps
///
/// Held explicitly per job instead of mutating the runner's own process
/// environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobEnvironment {
    /// Extra environment variables for every step
    pub variables: HashMap<String, String>,

    /// Directories to put in front of PATH, in the order they were added
    pub path_prepends: Vec<String>,
}

impl JobEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Put `directory` in front of PATH for later steps
    pub fn prepend_path(&mut self, directory: impl Into<String>) {
        let directory = directory.into();
        self.path_prepends.retain(|d| d != &directory);
        self.path_prepends.push(directory);
    }

    /// PATH value: prepends (most recent first) followed by `base`
    pub fn effective_path(&self, base: &str) -> String {
        self.path_prepends
            .iter()
            .rev()
            .map(String::as_str)
            .chain(std::iter::once(base).filter(|b| !b.is_empty()))
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR)
    }
}

/// State of one job while its steps run
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Aggregate status of the steps run so far
    pub status: JobStatus,

    /// Job variables
    pub variables: VariableStore,

    /// Environment passed to steps
    pub environment: JobEnvironment,
}

impl ExecutionContext {
    pub fn new(variables: VariableStore) -> Self {
        Self {
            status: JobStatus::default(),
            variables,
            environment: JobEnvironment::new(),
        }
    }

    /// Context with no variables under the given case policy
    pub fn with_policy(policy: CaseSensitivity) -> Self {
        Self::new(VariableStore::new(policy))
    }

    /// Fold a step outcome into the job status
    pub fn record_outcome(&mut self, outcome: StepOutcome) {
        self.status = self.status.merge(outcome);
    }

    pub fn cancel(&mut self) {
        self.status = JobStatus::Canceled;
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(VariableStore::default())
    }
}
