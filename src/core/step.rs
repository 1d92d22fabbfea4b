//! Step domain model

use crate::condition::{parse_condition, ConditionError, ConditionNode};
use crate::core::config::StepConfig;
use crate::core::context::JobEnvironment;
use crate::core::macros::MacroExpander;
use crate::core::status::StepOutcome;
use crate::core::variables::VariableStore;
use std::collections::HashMap;

/// What a step reports back once it has run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepResult {
    pub outcome: StepOutcome,

    /// Variables to set for later steps
    pub outputs: HashMap<String, String>,

    /// Directories to put in front of PATH for later steps
    pub prepend_path: Vec<String>,
}

impl StepResult {
    pub fn new(outcome: StepOutcome) -> Self {
        Self {
            outcome,
            ..Self::default()
        }
    }

    pub fn with_output(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.outputs.insert(name.into(), value.into());
        self
    }
}

/// A single step in a job
#[derive(Debug, Clone)]
pub struct Step {
    /// Unique step identifier
    pub id: String,

    /// Name shown to users
    pub display_name: String,

    /// Condition text; `None` runs the step when the job has succeeded so far
    pub condition: Option<String>,

    /// Failures count as succeeded-with-issues
    pub continue_on_error: bool,

    /// Inputs before macro expansion
    pub inputs: HashMap<String, Option<String>>,

    /// Environment before macro expansion
    pub env: HashMap<String, Option<String>>,

    /// Result declared in configuration, reported by dry runs
    pub declared: StepResult,
}

/// A step with its inputs and environment expanded, ready to hand to a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStep {
    pub id: String,
    pub display_name: String,
    pub inputs: HashMap<String, String>,
    pub env: HashMap<String, String>,
}

impl Step {
    /// Create a step from a step config
    pub fn from_config(config: &StepConfig) -> Self {
        Step {
            id: config.id.clone(),
            display_name: config.name.clone().unwrap_or_else(|| config.id.clone()),
            condition: config.condition.clone(),
            continue_on_error: config.continue_on_error,
            inputs: config.inputs.clone(),
            env: config.env.clone(),
            declared: StepResult {
                outcome: config.outcome,
                outputs: config.outputs.clone(),
                prepend_path: config.prepend_path.clone(),
            },
        }
    }

    /// Condition text as written, empty when absent
    pub fn condition_text(&self) -> &str {
        self.condition.as_deref().unwrap_or_default()
    }

    pub fn parse_condition(&self) -> Result<ConditionNode, ConditionError> {
        parse_condition(self.condition_text())
    }

    /// Expand inputs and environment against the current variables
    ///
    /// The job environment is the base; step env entries override it. PATH
    /// gets the job's prepends in front of whatever base value is present.
    pub fn resolve(&self, variables: &VariableStore, environment: &JobEnvironment) -> ResolvedStep {
        let expander = MacroExpander::new();

        let mut env = environment.variables.clone();
        expander.expand_values(variables, &mut env);
        env.extend(expander.expand_nullable_values(variables, &self.env));

        if !environment.path_prepends.is_empty() {
            let base = env.get("PATH").cloned().unwrap_or_default();
            env.insert("PATH".to_string(), environment.effective_path(&base));
        }

        ResolvedStep {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            inputs: expander.expand_nullable_values(variables, &self.inputs),
            env,
        }
    }
}
