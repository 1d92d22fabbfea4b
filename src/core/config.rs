//! Job configuration from YAML

use crate::condition::parse_condition;
use crate::core::job::Job;
use crate::core::status::StepOutcome;
use crate::core::variables::{CaseSensitivity, VariableStore};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Variable definition - a plain value, null, or a secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableDefinition {
    /// Plain string value
    Value(String),
    /// Defined without a value
    Null,
    /// Value hidden from diagnostics
    Secret(String),
}

/// Top-level job configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Job name
    pub name: String,

    /// Variables available to conditions and macros
    #[serde(default)]
    variables: HashMap<String, Value>,

    /// Override the platform's variable name comparison
    #[serde(default)]
    pub case_sensitive_variables: Option<bool>,

    /// Environment variables for every step
    #[serde(default)]
    pub environment: HashMap<String, String>,

    /// Directories prepended to PATH for every step
    #[serde(default)]
    pub path: Vec<String>,

    /// Job steps, run in order
    pub steps: Vec<StepConfig>,
}

/// Step configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Unique step identifier
    pub id: String,

    /// Human-readable step name
    #[serde(default)]
    pub name: Option<String>,

    /// Condition deciding whether the step runs (default: succeeded())
    #[serde(default)]
    pub condition: Option<String>,

    /// Treat a failure of this step as succeeded-with-issues
    #[serde(default)]
    pub continue_on_error: bool,

    /// Step inputs; values may contain ${{name}} macros
    #[serde(default)]
    pub inputs: HashMap<String, Option<String>>,

    /// Step environment; values may contain ${{name}} macros
    #[serde(default)]
    pub env: HashMap<String, Option<String>>,

    /// Declared result, used by dry runs
    #[serde(default)]
    pub outcome: StepOutcome,

    /// Variables the step sets when it runs
    #[serde(default)]
    pub outputs: HashMap<String, String>,

    /// Directories the step prepends to PATH when it runs
    #[serde(default)]
    pub prepend_path: Vec<String>,
}

impl JobConfig {
    /// Load job configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse job configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: JobConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the job configuration
    pub fn validate(&self) -> Result<()> {
        let mut seen_ids = HashSet::new();
        for step in &self.steps {
            if step.id.trim().is_empty() {
                anyhow::bail!("Step with empty ID");
            }
            if !seen_ids.insert(&step.id) {
                anyhow::bail!("Duplicate step ID: {}", step.id);
            }

            // Conditions are parsed up front so a typo fails the job before any step runs
            if let Some(condition) = &step.condition {
                parse_condition(condition)
                    .with_context(|| format!("Step '{}' has an invalid condition", step.id))?;
            }

            if step.outputs.keys().any(|k| k.is_empty()) {
                anyhow::bail!("Step '{}' sets a variable with an empty name", step.id);
            }
        }

        if self.variables.keys().any(|k| k.is_empty()) {
            anyhow::bail!("Variable with empty name");
        }

        self.check_variable_names(self.case_sensitivity())
    }

    /// Reject variable and output names that collide under `policy`
    pub fn check_variable_names(&self, policy: CaseSensitivity) -> Result<()> {
        ensure_distinct_names(self.variables.keys(), policy).context("Conflicting job variables")?;
        for step in &self.steps {
            ensure_distinct_names(step.outputs.keys(), policy)
                .with_context(|| format!("Step '{}' has conflicting outputs", step.id))?;
        }
        Ok(())
    }

    /// Name comparison policy for this job
    pub fn case_sensitivity(&self) -> CaseSensitivity {
        match self.case_sensitive_variables {
            Some(true) => CaseSensitivity::Sensitive,
            Some(false) => CaseSensitivity::Insensitive,
            None => CaseSensitivity::platform(),
        }
    }

    /// Get variables as parsed VariableDefinition enum
    pub fn get_variables(&self) -> HashMap<String, VariableDefinition> {
        self.variables
            .iter()
            .map(|(key, value)| (key.clone(), parse_definition(value)))
            .collect()
    }

    /// Build the variable store for a run
    pub fn build_variable_store(&self, policy: CaseSensitivity) -> Result<VariableStore> {
        ensure_distinct_names(self.variables.keys(), policy).context("Conflicting job variables")?;

        let mut store = VariableStore::new(policy);
        for (name, definition) in self.get_variables() {
            match definition {
                VariableDefinition::Value(value) => store.set(&name, value)?,
                VariableDefinition::Null => store.set_null(&name)?,
                VariableDefinition::Secret(value) => store.set_secret(&name, value)?,
            }
        }
        Ok(store)
    }

    /// Convert config to a Job domain model using the configured policy
    pub fn to_job(&self) -> Result<Job> {
        Job::from_config(self, self.case_sensitivity())
    }
}

/// Fails when two names map to the same store key under `policy`
fn ensure_distinct_names<'a>(
    names: impl IntoIterator<Item = &'a String>,
    policy: CaseSensitivity,
) -> Result<()> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    let mut names: Vec<&String> = names.into_iter().collect();
    names.sort();
    for name in names {
        if let Some(previous) = seen.insert(policy.key(name), name) {
            anyhow::bail!("Variables '{}' and '{}' refer to the same name", previous, name);
        }
    }
    Ok(())
}

fn parse_definition(value: &Value) -> VariableDefinition {
    match value {
        Value::Null => VariableDefinition::Null,
        Value::String(s) => VariableDefinition::Value(s.clone()),
        Value::Bool(b) => VariableDefinition::Value(b.to_string()),
        Value::Number(n) => VariableDefinition::Value(n.to_string()),
        Value::Mapping(map) => {
            // { value: "...", secret: true/false }
            let value = map
                .get("value")
                .and_then(|v| match v {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(scalar_to_string(other)),
                });
            let secret = map
                .get("secret")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);

            match (value, secret) {
                (Some(value), true) => VariableDefinition::Secret(value),
                (Some(value), false) => VariableDefinition::Value(value),
                (None, _) => VariableDefinition::Null,
            }
        }
        other => VariableDefinition::Value(scalar_to_string(other)),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
