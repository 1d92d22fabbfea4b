//! Job domain model

use crate::core::{
    config::JobConfig,
    context::{ExecutionContext, JobEnvironment},
    step::Step,
    variables::{CaseSensitivity, VariableStore},
};
use anyhow::Result;

/// A job definition: ordered steps plus the variables and environment they start from
#[derive(Debug, Clone)]
pub struct Job {
    /// Job name
    pub name: String,

    /// Steps in execution order
    pub steps: Vec<Step>,

    /// Initial variables
    pub variables: VariableStore,

    /// Initial environment
    pub environment: JobEnvironment,
}

impl Job {
    /// Create a job from configuration
    pub fn from_config(config: &JobConfig, policy: CaseSensitivity) -> Result<Self> {
        config.check_variable_names(policy)?;

        let mut environment = JobEnvironment::new();
        for (key, value) in &config.environment {
            environment.set(key.clone(), value.clone());
        }
        for directory in &config.path {
            environment.prepend_path(directory.clone());
        }

        Ok(Job {
            name: config.name.clone(),
            steps: config.steps.iter().map(Step::from_config).collect(),
            variables: config.build_variable_store(policy)?,
            environment,
        })
    }

    /// Get a step by ID
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Fresh execution context for a run of this job
    pub fn create_context(&self) -> ExecutionContext {
        let mut context = ExecutionContext::new(self.variables.clone());
        context.environment = self.environment.clone();
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::status::JobStatus;

    #[test]
    fn test_job_from_config() {
        let yaml = r#"
name: "deploy"
variables:
  region: "eu-west-1"
environment:
  CI: "true"
path: ["/opt/a", "/opt/b"]
steps:
  - id: "plan"
  - id: "apply"
    name: "Apply changes"
"#;

        let config = JobConfig::from_yaml(yaml).unwrap();
        let job = Job::from_config(&config, CaseSensitivity::Sensitive).unwrap();

        assert_eq!(job.name, "deploy");
        assert_eq!(job.steps.len(), 2);
        assert_eq!(job.step("plan").map(|s| s.display_name.as_str()), Some("plan"));
        assert_eq!(job.step("apply").map(|s| s.display_name.as_str()), Some("Apply changes"));
        assert!(job.step("destroy").is_none());

        let context = job.create_context();
        assert_eq!(context.status, JobStatus::Succeeded);
        assert!(context.variables.contains("region").unwrap());
        assert_eq!(context.environment.get("CI"), Some("true"));
        assert_eq!(context.environment.path_prepends, vec!["/opt/a", "/opt/b"]);
    }
}
