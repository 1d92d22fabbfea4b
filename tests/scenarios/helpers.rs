//! Test utility functions for job scenarios

use pipeline_conditions::core::config::JobConfig;
use pipeline_conditions::core::{CaseSensitivity, Job, ResolvedStep, StepOutcome, StepResult};
use pipeline_conditions::execution::{JobEvent, JobReport, JobRunner, StepError, StepHandler};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock handler that records every step it is handed
///
/// Steps report their declared result unless an override is registered.
#[derive(Default)]
pub struct RecordingHandler {
    declared: HashMap<String, StepResult>,
    overrides: HashMap<String, Result<StepResult, StepError>>,
    received: Mutex<Vec<ResolvedStep>>,
}

impl RecordingHandler {
    pub fn for_job(job: &Job) -> Self {
        Self {
            declared: job
                .steps
                .iter()
                .map(|s| (s.id.clone(), s.declared.clone()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_error(mut self, step_id: &str, message: &str) -> Self {
        self.overrides
            .insert(step_id.to_string(), Err(StepError::Failed(message.to_string())));
        self
    }

    pub fn received(&self) -> Vec<ResolvedStep> {
        self.received.lock().unwrap().clone()
    }

}

impl StepHandler for RecordingHandler {
    fn run(&self, step: &ResolvedStep) -> Result<StepResult, StepError> {
        self.received.lock().unwrap().push(step.clone());
        match self.overrides.get(&step.id) {
            Some(result) => result.clone(),
            None => Ok(self.declared.get(&step.id).cloned().unwrap_or_default()),
        }
    }
}

/// Result of running a job through the mock handler
pub struct ScenarioResult {
    pub report: JobReport,
    pub events: Vec<JobEvent>,
    pub received: Vec<ResolvedStep>,
}

pub fn load_job(yaml: &str, policy: CaseSensitivity) -> Job {
    let config = JobConfig::from_yaml(yaml).expect("job YAML should be valid");
    Job::from_config(&config, policy).expect("job should build")
}

pub fn run_job(job: &Job, handler: RecordingHandler) -> ScenarioResult {
    let runner = JobRunner::new(&handler);

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    runner.add_event_handler(move |event| sink.lock().unwrap().push(event));

    let report = runner.run(job);
    let events = events.lock().unwrap().clone();

    ScenarioResult {
        report,
        events,
        received: handler.received(),
    }
}

/// Parse and run `yaml` with case-sensitive variables
pub fn run_yaml(yaml: &str) -> ScenarioResult {
    let job = load_job(yaml, CaseSensitivity::Sensitive);
    let handler = RecordingHandler::for_job(&job);
    run_job(&job, handler)
}

pub fn assert_outcome(result: &ScenarioResult, step_id: &str, expected: StepOutcome) {
    let record = result
        .report
        .step(step_id)
        .unwrap_or_else(|| panic!("no record for step {}", step_id));
    assert_eq!(
        record.outcome, expected,
        "step {} should be {:?}, was {:?}",
        step_id, expected, record.outcome
    );
}

pub fn received_input(result: &ScenarioResult, step_id: &str, input: &str) -> String {
    result
        .received
        .iter()
        .find(|s| s.id == step_id)
        .and_then(|s| s.inputs.get(input).cloned())
        .unwrap_or_else(|| panic!("step {} did not receive input {}", step_id, input))
}
