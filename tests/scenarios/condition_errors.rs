//! Test: Malformed conditions
//!
//! Configuration validation rejects conditions that do not parse. A job
//! built without validation fails the offending step at run time.

use crate::helpers::*;
use pipeline_conditions::core::config::JobConfig;
use pipeline_conditions::core::{CaseSensitivity, JobStatus, StepOutcome};
use pipeline_conditions::execution::JobEvent;

#[test]
fn test_validation_rejects_bad_condition() {
    let yaml = r#"
name: "Test: Bad condition"
steps:
  - id: "publish"
    condition: "eq(variables['branch'], 'main'"
"#;

    let message = format!("{:#}", JobConfig::from_yaml(yaml).unwrap_err());
    assert!(message.contains("Step 'publish' has an invalid condition"));
    assert!(message.contains("Unclosed function"));
}

#[test]
fn test_validation_rejects_unknown_function() {
    let yaml = r#"
name: "Test: Unknown function"
steps:
  - id: "notify"
    condition: "onFailure()"
"#;

    let message = format!("{:#}", JobConfig::from_yaml(yaml).unwrap_err());
    assert!(message.contains("onFailure"));
}

#[test]
fn test_parse_error_at_run_time_fails_step_and_job() {
    let mut job = load_job(
        r#"
name: "Test: Runtime parse error"
steps:
  - id: "build"
  - id: "publish"
  - id: "cleanup"
    condition: "always()"
"#,
        CaseSensitivity::Sensitive,
    );
    job.steps[1].condition = Some("and(succeeded(), eq(1, 1)".to_string());

    let handler = RecordingHandler::for_job(&job);
    let result = run_job(&job, handler);

    assert_outcome(&result, "build", StepOutcome::Succeeded);
    assert_outcome(&result, "publish", StepOutcome::Failed);
    assert_outcome(&result, "cleanup", StepOutcome::Succeeded);
    assert_eq!(result.report.status(), JobStatus::Failed);

    let error = result
        .events
        .iter()
        .find_map(|event| match event {
            JobEvent::StepErrored { step_id, error } if step_id == "publish" => Some(error.clone()),
            _ => None,
        })
        .expect("publish should report an error");
    assert!(error.contains("Unclosed function"));
    assert!(result.received.iter().all(|s| s.id != "publish"));
}

#[test]
fn test_empty_condition_means_succeeded() {
    let result = run_yaml(
        r#"
name: "Test: Empty condition"
steps:
  - id: "build"
    outcome: failed
  - id: "blank"
    condition: "   "
"#,
    );

    assert_outcome(&result, "blank", StepOutcome::Skipped);
}
