//! Test: Status-based step conditions
//!
//! Steps decide whether to run from the status of the steps before them:
//! - No condition means succeeded()
//! - Cleanup steps use always() / succeededOrFailed()
//! - continue_on_error keeps the job succeeding with issues

use crate::helpers::*;
use pipeline_conditions::core::{JobStatus, StepOutcome};
use pipeline_conditions::execution::JobEvent;

#[test]
fn test_all_steps_run_on_success() {
    let result = run_yaml(
        r#"
name: "Test: Success chain"
steps:
  - id: "restore"
  - id: "build"
  - id: "test"
"#,
    );

    assert_eq!(result.report.status(), JobStatus::Succeeded);
    assert_eq!(result.received.len(), 3);
    for id in ["restore", "build", "test"] {
        assert_outcome(&result, id, StepOutcome::Succeeded);
    }
}

#[test]
fn test_failure_skips_default_conditions() {
    let result = run_yaml(
        r#"
name: "Test: Failure"
steps:
  - id: "build"
    outcome: failed
  - id: "test"
  - id: "publish"
    condition: "succeeded()"
  - id: "collect-logs"
    condition: "succeededOrFailed()"
  - id: "notify"
    condition: "failed()"
  - id: "cleanup"
    condition: "always()"
"#,
    );

    assert_eq!(result.report.status(), JobStatus::Failed);
    assert_outcome(&result, "build", StepOutcome::Failed);
    assert_outcome(&result, "test", StepOutcome::Skipped);
    assert_outcome(&result, "publish", StepOutcome::Skipped);
    assert_outcome(&result, "collect-logs", StepOutcome::Succeeded);
    assert_outcome(&result, "notify", StepOutcome::Succeeded);
    assert_outcome(&result, "cleanup", StepOutcome::Succeeded);

    let ran: Vec<_> = result.received.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ran, vec!["build", "collect-logs", "notify", "cleanup"]);
}

#[test]
fn test_continue_on_error_keeps_job_running() {
    let result = run_yaml(
        r#"
name: "Test: Continue on error"
steps:
  - id: "lint"
    outcome: failed
    continue_on_error: true
  - id: "build"
  - id: "notify"
    condition: "failed()"
"#,
    );

    assert_eq!(result.report.status(), JobStatus::SucceededWithIssues);
    assert_outcome(&result, "lint", StepOutcome::SucceededWithIssues);
    assert_outcome(&result, "build", StepOutcome::Succeeded);
    assert_outcome(&result, "notify", StepOutcome::Skipped);
}

#[test]
fn test_handler_error_fails_job() {
    let job = load_job(
        r#"
name: "Test: Handler error"
steps:
  - id: "deploy"
  - id: "rollback"
    condition: "failed()"
"#,
        pipeline_conditions::CaseSensitivity::Sensitive,
    );
    let handler = RecordingHandler::for_job(&job).with_error("deploy", "connection refused");
    let result = run_job(&job, handler);

    assert_eq!(result.report.status(), JobStatus::Failed);
    assert_outcome(&result, "deploy", StepOutcome::Failed);
    assert_outcome(&result, "rollback", StepOutcome::Succeeded);
    assert!(result.events.contains(&JobEvent::StepErrored {
        step_id: "deploy".to_string(),
        error: "Step failed: connection refused".to_string(),
    }));
}

#[test]
fn test_condition_functions_are_case_insensitive() {
    let result = run_yaml(
        r#"
name: "Test: Function names"
steps:
  - id: "build"
    outcome: failed
  - id: "report"
    condition: "SucceededOrFailed()"
  - id: "notify"
    condition: "and(FAILED(), not(Canceled()))"
"#,
    );

    assert_outcome(&result, "report", StepOutcome::Succeeded);
    assert_outcome(&result, "notify", StepOutcome::Succeeded);
}
