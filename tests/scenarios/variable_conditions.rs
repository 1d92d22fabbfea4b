//! Test: Conditions over job variables
//!
//! - Variables from the job file and from earlier step outputs
//! - Name lookup following the case policy
//! - The variables object cannot be enumerated

use crate::helpers::*;
use pipeline_conditions::core::{CaseSensitivity, JobStatus, StepOutcome};

#[test]
fn test_condition_on_job_variable() {
    let result = run_yaml(
        r#"
name: "Test: Branch filter"
variables:
  Build.SourceBranch: "refs/heads/main"
  Build.Reason: "PullRequest"
steps:
  - id: "publish"
    condition: "and(succeeded(), eq(variables['Build.SourceBranch'], 'refs/heads/main'))"
  - id: "pr-comment"
    condition: "eq(variables['Build.Reason'], 'pullrequest')"
  - id: "nightly"
    condition: "eq(variables['Build.Reason'], 'Schedule')"
"#,
    );

    assert_outcome(&result, "publish", StepOutcome::Succeeded);
    assert_outcome(&result, "pr-comment", StepOutcome::Succeeded);
    assert_outcome(&result, "nightly", StepOutcome::Skipped);
    assert_eq!(result.report.status(), JobStatus::Succeeded);
}

#[test]
fn test_step_outputs_visible_to_later_conditions() {
    let result = run_yaml(
        r#"
name: "Test: Outputs"
steps:
  - id: "test"
    outputs:
      tests.failed: "3"
  - id: "triage"
    condition: "gt(variables['tests.failed'], 0)"
  - id: "celebrate"
    condition: "eq(variables['tests.failed'], 0)"
"#,
    );

    assert_outcome(&result, "triage", StepOutcome::Succeeded);
    assert_outcome(&result, "celebrate", StepOutcome::Skipped);
    assert_eq!(
        result.report.context.variables.iter().find(|(k, _)| *k == "tests.failed"),
        Some(("tests.failed", Some("3")))
    );
}

#[test]
fn test_missing_and_null_variables() {
    let result = run_yaml(
        r#"
name: "Test: Missing"
variables:
  empty: ~
steps:
  - id: "missing"
    condition: "eq(variables['undefined'], '')"
  - id: "null-value"
    condition: "not(variables.empty)"
  - id: "in-list"
    condition: "in(variables['undefined'], 'a', 'b')"
"#,
    );

    assert_outcome(&result, "missing", StepOutcome::Skipped);
    assert_outcome(&result, "null-value", StepOutcome::Succeeded);
    assert_outcome(&result, "in-list", StepOutcome::Skipped);
}

#[test]
fn test_variable_names_follow_case_policy() {
    let yaml = r#"
name: "Test: Case"
variables:
  Deploy.Target: "production"
steps:
  - id: "deploy"
    condition: "eq(variables['deploy.target'], 'production')"
"#;

    let insensitive = load_job(yaml, CaseSensitivity::Insensitive);
    let result = run_job(&insensitive, RecordingHandler::for_job(&insensitive));
    assert_outcome(&result, "deploy", StepOutcome::Succeeded);

    let sensitive = load_job(yaml, CaseSensitivity::Sensitive);
    let result = run_job(&sensitive, RecordingHandler::for_job(&sensitive));
    assert_outcome(&result, "deploy", StepOutcome::Skipped);
}

#[test]
fn test_enumerating_variables_fails_step() {
    let result = run_yaml(
        r#"
name: "Test: Enumeration"
variables:
  token: "abc"
steps:
  - id: "inspect"
    condition: "containsValue(variables, 'abc')"
  - id: "after"
"#,
    );

    assert_outcome(&result, "inspect", StepOutcome::Failed);
    assert_outcome(&result, "after", StepOutcome::Skipped);
    assert_eq!(result.report.status(), JobStatus::Failed);
    assert!(result.received.is_empty());
}
