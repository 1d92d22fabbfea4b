//! Test: Macro expansion in step inputs and environment
//!
//! - ${{name}} resolves against the variables current when the step starts
//! - Substituted text is never rescanned
//! - Unknown names stay verbatim

use crate::helpers::*;
use pipeline_conditions::core::context::PATH_SEPARATOR;

#[test]
fn test_inputs_and_env_expanded() {
    let result = run_yaml(
        r#"
name: "Test: Expansion"
variables:
  configuration: "Release"
  project: "app"
environment:
  BUILD_CONFIG: "${{configuration}}"
steps:
  - id: "build"
    inputs:
      arguments: "build ${{project}} -c ${{configuration}}"
      extra: ~
    env:
      PROJECT: "${{project}}"
"#,
    );

    assert_eq!(received_input(&result, "build", "arguments"), "build app -c Release");
    assert_eq!(received_input(&result, "build", "extra"), "");

    let build = &result.received[0];
    assert_eq!(build.env["PROJECT"], "app");
    assert_eq!(build.env["BUILD_CONFIG"], "Release");
}

#[test]
fn test_outputs_expand_in_later_steps() {
    let result = run_yaml(
        r#"
name: "Test: Outputs"
steps:
  - id: "version"
    outputs:
      version: "1.4.2"
  - id: "package"
    inputs:
      file: "app-${{version}}.tar.gz"
"#,
    );

    assert_eq!(received_input(&result, "package", "file"), "app-1.4.2.tar.gz");
}

#[test]
fn test_no_recursive_expansion() {
    let result = run_yaml(
        r#"
name: "Test: No recursion"
variables:
  outer: "${{inner}}"
  inner: "secret-ish"
steps:
  - id: "echo"
    inputs:
      message: "${{outer}}"
"#,
    );

    assert_eq!(received_input(&result, "echo", "message"), "${{inner}}");
}

#[test]
fn test_unresolved_macros_left_verbatim() {
    let result = run_yaml(
        r#"
name: "Test: Unresolved"
variables:
  known: "yes"
steps:
  - id: "echo"
    inputs:
      unknown: "${{unknown}} ${{known}}"
      empty: "${{}}"
      open: "${{known"
"#,
    );

    assert_eq!(received_input(&result, "echo", "unknown"), "${{unknown}} yes");
    assert_eq!(received_input(&result, "echo", "empty"), "${{}}");
    assert_eq!(received_input(&result, "echo", "open"), "${{known");
}

#[test]
fn test_path_prepends_reach_later_steps() {
    let result = run_yaml(
        r#"
name: "Test: PATH"
environment:
  PATH: "/usr/bin"
steps:
  - id: "install-tool"
    prepend_path: ["/opt/tool/bin"]
  - id: "use-tool"
"#,
    );

    let first = &result.received[0];
    assert_eq!(first.env.get("PATH").map(String::as_str), Some("/usr/bin"));

    let second = &result.received[1];
    assert_eq!(
        second.env["PATH"],
        ["/opt/tool/bin", "/usr/bin"].join(PATH_SEPARATOR)
    );
}
