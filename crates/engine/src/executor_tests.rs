// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use tada_core::test_support::{argv_action, script_action, shell_action};

fn payload(pairs: &[(&str, &str)]) -> Payload {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[tokio::test]
async fn shell_command_captures_stdout() {
    let actions = vec![shell_action("ping", "echo hi")];
    let result = run_action(&actions, "ping", &Payload::new()).await;

    assert_eq!(
        result,
        ActionResult {
            ok: true,
            error: None,
            exit_code: Some(0),
            stdout: Some("hi\n".into()),
            stderr: Some(String::new()),
        }
    );
}

#[tokio::test]
async fn nonzero_exit_is_not_ok_but_has_no_error() {
    let actions = vec![shell_action("fail", "echo oops >&2; exit 3")];
    let result = run_action(&actions, "fail", &Payload::new()).await;

    assert!(!result.ok);
    assert_eq!(result.exit_code, Some(3));
    assert_eq!(result.stderr.as_deref(), Some("oops\n"));
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn unknown_action_is_rejected() {
    let actions = vec![shell_action("ping", "echo hi")];
    let result = run_action(&actions, "nope", &Payload::new()).await;

    assert_eq!(result, ActionResult::rejected("Unknown action: nope"));
}

#[tokio::test]
async fn argv_is_not_shell_interpreted() {
    let actions = vec![argv_action("lit", &["echo", "$HOME", "a;b"])];
    let result = run_action(&actions, "lit", &Payload::new()).await;

    assert!(result.ok);
    assert_eq!(result.stdout.as_deref(), Some("$HOME a;b\n"));
}

#[tokio::test]
async fn script_runs_under_sh() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("deploy.sh");
    std::fs::write(&script, "echo \"deploying $1\"\necho done\n").unwrap();

    let actions = vec![script_action("deploy", &script)];
    let result = run_action(&actions, "deploy", &Payload::new()).await;

    assert!(result.ok, "{result:?}");
    assert_eq!(result.stdout.as_deref(), Some("deploying \ndone\n"));
}

#[tokio::test]
async fn payload_is_exposed_as_json_env() {
    let actions = vec![shell_action("show", "printf '%s' \"$PAYLOAD\"")];
    let result = run_action(&actions, "show", &payload(&[("ref", "main"), ("sha", "abc")])).await;

    assert_eq!(result.stdout.as_deref(), Some(r#"{"ref":"main","sha":"abc"}"#));
}

#[tokio::test]
async fn empty_payload_is_empty_object() {
    let actions = vec![shell_action("show", "printf '%s' \"$PAYLOAD\"")];
    let result = run_action(&actions, "show", &Payload::new()).await;

    assert_eq!(result.stdout.as_deref(), Some("{}"));
}

#[tokio::test]
async fn cwd_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let mut action = shell_action("where", "pwd -P");
    action.cwd = Some(dir.path().to_path_buf());

    let result = run_action(&[action], "where", &Payload::new()).await;
    let expected = dir.path().canonicalize().unwrap();
    assert_eq!(result.stdout.as_deref(), Some(format!("{}\n", expected.display()).as_str()));
}

#[tokio::test]
async fn timeout_kills_and_reports() {
    let mut action = shell_action("slow", "echo started; sleep 30");
    action.timeout = 1.0;

    let started = std::time::Instant::now();
    let result = run_action(&[action], "slow", &Payload::new()).await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!result.ok);
    assert_eq!(result.exit_code, Some(137));
    assert_eq!(result.stdout.as_deref(), Some("started\n"));
    assert_eq!(result.error.as_deref(), Some("Action \"slow\" timed out after 1s"));
}

#[tokio::test]
async fn missing_binary_is_spawn_failure() {
    let actions = vec![argv_action("ghost", &["/nonexistent/tada-test-bin"])];
    let result = run_action(&actions, "ghost", &Payload::new()).await;

    assert!(!result.ok);
    assert_eq!(result.exit_code, None);
    let error = result.error.unwrap();
    assert!(error.starts_with("Failed to spawn action \"ghost\": "), "{error}");
}

#[tokio::test]
async fn neither_script_nor_command_is_rejected_without_spawning() {
    let mut action = shell_action("bare", "");
    action.command = None;

    let result = run_action(&[action], "bare", &Payload::new()).await;
    assert_eq!(
        result,
        ActionResult::rejected("Action \"bare\" must have either 'script' or 'command'")
    );
}

#[tokio::test]
async fn both_script_and_command_is_rejected() {
    let mut action = shell_action("both", "echo hi");
    action.script = Some("/tmp/x.sh".into());

    let result = run_action(&[action], "both", &Payload::new()).await;
    assert_eq!(
        result,
        ActionResult::rejected("Action \"both\" cannot have both 'script' and 'command'")
    );
}

#[yare::parameterized(
    shell       = { shell_action("a", "echo hi"),       Ok(Invocation::Shell("echo hi".into())) },
    argv        = { argv_action("a", &["ls", "-l"]),    Ok(Invocation::Direct(vec!["ls".into(), "-l".into()])) },
    script      = { script_action("a", "/s.sh"),        Ok(Invocation::Script("/s.sh".into())) },
    empty_shell = { shell_action("a", ""),              Err("Action \"a\" must have either 'script' or 'command'".to_string()) },
    empty_argv  = { argv_action("a", &[]),              Err("Action \"a\" has an empty command".to_string()) },
    empty_script = { script_action("a", ""),            Err("Action \"a\" must have either 'script' or 'command'".to_string()) },
)]
fn resolve(action: Action, expected: Result<Invocation, String>) {
    assert_eq!(Invocation::resolve(&action), expected);
}

#[tokio::test]
async fn fractional_timeout_is_honored() {
    let mut action = shell_action("slow", "sleep 30");
    action.timeout = 0.5;

    let started = std::time::Instant::now();
    let result = run_action(&[action], "slow", &Payload::new()).await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(result.error.as_deref(), Some("Action \"slow\" timed out after 0.5s"));
}

#[tokio::test]
async fn unusable_timeout_is_rejected() {
    for timeout in [-1.0, f64::NAN, f64::INFINITY] {
        let mut action = shell_action("odd", "echo never");
        action.timeout = timeout;

        let result = run_action(&[action], "odd", &Payload::new()).await;

        assert!(!result.ok, "timeout {timeout}");
        assert_eq!(result.exit_code, None);
        let error = result.error.unwrap();
        assert!(error.starts_with("Invalid timeout for action \"odd\""), "{error}");
    }
}

#[tokio::test]
async fn nameless_action_is_never_matched() {
    let result = run_action(&[shell_action("", "echo hi")], "", &Payload::new()).await;
    assert_eq!(result.error.as_deref(), Some("Unknown action: "));
}
