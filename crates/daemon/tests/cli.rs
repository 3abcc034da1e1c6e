// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use assert_cmd::Command;

fn tada() -> Command {
    let mut cmd = Command::cargo_bin("tada").unwrap();
    cmd.env_remove("TADA_CONFIG").env_remove("TADA_PORT").env_remove("TADA_BIND");
    cmd
}

#[test]
fn help_lists_options() {
    let output = tada().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for flag in ["--port", "--bind", "--config", "--check"] {
        assert!(stdout.contains(flag), "missing {flag} in:\n{stdout}");
    }
}

#[test]
fn check_accepts_valid_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[[actions]]\nname = \"ping\"\ncommand = \"echo hi\"\n").unwrap();

    let output = tada().arg("--check").arg("--config").arg(&path).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.ends_with(": ok (1 actions, 0 containers)\n"), "{stdout}");
}

#[test]
fn check_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[[actions]]\nname = \"a\"\n[[actions]]\nname = \"a\"\n").unwrap();

    tada().arg("--check").arg("--config").arg(&path).assert().failure().code(1);
}

#[test]
fn unreadable_config_is_fatal_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    tada()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("--port")
        .arg("0")
        .assert()
        .failure()
        .code(1);
}
