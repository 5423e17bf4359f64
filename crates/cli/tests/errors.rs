// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;

use std::fs;

#[test]
fn help_lists_commands() {
    tick()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("Get started:"));
}

#[test]
fn empty_title_is_rejected_before_any_request() {
    tick()
        .args(["add", "", "--server", &unreachable_server()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<TITLE>"));
}

#[test]
fn whitespace_title_is_rejected() {
    tick()
        .args(["add", "   ", "--server", &unreachable_server()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: title must not be empty"));
}

#[test]
fn bad_filter_has_hint() {
    tick()
        .args(["list", "--filter", "someday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("valid filters are"));
}

#[test]
fn unreachable_server_is_a_network_error() {
    tick()
        .args(["list", "--server", &unreachable_server()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: network error"));
}

#[test]
fn missing_config_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing.toml");
    tick()
        .args(["stats", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn config_env_var_is_honored() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tick.toml");
    fs::write(&path, format!("server = \"{}\"\n", unreachable_server())).unwrap();
    tick()
        .arg("stats")
        .env("TICK_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: network error"));
}

#[test]
fn invalid_server_url_is_rejected() {
    tick()
        .args(["stats", "--server", "ftp://example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: invalid config"));
}

#[test]
fn invalid_config_contents_are_reported() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tick.toml");
    fs::write(&path, "request_timeout_ms = 0\n").unwrap();
    tick()
        .arg("stats")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: invalid config"));
}
