// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::io::Write;

use yare::parameterized;

use super::*;

#[test]
fn empty_file_yields_defaults() {
    let config = SyncConfig::from_toml_str("").unwrap();
    assert_eq!(config, SyncConfig::default());
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
    assert_eq!(config.reconnect_policy(), ReconnectPolicy::default());
}

#[test]
fn full_file_parses() {
    let config = SyncConfig::from_toml_str(
        r#"
server = "https://todo.example.com"
broadcast_path = "/events"
request_timeout_ms = 5000

[reconnect]
delay_ms = 250
backoff = "exponential"
max_delay_ms = 4000
"#,
    )
    .unwrap();

    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(
        config.reconnect_policy(),
        ReconnectPolicy {
            delay: Duration::from_millis(250),
            backoff: Backoff::Exponential {
                max_delay: Duration::from_secs(4)
            },
        }
    );
    assert_eq!(
        config.broadcast_url().unwrap().as_str(),
        "wss://todo.example.com/events"
    );
}

#[parameterized(
    http = { "http://127.0.0.1:8080", "ws://127.0.0.1:8080/ws" },
    https = { "https://todo.example.com", "wss://todo.example.com/ws" },
    with_path = { "http://host/app/", "ws://host/ws" },
    with_query = { "http://host/?x=1", "ws://host/ws" },
)]
fn broadcast_url_mirrors_scheme(server: &str, expected: &str) {
    let config = SyncConfig::for_server(server);
    assert_eq!(config.broadcast_url().unwrap().as_str(), expected);
}

#[parameterized(
    root = { "http://host", "api/todos", "http://host/api/todos" },
    leading_slash = { "http://host", "/api/stats", "http://host/api/stats" },
    prefix = { "http://host/app", "api/todos", "http://host/app/api/todos" },
)]
fn api_url_resolves_under_server(server: &str, path: &str, expected: &str) {
    let config = SyncConfig::for_server(server);
    assert_eq!(config.api_url(path).unwrap().as_str(), expected);
}

#[parameterized(
    not_a_url = { r#"server = "nope""# },
    websocket_scheme = { r#"server = "ws://host""# },
    file_scheme = { r#"server = "file:///tmp/x""# },
    relative_broadcast_path = { r#"broadcast_path = "ws""# },
    zero_timeout = { "request_timeout_ms = 0" },
    zero_delay = { "[reconnect]\ndelay_ms = 0" },
    cap_below_delay = { "[reconnect]\nbackoff = \"exponential\"\ndelay_ms = 500\nmax_delay_ms = 100" },
)]
fn invalid_values_are_rejected(content: &str) {
    let err = SyncConfig::from_toml_str(content).unwrap_err();
    assert!(matches!(err, SyncError::Config(_)), "{err:?}");
}

#[parameterized(
    unknown_backoff = { "[reconnect]\nbackoff = \"linear\"" },
    wrong_type = { "request_timeout_ms = \"soon\"" },
)]
fn malformed_toml_is_a_parse_error(content: &str) {
    let err = SyncConfig::from_toml_str(content).unwrap_err();
    assert!(matches!(err, SyncError::Toml(_)), "{err:?}");
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "server = \"http://10.0.0.5:9000\"").unwrap();

    let config = SyncConfig::load(file.path()).unwrap();
    assert_eq!(config.server, "http://10.0.0.5:9000");
    assert_eq!(config.broadcast_path, "/ws");
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SyncConfig::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, SyncError::Io(_)));
}
