// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use prost::Message;
use tk_core::wire;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// The binary, isolated from any user config.
pub fn tick() -> Command {
    let mut cmd = cargo_bin_cmd!("tick");
    cmd.env_remove("TICK_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// A server URL nothing listens on.
pub fn unreachable_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn todo(id: i64, title: &str, completed: bool) -> wire::Todo {
    wire::Todo {
        id,
        title: title.to_string(),
        completed,
        created_at: 1_700_000_000 + id,
    }
}

pub fn stats(total: u32, completed: u32) -> wire::TodoStats {
    wire::TodoStats {
        total,
        completed,
        active: total - completed,
    }
}

pub fn list_body(todos: Vec<wire::Todo>) -> Vec<u8> {
    wire::TodoList { todos }.encode_to_vec()
}

pub fn response_body(todo: Option<wire::Todo>, stats: Option<wire::TodoStats>) -> Vec<u8> {
    wire::ApiResponse {
        success: true,
        message: String::new(),
        todo,
        stats,
    }
    .encode_to_vec()
}

/// A canned HTTP authority on a background thread.
///
/// Routes are keyed by `"METHOD /path"`; anything else gets a 404.
pub struct FakeServer {
    pub url: String,
    requests: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl FakeServer {
    pub fn start(routes: Vec<(&str, u16, Vec<u8>)>) -> Self {
        let routes: HashMap<String, (u16, Vec<u8>)> = routes
            .into_iter()
            .map(|(key, status, body)| (key.to_string(), (status, body)))
            .collect();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let (key, body) = read_request(&mut stream);
                let (status, reply) = routes.get(&key).cloned().unwrap_or((404, Vec::new()));
                log.lock().unwrap().push((key, body));

                let head = format!(
                    "HTTP/1.1 {status} X\r\ncontent-type: application/x-protobuf\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                    reply.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&reply);
            }
        });

        FakeServer { url, requests }
    }

    /// Requests received so far as `"METHOD /path"`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Body of the first request matching `key`.
    pub fn body_of(&self, key: &str) -> Option<Vec<u8>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, body)| body.clone())
    }
}

fn read_request(stream: &mut TcpStream) -> (String, Vec<u8>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            return (String::new(), Vec::new());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap().split_whitespace();
    let method = request_line.next().unwrap().to_string();
    let path = request_line.next().unwrap().to_string();

    let content_length: usize = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .map(|(_, value)| value.trim().parse().unwrap())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let end = buf.len().min(head_end + content_length);
    (format!("{method} {path}"), buf[head_end..end].to_vec())
}
