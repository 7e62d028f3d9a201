// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Shared test helpers for server integration tests.

use std::io::Read;
use std::net::{SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use utc_server::server::{UtcServer, UtcServerBuilder};
use utc_server::server_common::Observer;

/// Observer that keeps every message for later assertions.
#[derive(Debug, Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingObserver {
    #[allow(dead_code)]
    pub(crate) fn messages(&self, level: &str) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: &'static str, message: &str) {
        self.events.lock().unwrap().push((level, message.to_string()));
    }
}

impl Observer for RecordingObserver {
    fn debug(&self, message: &str) {
        self.push("debug", message);
    }
    fn info(&self, message: &str) {
        self.push("info", message);
    }
    fn warn(&self, message: &str) {
        self.push("warn", message);
    }
    fn error(&self, message: &str) {
        self.push("error", message);
    }
}

/// Observer that stalls every "sent" observation, keeping workers busy so
/// connections pile up in the queue.
#[derive(Debug)]
pub(crate) struct SlowObserver {
    pub(crate) delay: Duration,
}

impl Observer for SlowObserver {
    fn debug(&self, message: &str) {
        if message.starts_with("sent ") {
            thread::sleep(self.delay);
        }
    }
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

/// Build on `127.0.0.1:0`, start, and return the server with its bound address.
pub(crate) fn start_test_server(builder: UtcServerBuilder) -> (UtcServer, SocketAddr) {
    let server = builder.listen("127.0.0.1").port(0).build();
    let addr = server.start().expect("failed to start test server");
    (server, addr)
}

/// Connect, read until the server closes, and return everything received.
pub(crate) fn fetch(addr: SocketAddr) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).expect("connect failed");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("set_read_timeout failed");
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).expect("read failed");
    buf
}

/// Poll `cond` until it holds or `timeout` elapses.
pub(crate) fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

/// Wrap an observer for the builder.
pub(crate) fn observer<O: Observer + 'static>(o: &Arc<O>) -> Arc<dyn Observer> {
    o.clone()
}
