// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests over real loopback sockets.

mod common;

use std::io::Read;
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{RecordingObserver, SlowObserver, fetch, observer, start_test_server, wait_until};
use utc_server::protocol;
use utc_server::server::UtcServer;
use utc_server::server_common::{ServerState, ServerStats};
use utc_server::unix_time;

fn assert_fresh_timestamp(bytes: &[u8]) {
    assert_eq!(bytes.len(), 4, "expected exactly one time packet");
    let packet = protocol::decode(bytes).expect("timestamp should decode");
    let now = unix_time::now_secs();
    assert!(
        now.abs_diff(packet.timestamp) <= 5,
        "timestamp {} too far from now {now}",
        packet.timestamp
    );
}

#[test]
fn test_concurrent_clients_all_served() {
    let recorder = Arc::new(RecordingObserver::default());
    let (server, addr) = start_test_server(
        UtcServer::builder()
            .worker_threads(2)
            .observer(observer(&recorder)),
    );

    let clients: Vec<_> = (0..10).map(|_| thread::spawn(move || fetch(addr))).collect();
    for client in clients {
        assert_fresh_timestamp(&client.join().unwrap());
    }

    assert!(wait_until(Duration::from_secs(2), || server
        .active_connections()
        == 0));
    assert_eq!(server.total_connections(), 10);
    assert_eq!(server.packets_sent(), 10);
    assert!(recorder.messages("error").is_empty());
    server.stop();
}

#[test]
fn test_denied_client_receives_nothing() {
    let stats = Arc::new(ServerStats::new());
    let recorder = Arc::new(RecordingObserver::default());
    let (server, addr) = start_test_server(
        UtcServer::builder()
            .deny("127.0.0.1")
            .stats(stats.clone())
            .observer(observer(&recorder)),
    );

    assert!(fetch(addr).is_empty());
    assert!(wait_until(Duration::from_secs(2), || stats
        .snapshot()
        .connections_denied
        == 1));
    assert_eq!(stats.snapshot().packets_sent, 0);
    assert_eq!(recorder.messages("warn").len(), 1);
    server.stop();
}

#[test]
fn test_allow_list_restricts_unlisted_client() {
    let (server, addr) = start_test_server(
        UtcServer::builder()
            .restrict_queries(true)
            .allow("192.0.2.1")
            .observer(observer(&Arc::new(RecordingObserver::default()))),
    );
    assert!(fetch(addr).is_empty());
    server.stop();

    let (server, addr) = start_test_server(
        UtcServer::builder()
            .restrict_queries(true)
            .allow("127.0.0.1")
            .observer(observer(&Arc::new(RecordingObserver::default()))),
    );
    assert_fresh_timestamp(&fetch(addr));
    server.stop();
}

#[test]
fn test_stop_drains_in_flight_connections() {
    let slow = Arc::new(SlowObserver {
        delay: Duration::from_millis(100),
    });
    let (server, addr) = start_test_server(
        UtcServer::builder()
            .worker_threads(2)
            .observer(observer(&slow)),
    );

    let clients: Vec<_> = (0..5).map(|_| thread::spawn(move || fetch(addr))).collect();
    assert!(wait_until(Duration::from_secs(5), || server
        .total_connections()
        == 5));

    server.stop();
    assert_eq!(server.state(), ServerState::Stopped);
    // stop() returned only after every queued connection was served.
    assert_eq!(server.packets_sent(), 5);
    assert_eq!(server.active_connections(), 0);

    for client in clients {
        assert_fresh_timestamp(&client.join().unwrap());
    }
}

#[test]
fn test_stop_right_after_connect_serves_every_client() {
    let (server, addr) = start_test_server(
        UtcServer::builder()
            .worker_threads(1)
            .observer(observer(&Arc::new(RecordingObserver::default()))),
    );

    // Connected but possibly not yet accepted when stop() begins.
    let mut clients: Vec<TcpStream> =
        (0..5).map(|_| TcpStream::connect(addr).unwrap()).collect();
    server.stop();

    assert_eq!(server.total_connections(), 5);
    assert_eq!(server.packets_sent(), 5);
    assert_eq!(server.active_connections(), 0);
    for client in &mut clients {
        client
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        assert_fresh_timestamp(&buf);
    }
}

#[test]
fn test_connections_refused_after_stop() {
    let (server, addr) = start_test_server(
        UtcServer::builder().observer(observer(&Arc::new(RecordingObserver::default()))),
    );
    assert_fresh_timestamp(&fetch(addr));
    server.stop();
    assert!(TcpStream::connect_timeout(&addr, Duration::from_secs(1)).is_err());
    assert!(!server.is_running());
}

#[test]
fn test_small_queue_applies_backpressure() {
    let slow = Arc::new(SlowObserver {
        delay: Duration::from_millis(20),
    });
    let (server, addr) = start_test_server(
        UtcServer::builder()
            .worker_threads(1)
            .max_connections(1)
            .observer(observer(&slow)),
    );

    let clients: Vec<_> = (0..6).map(|_| thread::spawn(move || fetch(addr))).collect();
    for client in clients {
        assert_fresh_timestamp(&client.join().unwrap());
    }
    server.stop();
    assert_eq!(server.packets_sent(), 6);
}

#[test]
fn test_dual_stack_sees_plain_ipv4_clients() {
    let recorder = Arc::new(RecordingObserver::default());
    let server = UtcServer::builder()
        .listen("::")
        .port(0)
        .dual_stack(true)
        .deny("127.0.0.1")
        .observer(observer(&recorder))
        .build();
    // Hosts without IPv6 cannot run this test.
    let Ok(bound) = server.start() else {
        return;
    };

    let v4 = SocketAddr::from(([127, 0, 0, 1], bound.port()));
    assert!(fetch(v4).is_empty());
    assert!(wait_until(Duration::from_secs(2), || server
        .stats_snapshot()
        .connections_denied
        == 1));
    server.stop();
}
