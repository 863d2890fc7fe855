// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! End-to-end tests over real loopback TCP connections.

use std::io::Write;
use std::thread;
use std::time::Duration;

use tcpbench_core::loopback::{self, LoopbackOptions};
use tcpbench_core::net;
use tcpbench_core::transport::ExponentialBackoff;
use tcpbench_core::{
    BenchError, ClientMode, ClientReport, ClientSession, ConfigLoader, Framing, MessageSize,
    MonotonicClock, Port, ProtocolError, RetryPolicy, ServerMode, ServerSession, SocketGuard,
    Termination, Transport,
};

fn options(framing: Framing, message_size: u64) -> LoopbackOptions {
    LoopbackOptions {
        framing,
        message_size: MessageSize::new(message_size).unwrap(),
        nodelay: true,
        retry: RetryPolicy::BusyPoll,
        pin_threads: false,
    }
}

#[test]
fn test_throughput_four_chunks_one_ack() {
    let (client, server) =
        loopback::run_throughput(&options(Framing::SizeHeader, 256), 1024).unwrap();
    assert_eq!(client.chunks, 4);
    assert_eq!(client.bytes_sent, 1024);
    assert!(client.elapsed > Duration::ZERO);
    assert_eq!(server.termination, Termination::TargetReached);
    assert_eq!(server.bytes_received, 1024);
    assert_eq!(server.frames, 4);
}

#[test]
fn test_full_transfer_across_sizes() {
    for framing in [Framing::Raw, Framing::SizeHeader] {
        let cases = [(1u64, 1u64), (4096, 1), (65_536, 1024), (1 << 20, 65_536), (3000, 1000)];
        for (amount, size) in cases {
            let (client, server) =
                loopback::run_throughput(&options(framing, size), amount).unwrap();
            assert_eq!(
                client.bytes_sent, server.bytes_received,
                "{} {} {}",
                framing, amount, size
            );
            assert!(server.bytes_received >= amount);
        }
    }
}

#[test]
fn test_zero_amount_acks_immediately() {
    let (client, server) = loopback::run_throughput(&options(Framing::Raw, 64), 0).unwrap();
    assert_eq!(client.chunks, 0);
    assert_eq!(server.frames, 0);
    assert_eq!(server.termination, Termination::TargetReached);
}

#[test]
fn test_pingpong_hundred_rounds() {
    for framing in [Framing::Raw, Framing::SizeHeader] {
        let (series, server) = loopback::run_latency(&options(framing, 8), 100).unwrap();
        assert_eq!(series.send_times().len(), 100);
        assert_eq!(series.remote_times().len(), 100);
        assert_eq!(series.receive_times().len(), 100);
        assert!(series.elapsed() > Duration::ZERO);
        assert!(series.round_trips().iter().all(|rtt| *rtt >= 0));
        // Both ends read the same monotonic clock.
        assert!(series.request_latencies().iter().all(|d| *d >= 0));
        assert!(series.response_latencies().iter().all(|d| *d >= 0));
        assert_eq!(server.termination, Termination::PeerDisconnected);
        assert_eq!(server.frames, 100);
    }
}

#[test]
fn test_pingpong_with_backoff_and_pinning() {
    let opts = LoopbackOptions {
        retry: RetryPolicy::ExponentialBackoff {
            initial: Duration::from_micros(1),
            max: Duration::from_micros(100),
        },
        pin_threads: true,
        ..options(Framing::SizeHeader, 512)
    };
    let (series, _) = loopback::run_latency(&opts, 20).unwrap();
    assert_eq!(series.len(), 20);
}

#[test]
fn test_listen_and_connect_sessions() {
    let listener = net::listen(0).unwrap();
    let port = Port::new(net::local_addr(&listener).unwrap().port()).unwrap();
    let server = thread::spawn(move || {
        let stream = net::accept_one(&listener, true)?;
        ServerSession::new(SocketGuard::new(stream), Framing::Raw, ServerMode::Sink).run()
    });

    let stream = net::connect("127.0.0.1", port, true).unwrap();
    let backoff = ExponentialBackoff::new(Duration::from_micros(5), Duration::from_micros(50));
    let mut client = ClientSession::with_parts(
        Transport::with_retry(SocketGuard::new(stream), backoff),
        Framing::Raw,
        MonotonicClock,
    );
    let config =
        ConfigLoader::load_string("session:\n  amount: 8192\n  message_size: 512\n").unwrap();
    let report = client.run(ClientMode::Throughput, &config.session).unwrap();
    assert!(matches!(report, ClientReport::Throughput(r) if r.chunks == 16));

    let server_report = server.join().unwrap().unwrap();
    assert_eq!(server_report.bytes_received, 8192);
}

#[test]
fn test_server_rejects_oversized_announcement() {
    let (mut client, server) = net::connected_pair(true).unwrap();
    let handle = thread::spawn(move || {
        ServerSession::new(server, Framing::SizeHeader, ServerMode::Echo).run()
    });
    client.write_all(&u64::MAX.to_be_bytes()).unwrap();
    let err = handle.join().unwrap().unwrap_err();
    assert!(matches!(
        err,
        BenchError::Protocol(ProtocolError::InvalidMessageSize { .. })
    ));
}

#[test]
fn test_loopback_from_config_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bench.yaml");
    std::fs::write(
        &path,
        r#"
session:
  framing: raw
  amount: 4096
  message_size: 128
  rounds: 25
retry:
  strategy: exponential_backoff
  initial_backoff_us: 1
  max_backoff_us: 10
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_file(&path).unwrap();
    let opts = LoopbackOptions::from_config(&config);
    assert_eq!(opts.framing, Framing::Raw);

    let (report, _) = loopback::run_throughput(&opts, config.session.amount).unwrap();
    assert_eq!(report.chunks, 32);
    let (series, _) = loopback::run_latency(&opts, config.session.rounds).unwrap();
    assert_eq!(series.len(), 25);
}
