// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Both roles in one process, connected over a local TCP pair.
//!
//! The server runs on an auxiliary thread; the client runs on the caller's
//! thread. Once the client is done its socket is closed, which ends an echo
//! server, and the server thread is joined.

use std::net::TcpStream;
use std::thread;

use crate::affinity::{maybe_pin, pin_thread_to, CpuAllocator};
use crate::clock::{LatencySeries, MonotonicClock};
use crate::config::Config;
use crate::error::{BenchError, BenchResult};
use crate::framing::Framing;
use crate::net;
use crate::session::{ClientSession, ServerReport, ServerSession, ThroughputReport};
use crate::transport::{RetryPolicy, SocketGuard, Transport};
use crate::types::{ClientMode, MessageSize};

/// Settings shared by both ends of a loopback run.
#[derive(Debug, Clone, Copy)]
pub struct LoopbackOptions {
    pub framing: Framing,
    pub message_size: MessageSize,
    pub nodelay: bool,
    pub retry: RetryPolicy,
    pub pin_threads: bool,
}

impl LoopbackOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            framing: config.session.framing,
            message_size: config.session.message_size,
            nodelay: config.connection.nodelay,
            retry: config.retry,
            pin_threads: config.pin_threads,
        }
    }
}

type LoopbackClient = ClientSession<SocketGuard<TcpStream>, RetryPolicy, MonotonicClock>;

/// Bulk-transfer `amount` bytes through a loopback pair.
pub fn run_throughput(
    options: &LoopbackOptions,
    amount: u64,
) -> BenchResult<(ThroughputReport, ServerReport)> {
    let message_size = options.message_size;
    run_with_server(options, ClientMode::Throughput, move |client| {
        client.run_throughput(amount, message_size)
    })
}

/// Run `rounds` ping-pong rounds through a loopback pair.
pub fn run_latency(
    options: &LoopbackOptions,
    rounds: u64,
) -> BenchResult<(LatencySeries, ServerReport)> {
    let message_size = options.message_size;
    run_with_server(options, ClientMode::Latency, move |client| {
        client.run_latency(rounds, message_size)
    })
}

fn run_with_server<T, F>(
    options: &LoopbackOptions,
    mode: ClientMode,
    drive_client: F,
) -> BenchResult<(T, ServerReport)>
where
    F: FnOnce(&mut LoopbackClient) -> BenchResult<T>,
{
    let (client_stream, server_stream) = net::connected_pair(options.nodelay)?;
    let allocator = options.pin_threads.then(CpuAllocator::new);
    let server_cpu = allocator.as_ref().map(|a| a.allocate());

    let server_mode = mode.peer_mode();
    let framing = options.framing;
    let retry = options.retry;
    let server = thread::Builder::new()
        .name("tcpbench-server".to_string())
        .spawn(move || {
            if let Some(cpu) = server_cpu {
                if let Err(e) = pin_thread_to(cpu) {
                    tracing::warn!(role = "server", cpu = cpu, error = %e, "Could not pin thread, continuing unpinned");
                }
            }
            let mut session = ServerSession::with_parts(
                Transport::with_retry(SocketGuard::new(server_stream), retry),
                framing,
                server_mode,
                MonotonicClock,
            );
            session.run()
        })
        .map_err(|e| BenchError::Io {
            context: "spawning server thread",
            source: e,
        })?;

    maybe_pin(allocator.as_ref(), "client");
    let mut client = ClientSession::with_parts(
        Transport::with_retry(SocketGuard::new(client_stream), options.retry),
        options.framing,
        MonotonicClock,
    );
    let client_result = drive_client(&mut client);
    // Dropping the client closes its socket, ending the server loop.
    drop(client);

    let server_result = server.join().map_err(|panic| BenchError::ServerThread {
        reason: panic_message(panic.as_ref()),
    })?;

    combine_results(client_result, server_result)
}

/// Pair both outcomes. A client that only saw the server go away reports the
/// server's failure instead, which is the root cause.
fn combine_results<T>(
    client: BenchResult<T>,
    server: BenchResult<ServerReport>,
) -> BenchResult<(T, ServerReport)> {
    match (client, server) {
        (Ok(client), Ok(server)) => Ok((client, server)),
        (Err(BenchError::Transport(e)), Err(server_err)) if e.is_peer_closed() => {
            tracing::debug!(
                client_error = %e,
                "Client saw the server close, reporting the server error"
            );
            Err(server_err)
        }
        (Err(e), _) | (Ok(_), Err(e)) => Err(e),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProtocolError, TransportError};
    use crate::session::Termination;
    use crate::types::ServerMode;
    use std::io;

    fn server_report() -> ServerReport {
        ServerReport {
            mode: ServerMode::Echo,
            termination: Termination::PeerDisconnected,
            bytes_received: 0,
            frames: 0,
        }
    }

    fn server_failure() -> BenchResult<ServerReport> {
        Err(ProtocolError::LengthMismatch {
            announced: 5,
            expected: 4,
        }
        .into())
    }

    #[test]
    fn test_server_error_wins_over_client_disconnect() {
        let client: BenchResult<()> = Err(TransportError::Disconnected.into());
        let err = combine_results(client, server_failure()).unwrap_err();
        assert!(matches!(err, BenchError::Protocol(ProtocolError::LengthMismatch { .. })));
    }

    #[test]
    fn test_server_error_wins_over_broken_pipe() {
        let client: BenchResult<()> = Err(TransportError::Io {
            context: "write",
            source: io::ErrorKind::BrokenPipe.into(),
        }
        .into());
        let err = combine_results(client, server_failure()).unwrap_err();
        assert!(matches!(err, BenchError::Protocol(_)));
    }

    #[test]
    fn test_client_protocol_error_is_kept() {
        let client: BenchResult<()> = Err(ProtocolError::EchoMismatch { round: 3 }.into());
        let err = combine_results(client, server_failure()).unwrap_err();
        assert!(matches!(
            err,
            BenchError::Protocol(ProtocolError::EchoMismatch { round: 3 })
        ));
    }

    #[test]
    fn test_client_disconnect_with_healthy_server() {
        let client: BenchResult<()> = Err(TransportError::Disconnected.into());
        let err = combine_results(client, Ok(server_report())).unwrap_err();
        assert!(matches!(err, BenchError::Transport(e) if e.is_disconnected()));
    }

    #[test]
    fn test_both_ok_pairs_reports() {
        let (client, server) = combine_results(Ok(7u32), Ok(server_report())).unwrap();
        assert_eq!(client, 7);
        assert_eq!(server.frames, 0);
    }
}
