// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Server role: echo frames back with a timestamp, or sink them and acknowledge.

use serde::Serialize;

use crate::clock::{Clock, MonotonicClock, TIMESTAMP_SIZE};
use crate::error::{BenchError, BenchResult, TransportError};
use crate::framing::{Framing, FramingStrategy};
use crate::session::{Preamble, ACK};
use crate::transport::{BusyPoll, ByteStream, RetryStrategy, Transport};
use crate::types::ServerMode;

/// Why a server session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Sink mode received the announced amount and acknowledged it.
    TargetReached,
    /// The client closed the connection. The normal end of an echo session.
    PeerDisconnected,
}

/// Server state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    AwaitingHeader,
    Streaming(Preamble),
    Done(Termination),
}

/// Summary of a finished server session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerReport {
    pub mode: ServerMode,
    pub termination: Termination,
    /// Payload bytes received, headers excluded.
    pub bytes_received: u64,
    pub frames: u64,
}

/// One server-side session over an accepted connection.
pub struct ServerSession<S, R = BusyPoll, C = MonotonicClock> {
    transport: Transport<S, R>,
    framing: Framing,
    mode: ServerMode,
    clock: C,
    state: ServerState,
    bytes_received: u64,
    frames: u64,
    recv_buf: Vec<u8>,
}

impl<S: ByteStream> ServerSession<S> {
    pub fn new(stream: S, framing: Framing, mode: ServerMode) -> Self {
        Self::with_parts(Transport::new(stream), framing, mode, MonotonicClock)
    }
}

impl<S: ByteStream, R: RetryStrategy, C: Clock> ServerSession<S, R, C> {
    pub fn with_parts(transport: Transport<S, R>, framing: Framing, mode: ServerMode, clock: C) -> Self {
        Self {
            transport,
            framing,
            mode,
            clock,
            state: ServerState::AwaitingHeader,
            bytes_received: 0,
            frames: 0,
            recv_buf: Vec::new(),
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Drive the state machine until the session is done.
    ///
    /// Disconnection by the peer ends the session normally; every other
    /// failure is returned.
    pub fn run(&mut self) -> BenchResult<ServerReport> {
        loop {
            if let ServerState::Done(termination) = self.state {
                tracing::debug!(
                    mode = %self.mode,
                    bytes = self.bytes_received,
                    frames = self.frames,
                    ?termination,
                    "Server session finished"
                );
                return Ok(ServerReport {
                    mode: self.mode,
                    termination,
                    bytes_received: self.bytes_received,
                    frames: self.frames,
                });
            }
            match self.step() {
                Ok(()) => {}
                Err(BenchError::Transport(TransportError::Disconnected)) => {
                    self.state = ServerState::Done(Termination::PeerDisconnected);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Perform one transition.
    pub fn step(&mut self) -> BenchResult<()> {
        match self.state {
            ServerState::AwaitingHeader => {
                let preamble =
                    Preamble::receive(&mut self.transport, self.mode == ServerMode::Sink)?;
                tracing::debug!(
                    amount = ?preamble.amount,
                    message_size = preamble.message_size.bytes(),
                    "Received session preamble"
                );
                self.state = match preamble.amount {
                    Some(0) => self.acknowledge()?,
                    _ => ServerState::Streaming(preamble),
                };
            }
            ServerState::Streaming(preamble) => {
                let payload_len = preamble.message_size.bytes();
                let frame_size = self.framing.frame_size_for(payload_len);
                self.transport.receive_into(&mut self.recv_buf, frame_size)?;
                self.framing.decode_frame(&self.recv_buf, payload_len)?;
                self.frames += 1;
                self.bytes_received += payload_len as u64;

                match (self.mode, preamble.amount) {
                    (ServerMode::Echo, _) => {
                        let stamp = self.clock.now();
                        self.recv_buf.extend_from_slice(&stamp.to_be_bytes());
                        debug_assert_eq!(self.recv_buf.len(), frame_size + TIMESTAMP_SIZE);
                        self.transport.send_all(&self.recv_buf)?;
                    }
                    (ServerMode::Sink, Some(amount)) if self.bytes_received >= amount => {
                        self.state = self.acknowledge()?;
                    }
                    (ServerMode::Sink, _) => {}
                }
            }
            ServerState::Done(_) => {}
        }
        Ok(())
    }

    fn acknowledge(&mut self) -> BenchResult<ServerState> {
        self.transport.send_all(&[ACK])?;
        Ok(ServerState::Done(Termination::TargetReached))
    }

    /// Give the stream back once the session is over.
    pub fn into_inner(self) -> S {
        self.transport.into_inner()
    }
}
