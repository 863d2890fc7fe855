// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Client role: bulk transfer timing and ping-pong latency rounds.

use std::time::Duration;

use serde::Serialize;

use crate::clock::{Clock, LatencySeries, MonotonicClock, Timer, Timestamp, TIMESTAMP_SIZE};
use crate::error::{BenchResult, ProtocolError};
use crate::framing::{Framing, FramingStrategy};
use crate::session::{fill_byte, Preamble, ACK};
use crate::transport::{BusyPoll, ByteStream, RetryStrategy, Transport};
use crate::config::SessionConfig;
use crate::types::{ClientMode, MessageSize};

/// Result of a throughput session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThroughputReport {
    pub amount: u64,
    pub message_size: usize,
    pub chunks: u64,
    /// Payload bytes sent, headers excluded.
    pub bytes_sent: u64,
    /// From the first chunk to the acknowledgement.
    pub elapsed: Duration,
}

/// Result of either client mode.
#[derive(Debug, Clone)]
pub enum ClientReport {
    Throughput(ThroughputReport),
    Latency(LatencySeries),
}

/// One client-side session over a connected stream.
pub struct ClientSession<S, R = BusyPoll, C = MonotonicClock> {
    transport: Transport<S, R>,
    framing: Framing,
    clock: C,
}

impl<S: ByteStream> ClientSession<S> {
    pub fn new(stream: S, framing: Framing) -> Self {
        Self::with_parts(Transport::new(stream), framing, MonotonicClock)
    }
}

impl<S: ByteStream, R: RetryStrategy, C: Clock> ClientSession<S, R, C> {
    pub fn with_parts(transport: Transport<S, R>, framing: Framing, clock: C) -> Self {
        Self {
            transport,
            framing,
            clock,
        }
    }

    /// Run the session described by `session` in the given mode.
    pub fn run(&mut self, mode: ClientMode, session: &SessionConfig) -> BenchResult<ClientReport> {
        match mode {
            ClientMode::Throughput => self
                .run_throughput(session.amount, session.message_size)
                .map(ClientReport::Throughput),
            ClientMode::Latency => self
                .run_latency(session.rounds, session.message_size)
                .map(ClientReport::Latency),
        }
    }

    /// Send `amount` payload bytes in chunks of `message_size`, then wait
    /// for the server's acknowledgement.
    ///
    /// Chunks are never shortened: an amount that is not a multiple of the
    /// message size is rounded up to whole chunks.
    pub fn run_throughput(
        &mut self,
        amount: u64,
        message_size: MessageSize,
    ) -> BenchResult<ThroughputReport> {
        Preamble::throughput(amount, message_size).send(&mut self.transport)?;

        let mut frame = Vec::new();
        self.framing
            .encode_frame(&vec![0xAB; message_size.bytes()], &mut frame);
        let chunk = message_size.bytes() as u64;

        let timer = Timer::start();
        let mut sent = 0u64;
        let mut chunks = 0u64;
        while sent < amount {
            self.transport.send_all(&frame)?;
            sent += chunk;
            chunks += 1;
        }

        let mut ack = [0u8; 1];
        self.transport.receive_exact(&mut ack)?;
        let elapsed = timer.elapsed();
        if ack[0] != ACK {
            return Err(ProtocolError::UnexpectedAck {
                expected: ACK,
                actual: ack[0],
            }
            .into());
        }

        tracing::debug!(
            amount = amount,
            chunks = chunks,
            elapsed_us = elapsed.as_micros() as u64,
            "Throughput session finished"
        );
        Ok(ThroughputReport {
            amount,
            message_size: message_size.bytes(),
            chunks,
            bytes_sent: sent,
            elapsed,
        })
    }

    /// Run `rounds` strictly alternating ping-pong rounds.
    ///
    /// Round k+1 is only sent after the reply to round k arrived. The
    /// returned series also carries the wall time of the whole loop.
    pub fn run_latency(&mut self, rounds: u64, message_size: MessageSize) -> BenchResult<LatencySeries> {
        Preamble::latency(message_size).send(&mut self.transport)?;

        let payload_len = message_size.bytes();
        let frame_size = self.framing.frame_size_for(payload_len);
        let mut series = LatencySeries::with_capacity(usize::try_from(rounds).unwrap_or(0));
        let mut payload = vec![0u8; payload_len];
        let mut send_buf = Vec::with_capacity(frame_size);
        let mut recv_buf = Vec::with_capacity(frame_size + TIMESTAMP_SIZE);

        let timer = Timer::start();
        for round in 0..rounds {
            payload.fill(fill_byte(round));
            send_buf.clear();
            self.framing.encode_frame(&payload, &mut send_buf);

            series.record_send(self.clock.now());
            self.transport.send_all(&send_buf)?;
            self.transport
                .receive_into(&mut recv_buf, frame_size + TIMESTAMP_SIZE)?;
            series.record_receive(self.clock.now());

            let (echoed, stamp) = recv_buf.split_at(frame_size);
            if echoed != send_buf.as_slice() {
                return Err(ProtocolError::EchoMismatch { round }.into());
            }
            self.framing.decode_frame(echoed, payload_len)?;
            let mut remote = [0u8; TIMESTAMP_SIZE];
            remote.copy_from_slice(stamp);
            series.record_remote(Timestamp::from_be_bytes(remote));
        }

        series.set_elapsed(timer.elapsed());

        tracing::debug!(
            rounds = series.len(),
            elapsed_us = series.elapsed().as_micros() as u64,
            "Latency session finished"
        );
        Ok(series)
    }

    pub fn into_inner(self) -> S {
        self.transport.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use crate::framing::{decode_length, encode_length};
    use crate::transport::mock::MockStream;
    use std::cell::Cell;

    /// Advances by 10us on every reading.
    struct SteppingClock(Cell<i64>);

    impl Clock for SteppingClock {
        fn now(&self) -> Timestamp {
            let now = self.0.get();
            self.0.set(now + 10);
            Timestamp::from_micros(now)
        }
    }

    fn size(n: u64) -> MessageSize {
        MessageSize::new(n).unwrap()
    }

    #[test]
    fn test_throughput_sends_whole_chunks() {
        let mut client = ClientSession::new(MockStream::trickle(&[ACK]), Framing::SizeHeader);
        let report = client.run_throughput(1024, size(256)).unwrap();
        assert_eq!(report.chunks, 4);
        assert_eq!(report.bytes_sent, 1024);

        let output = client.into_inner().output;
        assert_eq!(decode_length(&output[0..8]).unwrap(), 1024);
        assert_eq!(decode_length(&output[8..16]).unwrap(), 256);
        assert_eq!(output.len(), 16 + 4 * (8 + 256));
    }

    #[test]
    fn test_throughput_rounds_up_partial_chunk() {
        let mut client = ClientSession::new(MockStream::new(&[ACK]), Framing::Raw);
        let report = client.run_throughput(1000, size(256)).unwrap();
        assert_eq!(report.chunks, 4);
        assert_eq!(report.bytes_sent, 1024);
        assert_eq!(client.into_inner().output.len(), 16 + 1024);
    }

    #[test]
    fn test_throughput_missing_ack_is_disconnect() {
        let mut client = ClientSession::new(MockStream::new(&[]), Framing::Raw);
        let err = client.run_throughput(64, size(64)).unwrap_err();
        assert!(matches!(err, BenchError::Transport(e) if e.is_disconnected()));
    }

    #[test]
    fn test_throughput_wrong_ack() {
        let mut client = ClientSession::new(MockStream::new(&[0x7f]), Framing::Raw);
        let err = client.run_throughput(64, size(64)).unwrap_err();
        assert!(matches!(
            err,
            BenchError::Protocol(ProtocolError::UnexpectedAck { .. })
        ));
    }

    /// Replies as an echo server stamping `remote` would.
    fn scripted_replies(framing: Framing, payload_len: usize, remotes: &[i64]) -> Vec<u8> {
        let mut input = Vec::new();
        for (round, remote) in remotes.iter().enumerate() {
            framing.encode_frame(&vec![fill_byte(round as u64); payload_len], &mut input);
            input.extend_from_slice(&Timestamp::from_micros(*remote).to_be_bytes());
        }
        input
    }

    #[test]
    fn test_latency_records_three_series() {
        let input = scripted_replies(Framing::SizeHeader, 8, &[5, 25, 45]);
        let mut client = ClientSession::with_parts(
            Transport::new(MockStream::trickle(&input)),
            Framing::SizeHeader,
            SteppingClock(Cell::new(0)),
        );
        let series = client.run_latency(3, size(8)).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.round_trips(), vec![10, 10, 10]);
        assert_eq!(series.request_latencies(), vec![5, 5, 5]);
        assert_eq!(series.response_latencies(), vec![5, 5, 5]);
        assert!(series.elapsed() > Duration::ZERO);

        let output = client.into_inner().output;
        assert_eq!(&output[..8], &encode_length(8));
        assert_eq!(output.len(), 8 + 3 * 16);
    }

    #[test]
    fn test_latency_detects_stale_echo() {
        // Second reply repeats the first round's payload.
        let mut input = scripted_replies(Framing::Raw, 4, &[1]);
        input.extend_from_slice(&scripted_replies(Framing::Raw, 4, &[2]));
        let mut client = ClientSession::new(MockStream::new(&input), Framing::Raw);
        let err = client.run_latency(2, size(4)).unwrap_err();
        assert!(matches!(
            err,
            BenchError::Protocol(ProtocolError::EchoMismatch { round: 1 })
        ));
    }

    #[test]
    fn test_run_dispatches_on_mode() {
        let session = SessionConfig {
            framing: Framing::Raw,
            amount: 128,
            message_size: size(64),
            rounds: 1,
        };
        let mut client = ClientSession::new(MockStream::new(&[ACK]), Framing::Raw);
        match client.run(ClientMode::Throughput, &session).unwrap() {
            ClientReport::Throughput(report) => assert_eq!(report.chunks, 2),
            other => panic!("unexpected report: {:?}", other),
        }

        let input = scripted_replies(Framing::Raw, 64, &[3]);
        let mut client = ClientSession::new(MockStream::new(&input), Framing::Raw);
        match client.run(ClientMode::Latency, &session).unwrap() {
            ClientReport::Latency(series) => assert_eq!(series.len(), 1),
            other => panic!("unexpected report: {:?}", other),
        }
    }

    #[test]
    fn test_latency_zero_rounds() {
        let mut client = ClientSession::new(MockStream::new(&[]), Framing::Raw);
        let series = client.run_latency(0, size(8)).unwrap();
        assert!(series.is_empty());
    }
}
