// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Session drivers for the two benchmark roles.
//!
//! A session is one run of the protocol over one connection:
//!
//! ```text
//! client                                  server
//!   | -- preamble (8-byte BE headers) -->    | AwaitingHeader
//!   | -- frame ------------------------->    | Streaming
//!   | <- frame + 8-byte timestamp -------    |   (echo)
//!   | ...                                    |
//!   | <- 1-byte ACK ---------------------    |   (sink, once amount reached)
//! ```
//!
//! Throughput sessions announce `[amount][message_size]`, latency sessions
//! announce `[message_size]`.

mod client;
mod server;

pub use client::{ClientReport, ClientSession, ThroughputReport};
pub use server::{ServerReport, ServerSession, ServerState, Termination};

use crate::error::{BenchResult, ProtocolError};
use crate::transport::{ByteStream, RetryStrategy, Transport};
use crate::types::MessageSize;

/// Byte the sink server sends once the announced amount arrived.
pub const ACK: u8 = 0x01;

/// Session parameters announced by the client before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preamble {
    /// Total payload bytes to expect. Only present for sink sessions.
    pub amount: Option<u64>,
    pub message_size: MessageSize,
}

impl Preamble {
    pub fn throughput(amount: u64, message_size: MessageSize) -> Self {
        Self {
            amount: Some(amount),
            message_size,
        }
    }

    pub fn latency(message_size: MessageSize) -> Self {
        Self {
            amount: None,
            message_size,
        }
    }

    pub(crate) fn send<S: ByteStream, R: RetryStrategy>(
        &self,
        transport: &mut Transport<S, R>,
    ) -> BenchResult<()> {
        if let Some(amount) = self.amount {
            transport.send_length(amount)?;
        }
        transport.send_length(self.message_size.into())?;
        Ok(())
    }

    pub(crate) fn receive<S: ByteStream, R: RetryStrategy>(
        transport: &mut Transport<S, R>,
        with_amount: bool,
    ) -> BenchResult<Self> {
        let amount = if with_amount {
            Some(transport.receive_length()?)
        } else {
            None
        };
        let size = transport.receive_length()?;
        let message_size = MessageSize::new(size).map_err(|_| ProtocolError::InvalidMessageSize {
            size,
            max: MessageSize::MAX,
        })?;
        Ok(Self {
            amount,
            message_size,
        })
    }
}

/// Payload byte for a given round, so stale echoes are detectable.
pub(crate) fn fill_byte(round: u64) -> u8 {
    (round % 251) as u8
}
