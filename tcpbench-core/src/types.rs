// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by construction.
//! All types validate their invariants at creation time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;

/// Smallest payload a session can carry.
const MIN_MESSAGE_SIZE: u64 = 1;
/// Largest payload a session can carry: 64 MB.
const MAX_MESSAGE_SIZE: u64 = 64 * 1024 * 1024;

/// Validated network port for outgoing connections.
/// Must be in range 1-65535 (0 is reserved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Create a new Port with validation.
    pub fn new(port: u16) -> Result<Self, HardValidationError> {
        if port == 0 {
            return Err(HardValidationError::InvalidPort {
                port,
                reason: "port has to be set explicitly".to_string(),
            });
        }
        Ok(Self(port))
    }

    /// Get the inner port value.
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = HardValidationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Validated payload size of one frame, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct MessageSize(usize);

impl MessageSize {
    /// Upper bound accepted both from configuration and from the wire.
    pub const MAX: u64 = MAX_MESSAGE_SIZE;

    /// Create a new MessageSize with bounds validation.
    pub fn new(bytes: u64) -> Result<Self, HardValidationError> {
        if !(MIN_MESSAGE_SIZE..=MAX_MESSAGE_SIZE).contains(&bytes) {
            return Err(HardValidationError::MessageSizeOutOfBounds {
                size: bytes,
                min: MIN_MESSAGE_SIZE,
                max: MAX_MESSAGE_SIZE,
            });
        }
        // Bounded by MAX_MESSAGE_SIZE, fits any supported usize.
        Ok(Self(bytes as usize))
    }

    /// Get the size in bytes.
    pub fn bytes(&self) -> usize {
        self.0
    }
}

impl Default for MessageSize {
    fn default() -> Self {
        Self(1024)
    }
}

impl fmt::Display for MessageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}B", self.0)
    }
}

impl TryFrom<u64> for MessageSize {
    type Error = HardValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessageSize> for u64 {
    fn from(size: MessageSize) -> Self {
        size.0 as u64
    }
}

/// What a server does with each received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerMode {
    /// Send every frame back with a fresh timestamp appended.
    Echo,
    /// Count bytes until the announced amount arrived, then acknowledge.
    Sink,
}

impl fmt::Display for ServerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMode::Echo => write!(f, "echo"),
            ServerMode::Sink => write!(f, "sink"),
        }
    }
}

/// What a client measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientMode {
    /// Bulk transfer of `amount` bytes, timed end to end.
    Throughput,
    /// Strictly alternating ping-pong rounds with per-round timestamps.
    Latency,
}

impl ClientMode {
    /// The server behavior this client expects on the other end.
    pub fn peer_mode(&self) -> ServerMode {
        match self {
            ClientMode::Throughput => ServerMode::Sink,
            ClientMode::Latency => ServerMode::Echo,
        }
    }
}

impl fmt::Display for ClientMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMode::Throughput => write!(f, "throughput"),
            ClientMode::Latency => write!(f, "latency"),
        }
    }
}
