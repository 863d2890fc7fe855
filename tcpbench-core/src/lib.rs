// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! tcpbench Core Library
//!
//! Raw TCP benchmark building blocks: message framing, full-buffer
//! transport loops over stream sockets, and the client/server session
//! drivers for ping-pong latency and bulk-transfer throughput runs.

pub mod affinity;
pub mod clock;
pub mod config;
pub mod error;
pub mod framing;
pub mod loopback;
pub mod net;
pub mod session;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, LatencySeries, MonotonicClock, Timestamp};
pub use config::{Config, ConfigLoader, ConnectionConfig, SessionConfig};
pub use error::{BenchError, BenchResult, HardValidationError, ProtocolError, TransportError};
pub use framing::{Framing, FramingStrategy};
pub use loopback::LoopbackOptions;
pub use session::{
    ClientReport, ClientSession, ServerReport, ServerSession, Termination, ThroughputReport,
};
pub use transport::{ByteStream, RetryPolicy, SocketGuard, Transport};
pub use types::{ClientMode, MessageSize, Port, ServerMode};
