// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for tcpbench.
//!
//! Explicit enum error types only. No `Box<dyn Error>`, no `anyhow::Result`
//! in the library: every failure has a named variant and is propagated to the
//! binary, which is the single place where the process terminates.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the benchmark harness.
#[derive(Debug, Error)]
pub enum BenchError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Wire Errors - Never Retried at Session Level
    // =========================================================================
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Server thread terminated abnormally: {reason}")]
    ServerThread { reason: String },
}

/// Outcome of a failed full-buffer send or receive.
///
/// Transient conditions (would-block, interrupted) are retried inside the
/// transport loop and never show up here.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer closed the connection (zero-byte read or write).
    #[error("Socket disconnected by peer")]
    Disconnected,

    #[error("{context} failed: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl TransportError {
    /// Whether this is the clean end-of-stream signal.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, TransportError::Disconnected)
    }

    /// The peer went away, either cleanly or by tearing the connection down.
    pub fn is_peer_closed(&self) -> bool {
        match self {
            TransportError::Disconnected => true,
            TransportError::Io { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
            ),
        }
    }
}

/// Framing violations. These indicate a harness bug, not bad luck on the wire.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Short header: need {expected} bytes, got {actual}")]
    ShortHeader { expected: usize, actual: usize },

    #[error("Frame length mismatch: header says {announced}, expected {expected}")]
    LengthMismatch { announced: u64, expected: u64 },

    #[error("Echoed frame differs from the frame sent in round {round}")]
    EchoMismatch { round: u64 },

    #[error("Announced message size {size} is outside 1..={max}")]
    InvalidMessageSize { size: u64, max: u64 },

    #[error("Expected acknowledgement byte {expected:#04x}, got {actual:#04x}")]
    UnexpectedAck { expected: u8, actual: u8 },
}

/// Hard validation errors abort startup before any socket is touched.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid port: {port} - {reason}")]
    InvalidPort { port: u16, reason: String },

    #[error("Message size out of bounds: {size} bytes (min: {min}, max: {max})")]
    MessageSizeOutOfBounds { size: u64, min: u64, max: u64 },
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_validation_error_display() {
        let err = HardValidationError::InvalidFieldValue {
            field: "rounds",
            value: "0".to_string(),
            reason: "Must be between 1 and 100000000".to_string(),
        };
        assert!(err.to_string().contains("rounds"));
        assert!(err.to_string().contains("Must be between"));
    }

    #[test]
    fn test_error_chain() {
        let validation_err = HardValidationError::InvalidPort {
            port: 0,
            reason: "Port must be non-zero".to_string(),
        };
        let bench_err: BenchError = validation_err.into();
        assert!(matches!(bench_err, BenchError::HardValidation(_)));

        let bench_err: BenchError = TransportError::Disconnected.into();
        assert!(matches!(
            bench_err,
            BenchError::Transport(TransportError::Disconnected)
        ));
    }

    #[test]
    fn test_peer_closed_kinds() {
        assert!(TransportError::Disconnected.is_peer_closed());
        let broken = TransportError::Io {
            context: "write",
            source: std::io::ErrorKind::BrokenPipe.into(),
        };
        assert!(broken.is_peer_closed());
        assert!(!broken.is_disconnected());
        let refused = TransportError::Io {
            context: "connect",
            source: std::io::ErrorKind::ConnectionRefused.into(),
        };
        assert!(!refused.is_peer_closed());
    }

    #[test]
    fn test_short_header_display() {
        let err = ProtocolError::ShortHeader {
            expected: 8,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Short header: need 8 bytes, got 3");
    }
}
