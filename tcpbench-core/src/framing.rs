// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Wire framing for benchmark payloads.
//!
//! Two layouts share one 8-byte big-endian length convention:
//!
//! ```text
//! size-header:  [u64 BE payload length][payload .....]   per frame
//! raw:          [payload .....]                          per frame
//! ```
//!
//! With raw framing the payload length is only sent once, in the session
//! preamble. Both sides compute frame sizes from the preamble alone, so the
//! receiver always knows how many bytes to read next.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Width of every length header on the wire.
pub const LENGTH_HEADER_SIZE: usize = 8;

/// Encode a length as 8 bytes in network byte order.
pub fn encode_length(n: u64) -> [u8; LENGTH_HEADER_SIZE] {
    n.to_be_bytes()
}

/// Decode a length header from the first 8 bytes of `bytes`.
///
/// A shorter buffer is a `ShortHeader` protocol error, never a truncated value.
pub fn decode_length(bytes: &[u8]) -> Result<u64, ProtocolError> {
    let header: [u8; LENGTH_HEADER_SIZE] = bytes
        .get(..LENGTH_HEADER_SIZE)
        .and_then(|b| b.try_into().ok())
        .ok_or(ProtocolError::ShortHeader {
            expected: LENGTH_HEADER_SIZE,
            actual: bytes.len(),
        })?;
    Ok(u64::from_be_bytes(header))
}

/// How payloads are laid out on the wire.
pub trait FramingStrategy {
    /// Number of bytes one frame carrying `payload_len` bytes occupies.
    fn frame_size_for(&self, payload_len: usize) -> usize;

    /// Append the wire representation of `payload` to `out`.
    fn encode_frame(&self, payload: &[u8], out: &mut Vec<u8>);

    /// Extract the payload from a complete frame.
    fn decode_frame<'a>(
        &self,
        frame: &'a [u8],
        expected_len: usize,
    ) -> Result<&'a [u8], ProtocolError>;
}

/// Payload bytes only; the length lives in the session preamble.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawLengthPrefixed;

impl FramingStrategy for RawLengthPrefixed {
    fn frame_size_for(&self, payload_len: usize) -> usize {
        payload_len
    }

    fn encode_frame(&self, payload: &[u8], out: &mut Vec<u8>) {
        out.extend_from_slice(payload);
    }

    fn decode_frame<'a>(
        &self,
        frame: &'a [u8],
        expected_len: usize,
    ) -> Result<&'a [u8], ProtocolError> {
        frame.get(..expected_len).ok_or(ProtocolError::LengthMismatch {
            announced: frame.len() as u64,
            expected: expected_len as u64,
        })
    }
}

/// Every frame repeats its own length in an 8-byte header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeHeaderPrefixed;

impl FramingStrategy for SizeHeaderPrefixed {
    fn frame_size_for(&self, payload_len: usize) -> usize {
        LENGTH_HEADER_SIZE + payload_len
    }

    fn encode_frame(&self, payload: &[u8], out: &mut Vec<u8>) {
        out.reserve(LENGTH_HEADER_SIZE + payload.len());
        out.extend_from_slice(&encode_length(payload.len() as u64));
        out.extend_from_slice(payload);
    }

    fn decode_frame<'a>(
        &self,
        frame: &'a [u8],
        expected_len: usize,
    ) -> Result<&'a [u8], ProtocolError> {
        let announced = decode_length(frame)?;
        if announced != expected_len as u64 {
            return Err(ProtocolError::LengthMismatch {
                announced,
                expected: expected_len as u64,
            });
        }
        frame
            .get(LENGTH_HEADER_SIZE..LENGTH_HEADER_SIZE + expected_len)
            .ok_or(ProtocolError::ShortHeader {
                expected: LENGTH_HEADER_SIZE + expected_len,
                actual: frame.len(),
            })
    }
}

/// Framing selector used by configuration and session construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    Raw,
    #[default]
    SizeHeader,
}

impl Framing {
    fn strategy(&self) -> &'static dyn FramingStrategy {
        match self {
            Framing::Raw => &RawLengthPrefixed,
            Framing::SizeHeader => &SizeHeaderPrefixed,
        }
    }
}

impl FramingStrategy for Framing {
    fn frame_size_for(&self, payload_len: usize) -> usize {
        self.strategy().frame_size_for(payload_len)
    }

    fn encode_frame(&self, payload: &[u8], out: &mut Vec<u8>) {
        self.strategy().encode_frame(payload, out)
    }

    fn decode_frame<'a>(
        &self,
        frame: &'a [u8],
        expected_len: usize,
    ) -> Result<&'a [u8], ProtocolError> {
        self.strategy().decode_frame(frame, expected_len)
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framing::Raw => write!(f, "raw"),
            Framing::SizeHeader => write!(f, "size_header"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_round_trip() {
        for n in [0u64, 1, 255, 256, 65_536, u32::MAX as u64 + 1, u64::MAX] {
            assert_eq!(decode_length(&encode_length(n)).unwrap(), n);
        }
    }

    #[test]
    fn test_network_byte_order() {
        assert_eq!(encode_length(1), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(encode_length(0x0102), [0, 0, 0, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn test_short_header_is_protocol_error() {
        let err = decode_length(&[0u8; 7]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::ShortHeader {
                expected: 8,
                actual: 7
            }
        );
        assert!(decode_length(&[]).is_err());
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut buf = encode_length(42).to_vec();
        buf.extend_from_slice(&[0xff; 4]);
        assert_eq!(decode_length(&buf).unwrap(), 42);
    }

    #[test]
    fn test_frame_sizes() {
        assert_eq!(RawLengthPrefixed.frame_size_for(256), 256);
        assert_eq!(SizeHeaderPrefixed.frame_size_for(256), 264);
        assert_eq!(SizeHeaderPrefixed.frame_size_for(0), 8);
        assert_eq!(Framing::Raw.frame_size_for(10), 10);
        assert_eq!(Framing::SizeHeader.frame_size_for(10), 18);
    }

    #[test]
    fn test_size_header_frame() {
        let mut out = Vec::new();
        SizeHeaderPrefixed.encode_frame(b"hello", &mut out);
        assert_eq!(out.len(), SizeHeaderPrefixed.frame_size_for(5));
        assert_eq!(&out[..8], &encode_length(5));
        assert_eq!(SizeHeaderPrefixed.decode_frame(&out, 5).unwrap(), b"hello");
    }

    #[test]
    fn test_size_header_length_mismatch() {
        let mut out = Vec::new();
        SizeHeaderPrefixed.encode_frame(b"hello", &mut out);
        let err = SizeHeaderPrefixed.decode_frame(&out, 4).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::LengthMismatch {
                announced: 5,
                expected: 4
            }
        );
    }

    #[test]
    fn test_raw_frame_is_payload() {
        let mut out = Vec::new();
        RawLengthPrefixed.encode_frame(b"abc", &mut out);
        assert_eq!(out, b"abc");
        assert_eq!(RawLengthPrefixed.decode_frame(&out, 3).unwrap(), b"abc");
        assert!(RawLengthPrefixed.decode_frame(&out, 4).is_err());
    }
}
