// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Full-buffer send and receive over a byte stream.
//!
//! Stream sockets give no guarantee that one system call moves the whole
//! buffer, so every logical transfer is a loop. Each loop ends in exactly one
//! of three ways: the buffer is done, the peer disconnected (zero-byte
//! result), or a non-transient I/O error occurred. Transient errors go
//! through the [`RetryStrategy`] and the loop continues.

mod guard;
mod retry;
mod stream;

pub use guard::SocketGuard;
pub use retry::{BusyPoll, ExponentialBackoff, RetryPolicy, RetryStrategy};
pub use stream::{is_transient_kind, ByteStream};

use crate::error::TransportError;
use crate::framing::{decode_length, encode_length, LENGTH_HEADER_SIZE};

/// Resilient transfer loop bound to one stream.
pub struct Transport<S, R = BusyPoll> {
    stream: S,
    retry: R,
    bytes_written: u64,
    bytes_read: u64,
}

impl<S: ByteStream> Transport<S, BusyPoll> {
    /// Transport that busy-polls on transient errors.
    pub fn new(stream: S) -> Self {
        Self::with_retry(stream, BusyPoll)
    }
}

impl<S: ByteStream, R: RetryStrategy> Transport<S, R> {
    pub fn with_retry(stream: S, retry: R) -> Self {
        Self {
            stream,
            retry,
            bytes_written: 0,
            bytes_read: 0,
        }
    }

    /// Write all of `buf`.
    pub fn send_all(&mut self, mut buf: &[u8]) -> Result<(), TransportError> {
        let mut attempt = 0u32;
        while !buf.is_empty() {
            match self.stream.write(buf) {
                Ok(0) => return Err(TransportError::Disconnected),
                Ok(n) => {
                    let n = n.min(buf.len());
                    buf = &buf[n..];
                    self.bytes_written += n as u64;
                    attempt = 0;
                }
                Err(e) if self.stream.is_transient(&e) => {
                    attempt = attempt.saturating_add(1);
                    self.retry.wait_before_retry(attempt);
                }
                Err(e) => {
                    return Err(TransportError::Io {
                        context: "write",
                        source: e,
                    })
                }
            }
        }
        Ok(())
    }

    /// Fill all of `buf`.
    pub fn receive_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let mut received = 0usize;
        let mut attempt = 0u32;
        while received < buf.len() {
            match self.stream.read(&mut buf[received..]) {
                Ok(0) => return Err(TransportError::Disconnected),
                Ok(n) => {
                    let n = n.min(buf.len() - received);
                    received += n;
                    self.bytes_read += n as u64;
                    attempt = 0;
                }
                Err(e) if self.stream.is_transient(&e) => {
                    attempt = attempt.saturating_add(1);
                    self.retry.wait_before_retry(attempt);
                }
                Err(e) => {
                    return Err(TransportError::Io {
                        context: "read",
                        source: e,
                    })
                }
            }
        }
        Ok(())
    }

    /// Resize `buf` to `amount` bytes and fill it.
    pub fn receive_into(&mut self, buf: &mut Vec<u8>, amount: usize) -> Result<(), TransportError> {
        buf.resize(amount, 0);
        self.receive_exact(buf)
    }

    /// Send one 8-byte big-endian header.
    pub fn send_length(&mut self, value: u64) -> Result<(), TransportError> {
        self.send_all(&encode_length(value))
    }

    /// Receive one 8-byte big-endian header.
    pub fn receive_length(&mut self) -> Result<u64, TransportError> {
        let mut header = [0u8; LENGTH_HEADER_SIZE];
        self.receive_exact(&mut header)?;
        // A full header was read, decoding cannot come up short.
        Ok(decode_length(&header).unwrap_or_default())
    }

    /// Total bytes written through this transport, partial transfers included.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Total bytes read through this transport, partial transfers included.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// Give the stream back, dropping the retry state.
    pub fn into_inner(self) -> S {
        self.stream
    }
}


#[cfg(test)]
mod tests {
    use super::mock::{MockStream, Step};
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    #[test]
    fn test_send_all_in_one_call() {
        let mut transport = Transport::new(MockStream::new(&[]));
        transport.send_all(b"hello world").unwrap();
        assert_eq!(transport.stream().output, b"hello world");
        assert_eq!(transport.bytes_written(), 11);
    }

    #[test]
    fn test_send_all_one_byte_at_a_time() {
        let mut transport = Transport::new(MockStream::trickle(&[]));
        transport.send_all(b"hello world").unwrap();
        assert_eq!(transport.stream().output, b"hello world");
    }

    #[test]
    fn test_receive_exact_one_byte_at_a_time() {
        let mut transport = Transport::new(MockStream::trickle(b"abcdefgh-rest"));
        let mut buf = [0u8; 8];
        transport.receive_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"abcdefgh");
        assert_eq!(transport.bytes_read(), 8);
        // Nothing beyond the requested amount was consumed.
        assert_eq!(transport.stream().input.len(), 5);
    }

    #[test]
    fn test_transient_errors_are_retried() {
        let mut stream = MockStream::new(b"payload");
        stream.read_script =
            VecDeque::from([Step::WouldBlock, Step::Chunk(3), Step::WouldBlock, Step::WouldBlock]);
        stream.write_script = VecDeque::from([
            Step::Fail(io::ErrorKind::Interrupted),
            Step::Chunk(2),
            Step::WouldBlock,
        ]);

        struct Counting(u32);
        impl RetryStrategy for Counting {
            fn wait_before_retry(&mut self, _attempt: u32) {
                self.0 += 1;
            }
        }

        let mut transport = Transport::with_retry(stream, Counting(0));
        let mut buf = vec![0u8; 7];
        transport.receive_exact(&mut buf).unwrap();
        assert_eq!(buf, b"payload");
        transport.send_all(b"pong").unwrap();
        assert_eq!(transport.stream().output, b"pong");
        assert_eq!(transport.retry.0, 5);
    }

    #[test]
    fn test_zero_byte_read_is_disconnect() {
        let mut transport = Transport::new(MockStream::new(b"abc"));
        let mut buf = [0u8; 8];
        let err = transport.receive_exact(&mut buf).unwrap_err();
        assert!(err.is_disconnected());
    }

    #[test]
    fn test_counters_include_partial_transfers() {
        let mut stream = MockStream::trickle(b"abc");
        stream.write_script = VecDeque::from([Step::Chunk(2), Step::Chunk(2), Step::Closed]);
        let mut transport = Transport::new(stream);

        let mut buf = [0u8; 8];
        assert!(transport.receive_exact(&mut buf).unwrap_err().is_disconnected());
        assert_eq!(transport.bytes_read(), 3);

        assert!(transport.send_all(b"abcdef").unwrap_err().is_disconnected());
        assert_eq!(transport.bytes_written(), 4);
    }

    #[test]
    fn test_zero_byte_write_is_disconnect() {
        let mut stream = MockStream::new(&[]);
        stream.write_script = VecDeque::from([Step::Chunk(2), Step::Closed]);
        let mut transport = Transport::new(stream);
        let err = transport.send_all(b"abcdef").unwrap_err();
        assert!(err.is_disconnected());
    }

    #[test]
    fn test_hard_error_is_io() {
        let mut stream = MockStream::new(b"abc");
        stream.read_script = VecDeque::from([Step::Fail(io::ErrorKind::ConnectionReset)]);
        let mut transport = Transport::new(stream);
        let mut buf = [0u8; 3];
        match transport.receive_exact(&mut buf) {
            Err(TransportError::Io { context, source }) => {
                assert_eq!(context, "read");
                assert_eq!(source.kind(), io::ErrorKind::ConnectionReset);
            }
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_length_headers() {
        let mut transport = Transport::new(MockStream::trickle(&encode_length(1024)));
        assert_eq!(transport.receive_length().unwrap(), 1024);
        transport.send_length(7).unwrap();
        assert_eq!(transport.stream().output, encode_length(7));
    }

    #[test]
    fn test_empty_transfers_succeed() {
        let mut transport = Transport::new(MockStream::new(&[]));
        transport.send_all(&[]).unwrap();
        transport.receive_exact(&mut []).unwrap();
        let mut buf = Vec::new();
        transport.receive_into(&mut buf, 0).unwrap();
    }
}
