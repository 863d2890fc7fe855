// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Byte-stream abstraction consumed by the transport loop.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::os::unix::net::UnixStream;

/// A connected, bidirectional byte stream.
///
/// Reads and writes may transfer fewer bytes than requested; callers loop.
pub trait ByteStream {
    /// Read up to `buf.len()` bytes. `Ok(0)` means the peer closed.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write up to `buf.len()` bytes. `Ok(0)` means the peer closed.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Shut down both directions.
    fn shutdown(&mut self) -> io::Result<()>;

    /// Whether `err` only means "not now" and the call should be repeated.
    fn is_transient(&self, err: &io::Error) -> bool {
        is_transient_kind(err.kind())
    }
}

/// Default classification of temporary socket conditions.
pub fn is_transient_kind(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

impl ByteStream for TcpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(self, buf)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

impl ByteStream for UnixStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self, buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(self, buf)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        UnixStream::shutdown(self, Shutdown::Both)
    }
}

impl<S: ByteStream + ?Sized> ByteStream for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        (**self).shutdown()
    }

    fn is_transient(&self, err: &io::Error) -> bool {
        (**self).is_transient(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(is_transient_kind(io::ErrorKind::WouldBlock));
        assert!(is_transient_kind(io::ErrorKind::Interrupted));
        assert!(!is_transient_kind(io::ErrorKind::ConnectionReset));
        assert!(!is_transient_kind(io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn test_unix_pair_round_trip() {
        let (mut a, mut b) = UnixStream::pair().unwrap();
        assert_eq!(ByteStream::write(&mut a, b"ping").unwrap(), 4);
        let mut buf = [0u8; 4];
        let mut read = 0;
        while read < 4 {
            read += ByteStream::read(&mut b, &mut buf[read..]).unwrap();
        }
        assert_eq!(&buf, b"ping");
        ByteStream::shutdown(&mut a).unwrap();
        assert_eq!(ByteStream::read(&mut b, &mut buf).unwrap(), 0);
    }
}
